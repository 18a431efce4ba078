pub mod common;
pub mod find;
pub mod info;
pub mod usages;
