#![no_main]

use classref::{index, UsageEdge};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut edges: Vec<UsageEdge> = Vec::new();
    if index(data, &mut edges).is_err() {
        assert!(edges.is_empty());
    }
});
