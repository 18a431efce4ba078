use std::{collections::BTreeMap, path::PathBuf};

use classref::{disassembler::FlowType, ClassFile};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{collect_class_files, finish, load_class_file, process_files},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ClassInfo {
    file: String,
    summary: String,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access_flags: String,
    version: String,
    constant_pool_slots: usize,
    field_count: usize,
    method_count: usize,
    instruction_count: usize,
    branch_count: usize,
    instructions_by_category: BTreeMap<String, usize>,
}

pub fn run(paths: &[PathBuf], opts: &GlobalOptions) -> anyhow::Result<()> {
    let files = collect_class_files(paths)?;

    let (results, failed) = process_files(&files, |path| {
        let file = load_class_file(path)?;
        let class = ClassFile::from_mem(file.data())?;
        let summary = class.summary()?;

        let instructions: Vec<_> = class
            .methods
            .iter()
            .filter_map(|method| method.code())
            .flat_map(|code| &code.instructions)
            .collect();
        let mut instructions_by_category = BTreeMap::new();
        for instruction in &instructions {
            *instructions_by_category
                .entry(instruction.category.to_string())
                .or_insert(0) += 1;
        }
        let branch_count = instructions
            .iter()
            .filter(|instruction| {
                matches!(
                    instruction.flow_type,
                    FlowType::ConditionalBranch | FlowType::UnconditionalBranch | FlowType::Switch
                )
            })
            .count();

        Ok(ClassInfo {
            file: path.display().to_string(),
            summary: summary.to_string(),
            name: summary.name,
            super_name: summary.super_name,
            interfaces: summary.interfaces,
            access_flags: format!("0x{:04X}", summary.access_flags),
            version: format!("{}.{}", class.major_version, class.minor_version),
            constant_pool_slots: class.constant_pool.len(),
            field_count: class.fields.len(),
            method_count: class.methods.len(),
            instruction_count: instructions.len(),
            branch_count,
            instructions_by_category,
        })
    });

    print_output(&results, opts, |results| {
        for info in results {
            println!("{}", info.summary);

            let mut tw = TabWriter::new(&[("Property", Align::Left), ("Value", Align::Right)]);
            tw.row(vec!["Version".into(), info.version.clone()]);
            tw.row(vec!["Flags".into(), info.access_flags.clone()]);
            tw.row(vec!["Constant pool".into(), info.constant_pool_slots.to_string()]);
            tw.row(vec!["Fields".into(), info.field_count.to_string()]);
            tw.row(vec!["Methods".into(), info.method_count.to_string()]);
            tw.row(vec!["Instructions".into(), info.instruction_count.to_string()]);
            tw.row(vec!["Branches".into(), info.branch_count.to_string()]);
            for (category, count) in &info.instructions_by_category {
                tw.row(vec![format!("  {category}"), count.to_string()]);
            }
            tw.print();
            println!();
        }
    })?;

    finish(failed, files.len())
}
