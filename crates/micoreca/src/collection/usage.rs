//! Which workflows use which tools.

use std::collections::BTreeMap;

use crate::record::{Record, RecordDetails};

/// Map each tool name to the names of the workflows using it.
///
/// Tool names have `"\n "` removed; empty names are dropped.
pub fn tool_usage(records: &[Record]) -> BTreeMap<String, Vec<String>> {
    let mut usage: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        let RecordDetails::Workflow(workflow) = &record.details else {
            continue;
        };
        for tool in &workflow.tools {
            let clean = tool.replace("\n ", "");
            if clean.is_empty() {
                continue;
            }
            usage.entry(clean).or_default().push(workflow.name.clone());
        }
    }
    usage
}
