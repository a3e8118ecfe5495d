use crate::builder::config::BLOCKS_REPORT;
use crate::builder::error::BuildError;
use crate::indexer::ids::{flatten, CanonicalId};
use crate::indexer::read_report;
use crate::indexer::writer::IndexWriter;
use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// field → subkey → value → block ids
type InvertedIndex = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeSet<CanonicalId>>>>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlocksSummary {
    pub blocks: usize,
    pub inverted_targets: usize,
}

/// Render a JSON scalar the way it appears in listings: strings raw,
/// everything else as JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One state line: `k=v,k=v`, suffixed with `  [default]` for the default
/// state. States without properties produce nothing.
pub fn state_line(state: &Value) -> Option<String> {
    let properties = state.get("properties").and_then(Value::as_object)?;
    if properties.is_empty() {
        return None;
    }
    let mut line = properties
        .iter()
        .map(|(k, v)| format!("{}={}", k, render_value(v)))
        .collect::<Vec<_>>()
        .join(",");
    if state.get("default").and_then(Value::as_bool).unwrap_or(false) {
        line.push_str("  [default]");
    }
    Some(line)
}

fn inverted_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(render_value).collect(),
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Null => Vec::new(),
        scalar => vec![render_value(scalar)],
    }
}

/// Forward pass writes one record and one state list per block while
/// filling the inverted index; the inverted files are flushed afterwards.
pub fn index_blocks(root: &Path, writer: &mut IndexWriter) -> Result<BlocksSummary> {
    let Some(report) = read_report(root, BLOCKS_REPORT)? else {
        return Ok(BlocksSummary::default());
    };
    let Value::Object(blocks) = report else {
        return Err(BuildError::structural("blocks", BLOCKS_REPORT, "not an object").into());
    };

    let mut inverted = InvertedIndex::new();
    let mut summary = BlocksSummary::default();

    for (key, record) in blocks {
        let Value::Object(mut record) = record else {
            return Err(BuildError::structural("block", key, "record is not an object").into());
        };
        let name = flatten(&key);
        let id = CanonicalId::parse(&key);

        let lines: Vec<String> = match record.remove("states") {
            Some(Value::Array(states)) => states.iter().filter_map(state_line).collect(),
            Some(_) => {
                return Err(BuildError::structural("block", key, "states is not a list").into())
            }
            None => Vec::new(),
        };

        writer.write_json(&format!("blocks/{}.json", name), &record)?;
        writer.write_lines(&format!("blocks/states/{}.txt", name), &lines)?;
        add_to_index(&mut inverted, &id, &record);
        summary.blocks += 1;
    }

    for (field, subkeys) in &inverted {
        for (subkey, values) in subkeys {
            if field == "properties" {
                for (value, ids) in values {
                    let lines: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                    writer.write_lines(&format!("blocks/properties/{}={}.txt", subkey, value), &lines)?;
                    summary.inverted_targets += 1;
                }
            } else {
                writer.write_json(&format!("blocks/{}/{}.json", field, subkey), values)?;
                summary.inverted_targets += 1;
            }
        }
    }

    log::debug!(
        "{} blocks, {} inverted index files",
        summary.blocks,
        summary.inverted_targets
    );
    Ok(summary)
}

fn add_to_index(inverted: &mut InvertedIndex, id: &CanonicalId, record: &Map<String, Value>) {
    for (field, subkeys) in record {
        let Value::Object(subkeys) = subkeys else {
            continue;
        };
        let by_subkey = inverted.entry(field.clone()).or_default();
        for (subkey, value) in subkeys {
            let by_value = by_subkey.entry(subkey.clone()).or_default();
            for v in inverted_values(value) {
                by_value.entry(v).or_default().insert(id.clone());
            }
        }
    }
}
