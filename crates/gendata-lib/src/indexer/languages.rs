use crate::builder::config::PACK_MCMETA;
use crate::indexer::read_report;
use crate::indexer::writer::IndexWriter;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const LANGUAGES_TARGET: &str = "languages.json";

/// `en_us` first (taken from `en_US` when both spellings exist), then every
/// other code lower-cased, in sorted order of the original keys.
pub fn normalize_languages(mut source: Map<String, Value>) -> Map<String, Value> {
    let mut languages = Map::new();
    for en in ["en_us", "en_US"] {
        if let Some(value) = source.remove(en) {
            languages.insert("en_us".to_string(), value);
        }
    }

    let mut rest: Vec<(String, Value)> = source.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    for (code, value) in rest {
        languages.insert(code.to_lowercase(), value);
    }
    languages
}

/// Language listing from `pack.mcmeta`; the file is removed afterwards.
pub fn index_languages(root: &Path, writer: &mut IndexWriter) -> Result<usize> {
    let path = root.join(PACK_MCMETA);
    if !path.is_file() {
        return Ok(0);
    }

    let mut count = 0;
    let language = read_report(root, PACK_MCMETA)?
        .and_then(|mut pack| pack.get_mut("language").map(Value::take));
    if let Some(Value::Object(source)) = language {
        if !source.is_empty() {
            let languages = normalize_languages(source);
            count = languages.len();
            writer.write_json(LANGUAGES_TARGET, &languages)?;
        }
    }

    fs::remove_file(&path).with_context(|| format!("Remove {:?}", path))?;
    log::debug!("{} languages", count);
    Ok(count)
}
