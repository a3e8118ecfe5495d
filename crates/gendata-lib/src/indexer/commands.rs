//! Command syntax listings from the brigadier tree in `commands.json`.

use crate::builder::config::{COMMANDS_REPORT, UNKNOWN_ARGUMENT_ALLOWLIST};
use crate::builder::error::BuildError;
use crate::indexer::ids::{flatten, CanonicalId};
use crate::indexer::read_report;
use crate::indexer::writer::{IndexWriter, Listings};
use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

pub const ARGUMENT_TYPES_TARGET: &str = "command_argument_type.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Literal,
    Argument,
    Unknown,
    Other(String),
}

impl NodeKind {
    fn parse(raw: &str) -> Self {
        let id = CanonicalId::parse(raw);
        match (id.namespace(), id.path()) {
            ("minecraft", "root") => NodeKind::Root,
            ("minecraft", "literal") => NodeKind::Literal,
            ("minecraft", "argument") => NodeKind::Argument,
            ("minecraft", "unknown") => NodeKind::Unknown,
            _ => NodeKind::Other(raw.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    executable: bool,
    #[serde(default)]
    children: Map<String, Value>,
    #[serde(default)]
    parser: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    redirect: Option<Vec<String>>,
}

/// One node of the command tree, children in report order.
#[derive(Debug, Clone)]
pub struct CommandNode {
    pub kind: NodeKind,
    pub executable: bool,
    pub children: Vec<(String, CommandNode)>,
    pub parser: Option<CanonicalId>,
    pub properties: Vec<(String, String)>,
    pub redirect: Option<String>,
}

impl CommandNode {
    /// Decode a node; `command` names the top-level command for errors.
    pub fn parse(command: &str, value: &Value) -> Result<Self, BuildError> {
        let raw = RawNode::deserialize(value)
            .map_err(|e| BuildError::structural("command", command, e.to_string()))?;

        let redirect = match raw.redirect {
            None => None,
            Some(mut targets) if targets.len() <= 1 => targets.pop(),
            Some(targets) => {
                return Err(BuildError::structural(
                    "command",
                    command,
                    format!("{} redirect targets", targets.len()),
                ))
            }
        };

        let children = raw
            .children
            .iter()
            .map(|(name, child)| Ok((name.clone(), CommandNode::parse(command, child)?)))
            .collect::<Result<Vec<_>, BuildError>>()?;

        Ok(CommandNode {
            kind: NodeKind::parse(&raw.kind),
            executable: raw.executable,
            children,
            parser: raw.parser.as_deref().map(CanonicalId::parse),
            properties: raw
                .properties
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect(),
            redirect,
        })
    }
}

/// Syntax token for a child node: literal name, or
/// `<name parser[k="v", ...]>` for arguments.
fn argument_token(
    command: &str,
    name: &str,
    node: &CommandNode,
    parsers: &mut BTreeSet<CanonicalId>,
) -> Result<String, BuildError> {
    match &node.kind {
        NodeKind::Literal => Ok(name.to_string()),
        NodeKind::Argument | NodeKind::Unknown => {
            if node.kind == NodeKind::Unknown && !UNKNOWN_ARGUMENT_ALLOWLIST.contains(&name) {
                return Err(BuildError::structural(
                    "command",
                    command,
                    format!("unknown node type for argument '{}'", name),
                ));
            }
            let mut token = format!("<{}", name);
            if let Some(parser) = &node.parser {
                parsers.insert(parser.clone());
                token.push(' ');
                token.push_str(parser.as_str());
            }
            if !node.properties.is_empty() {
                let props = node
                    .properties
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                token.push('[');
                token.push_str(&props);
                token.push(']');
            }
            token.push('>');
            Ok(token)
        }
        NodeKind::Root => Err(BuildError::structural("command", command, "nested root node")),
        NodeKind::Other(kind) => Err(BuildError::structural(
            "command",
            command,
            format!("unknown node type '{}'", kind),
        )),
    }
}

/// Every syntax reachable from `node`, prefixed with `base`
pub fn syntaxes(
    command: &str,
    base: &str,
    node: &CommandNode,
    parsers: &mut BTreeSet<CanonicalId>,
) -> Result<Vec<String>, BuildError> {
    let mut out = Vec::new();
    if node.executable {
        out.push(base.to_string());
    }

    if let Some(target) = &node.redirect {
        out.push(format!("{} >>redirect{{{}}}", base, target));
    } else {
        for (name, child) in &node.children {
            let next = format!("{} {}", base, argument_token(command, name, child, parsers)?);
            out.extend(syntaxes(command, &next, child, parsers)?);
        }
    }
    Ok(out)
}

/// Per-command `.json`/`.txt` files. Parser ids go to `listings` under
/// [`ARGUMENT_TYPES_TARGET`], where they merge with the registry of the same
/// name.
pub fn index_commands(
    root: &Path,
    writer: &mut IndexWriter,
    listings: &mut Listings,
) -> Result<usize> {
    let Some(report) = read_report(root, COMMANDS_REPORT)? else {
        return Ok(0);
    };
    let Some(commands) = report.get("children").and_then(Value::as_object) else {
        log::warn!("{} has no commands", COMMANDS_REPORT);
        return Ok(0);
    };

    let mut parsers = BTreeSet::new();
    for (key, raw) in commands {
        let name = flatten(key);
        let node = CommandNode::parse(&name, raw)?;
        writer.write_json(&format!("commands/{}.json", name), raw)?;
        let lines = syntaxes(&name, &name, &node, &mut parsers)?;
        writer.write_lines(&format!("commands/{}.txt", name), &lines)?;
    }

    log::debug!("{} commands, {} argument types", commands.len(), parsers.len());
    listings.add_entries(ARGUMENT_TYPES_TARGET, parsers);
    Ok(commands.len())
}
