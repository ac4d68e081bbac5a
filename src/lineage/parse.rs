use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::node::Node;

/// Accepts either a bare array of nodes or an object with a `nodes` array.
pub fn parse_nodes(raw: &str) -> Result<Vec<Node>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in node list")?;

    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("nodes") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(anyhow!("`nodes` must be an array")),
            None => return Err(anyhow!("node list object has no `nodes` field")),
        },
        _ => return Err(anyhow!("node list must be an array or an object with `nodes`")),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            serde_json::from_value::<Node>(entry)
                .with_context(|| format!("invalid node at position {position}"))
        })
        .collect()
}
