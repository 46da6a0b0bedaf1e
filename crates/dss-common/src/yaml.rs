//! YAML parsing utilities using yaml-rust2
//!
//! Metadata files and rendered templates are parsed with yaml-rust2 and
//! converted to `serde_json::Value`, which is what the rest of the workspace
//! works with. Output YAML goes through serde_yaml instead.

use serde_json::{Map, Number, Value};
use thiserror::Error;
use yaml_rust2::{Yaml, YamlLoader};

/// Error type for YAML parsing
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct YamlError(String);

fn load(input: &str) -> Result<Vec<Yaml>, YamlError> {
    YamlLoader::load_from_str(input).map_err(|e| YamlError(e.to_string()))
}

/// Parse a YAML (or JSON) document into a `serde_json::Value`.
///
/// Only the first document of a stream is read; empty input is `Value::Null`.
pub fn parse_yaml(input: &str) -> Result<Value, YamlError> {
    load(input)?
        .into_iter()
        .next()
        .map_or(Ok(Value::Null), to_json)
}

/// Parse a multi-document YAML stream into its non-empty documents.
///
/// Documents that are empty or only comments (`---` followed by nothing)
/// are dropped, so a template that renders to whitespace yields no documents.
pub fn parse_yaml_multi(input: &str) -> Result<Vec<Value>, YamlError> {
    load(input)?
        .into_iter()
        .filter(|doc| !doc.is_null())
        .map(to_json)
        .collect()
}

fn to_json(yaml: Yaml) -> Result<Value, YamlError> {
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(b),
        Yaml::Integer(i) => Value::from(i),
        Yaml::Real(text) => real_to_json(text),
        Yaml::String(s) => Value::String(s),
        Yaml::Array(items) => Value::Array(
            items
                .into_iter()
                .map(to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Hash(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key_to_string(key)?, to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Alias(_) => return Err(YamlError("YAML aliases are not supported".to_string())),
        Yaml::BadValue => return Err(YamlError("malformed YAML value".to_string())),
    })
}

/// JSON has no infinities or NaN. YAML's `.inf`, `-.inf` and `.nan` are kept
/// as their literal text so the document still loads and templates can emit
/// them unchanged.
fn real_to_json(text: String) -> Value {
    match text.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(text),
    }
}

fn key_to_string(key: Yaml) -> Result<String, YamlError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(YamlError(format!("unsupported mapping key: {other:?}"))),
    }
}
