//! On-disk formats for configuration documents.
//!
//! Both formats share one in-memory representation: a [`serde_json::Value`]
//! tree.  JSON maps onto it directly.  TOML is parsed into a [`toml::Table`]
//! and converted, so a TOML document always has a mapping at its root.
//!
//! # TOML limitations
//!
//! TOML has no `null` and cannot store integers above `i64::MAX`, and its root
//! must be a table.  Content that breaks any of these rules is rejected with
//! [`ConfigError::Serialization`] before anything is written.  TOML datetimes
//! are read back as plain strings.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{ConfigError, Result};

/// Serialization format of a configuration document, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// All supported formats.
    pub const ALL: [ConfigFormat; 2] = [ConfigFormat::Json, ConfigFormat::Toml];

    /// Resolves a user supplied file type such as `"json"`, `".json"` or `"TOML"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for anything else.
    pub fn from_file_type(file_type: &str) -> Result<Self> {
        let normalized = file_type.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(file_type.to_string())),
        }
    }

    /// Detects the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] when the extension is missing
    /// or unknown.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_file_type(ext)
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    /// Parses `text` into the shared value tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `text` is not valid for this format.
    pub fn parse(self, text: &str) -> Result<Value> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| self.parse_error(e)),
            Self::Toml => {
                let table: toml::Table = toml::from_str(text).map_err(|e| self.parse_error(e))?;
                toml_table_to_value(table).map_err(|message| ConfigError::Parse {
                    format: self,
                    message,
                })
            }
        }
    }

    /// Parses raw bytes, requiring UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid UTF-8 or invalid content.
    pub fn parse_bytes(self, bytes: &[u8]) -> Result<Value> {
        let text = std::str::from_utf8(bytes).map_err(|e| self.parse_error(e))?;
        self.parse(text)
    }

    /// Renders `value` as text in this format.
    ///
    /// JSON output is pretty printed with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] if the value cannot be
    /// represented in this format.
    pub fn serialize(self, value: &Value) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| self.serialize_error(e)),
            Self::Toml => {
                if !value.is_object() {
                    return Err(self.serialize_error(
                        "TOML documents must have a table at the root",
                    ));
                }
                check_toml_representable(value, "")?;
                toml::to_string(value).map_err(|e| self.serialize_error(e))
            }
        }
    }

    fn parse_error(self, e: impl fmt::Display) -> ConfigError {
        ConfigError::Parse {
            format: self,
            message: e.to_string(),
        }
    }

    fn serialize_error(self, e: impl fmt::Display) -> ConfigError {
        ConfigError::Serialization {
            format: self,
            message: e.to_string(),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Toml => f.write_str("TOML"),
        }
    }
}

// ── TOML <-> value tree ───────────────────────────────────────────────────────

fn toml_table_to_value(table: toml::Table) -> std::result::Result<Value, String> {
    let mut map = Map::with_capacity(table.len());
    for (key, value) in table {
        map.insert(key, toml_to_value(value)?);
    }
    Ok(Value::Object(map))
}

fn toml_to_value(value: toml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite float {f} has no JSON-compatible representation"))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_value)
                .collect::<std::result::Result<_, _>>()?,
        ),
        toml::Value::Table(table) => toml_table_to_value(table)?,
    })
}

/// Walks `value` and reports the first element TOML cannot hold.
fn check_toml_representable(value: &Value, at: &str) -> Result<()> {
    let fail = |message: String| ConfigError::Serialization {
        format: ConfigFormat::Toml,
        message,
    };
    match value {
        Value::Null => Err(fail(format!("null value at `{at}` has no TOML representation"))),
        Value::Number(n) if n.is_u64() && n.as_i64().is_none() => {
            Err(fail(format!("integer {n} at `{at}` exceeds the TOML integer range")))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_toml_representable(item, &format!("{at}[{i}]"))),
        Value::Object(map) => map.iter().try_for_each(|(key, item)| {
            let child = if at.is_empty() {
                key.clone()
            } else {
                format!("{at}.{key}")
            };
            check_toml_representable(item, &child)
        }),
        _ => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
