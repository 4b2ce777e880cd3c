//! Action metadata model
//!
//! The subset of `action.yml` that bindings are generated from: the
//! description, the inputs and the outputs. Parsing is strict inside input
//! and output definitions so that a malformed document fails at the
//! provider boundary instead of producing a half-typed binding. Other
//! top-level keys (`runs`, `branding`, `author`) are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Errors raised while parsing an action metadata document
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("invalid action metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parsed action metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionMetadata {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    #[serde(default, deserialize_with = "nullable")]
    pub inputs: BTreeMap<String, ActionInput>,

    #[serde(default, deserialize_with = "nullable")]
    pub outputs: BTreeMap<String, ActionOutput>,
}

/// One entry under `inputs:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ActionInput {
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    #[serde(default, deserialize_with = "flag")]
    pub required: bool,

    #[serde(default, deserialize_with = "scalar")]
    pub default: Option<String>,

    #[serde(default)]
    pub deprecation_message: Option<String>,
}

/// One entry under `outputs:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionOutput {
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    /// Expression a composite action maps the output from.
    #[serde(default, deserialize_with = "scalar")]
    pub value: Option<String>,
}

impl ActionMetadata {
    /// Parse an `action.yml` document.
    pub fn from_yaml(content: &str) -> Result<Self, MetadataError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

impl ActionInput {
    /// Required inputs without a default must always be supplied.
    pub fn is_mandatory(&self) -> bool {
        self.required && self.default.is_none()
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `required:` is a boolean, but real-world files also quote it.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(D::Error::custom(format!(
            "expected a boolean for 'required', found {other:?}"
        ))),
    }
}

/// Defaults may be written as numbers or booleans; they are strings on the wire.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s)),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {other:?}"
        ))),
    }
}
