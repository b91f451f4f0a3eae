use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Fully qualified tag name, `Group:Tag` or a bare `Tag`.
pub type TagKey = String;

/// Group assigned to keys that carry no `Group:` prefix.
pub const DEFAULT_GROUP: &str = "File";

pub const DISPLAY_MAX_CHARS: usize = 100;
pub const DISPLAY_KEEP_CHARS: usize = 97;
pub const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum TagValue {
    Text(String),
    Number(Number),
    Sequence(Vec<TagValue>),
    Mapping(BTreeMap<String, TagValue>),
}

impl TagValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Value as shown in the tag tree, truncated to [`DISPLAY_MAX_CHARS`].
    pub fn display_value(&self) -> String {
        truncate_for_display(&self.to_string())
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Sequence(_) | Self::Mapping(_) => {
                let encoded = serde_json::to_string(&Value::from(self.clone()))
                    .map_err(|_| fmt::Error)?;
                write!(f, "{encoded}")
            }
        }
    }
}

impl From<Value> for TagValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::Bool(true) => Self::text("True"),
            Value::Bool(false) => Self::text("False"),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<TagValue> for Value {
    fn from(value: TagValue) -> Self {
        match value {
            TagValue::Text(s) => Value::String(s),
            TagValue::Number(n) => Value::Number(n),
            TagValue::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            TagValue::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

/// Splits a key on its first `:`; keys without one belong to [`DEFAULT_GROUP`].
pub fn split_tag_key(key: &str) -> (&str, &str) {
    match key.split_once(':') {
        Some((group, tag)) => (group, tag),
        None => (DEFAULT_GROUP, key),
    }
}

pub fn truncate_for_display(value: &str) -> String {
    if value.chars().count() <= DISPLAY_MAX_CHARS {
        return value.to_string();
    }

    let mut truncated: String = value.chars().take(DISPLAY_KEEP_CHARS).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
