use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{MetadataRecord, TagKey, TagValue};

/// A saved, named set of tag values for reuse across files.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub tags: BTreeMap<TagKey, String>,
}

impl Template {
    pub fn new(name: impl Into<String>, tags: BTreeMap<TagKey, String>) -> Self {
        Self {
            name: name.into(),
            tags,
        }
    }

    /// Parses the `Key=Value` editor format. Blank lines, `#` comments and
    /// lines without `=` are ignored; the first `=` separates key and value.
    pub fn parse_text(text: &str) -> BTreeMap<TagKey, String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }

    pub fn to_text(&self) -> String {
        self.tags
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect()
    }

    pub fn as_record(&self) -> MetadataRecord {
        self.tags
            .iter()
            .map(|(key, value)| (key.clone(), TagValue::text(value.as_str())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
