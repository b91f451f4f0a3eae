use std::collections::{BTreeMap, BTreeSet};

use crate::models::tag::{split_tag_key, TagKey, TagValue};

/// Tag key to value mapping, shaped like one object of ExifTool's `-j -G` output.
pub type MetadataRecord = BTreeMap<TagKey, TagValue>;

#[derive(Clone, Debug, PartialEq)]
pub struct TagEntry {
    pub tag: String,
    pub key: TagKey,
    pub value: TagValue,
    pub display: String,
    pub modified: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TagGroup {
    pub name: String,
    pub entries: Vec<TagEntry>,
}

impl TagGroup {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Working copy of one file's metadata plus the keys edited since load.
///
/// Every key in the modified set is present in the record: edits create keys,
/// and the only way to drop keys is a wholesale [`MetadataModel::load`], which
/// also clears the set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataModel {
    record: MetadataRecord,
    modified: BTreeSet<TagKey>,
}

impl MetadataModel {
    pub fn new(record: MetadataRecord) -> Self {
        Self {
            record,
            modified: BTreeSet::new(),
        }
    }

    pub fn load(&mut self, record: MetadataRecord) {
        self.record = record;
        self.modified.clear();
    }

    pub fn clear_modified(&mut self) {
        self.modified.clear();
    }

    pub fn set_field(&mut self, key: impl Into<TagKey>, value: TagValue) {
        let key = key.into();
        self.modified.insert(key.clone());
        self.record.insert(key, value);
    }

    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.record.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.record.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn is_modified(&self, key: &str) -> bool {
        self.modified.contains(key)
    }

    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
    }

    /// The edited fields with their current values, i.e. what a save writes.
    pub fn modified_fields(&self) -> MetadataRecord {
        self.modified
            .iter()
            .filter_map(|key| {
                self.record
                    .get(key)
                    .map(|value| (key.clone(), value.clone()))
            })
            .collect()
    }

    pub fn grouped_view(&self, filter: &str) -> Vec<TagGroup> {
        let query = filter.to_lowercase();

        self.build_groups(self.record.iter().filter(|(key, value)| {
            query.is_empty()
                || key.to_lowercase().contains(&query)
                || value.to_string().to_lowercase().contains(&query)
        }))
    }

    pub fn modified_only_view(&self) -> Vec<TagGroup> {
        self.build_groups(
            self.modified
                .iter()
                .filter_map(|key| self.record.get_key_value(key)),
        )
    }

    fn build_groups<'a, I>(&'a self, entries: I) -> Vec<TagGroup>
    where
        I: Iterator<Item = (&'a TagKey, &'a TagValue)>,
    {
        let mut groups: BTreeMap<&str, Vec<TagEntry>> = BTreeMap::new();

        for (key, value) in entries {
            let (group, tag) = split_tag_key(key);
            groups.entry(group).or_default().push(TagEntry {
                tag: tag.to_string(),
                key: key.clone(),
                value: value.clone(),
                display: value.display_value(),
                modified: self.modified.contains(key),
            });
        }

        groups
            .into_iter()
            .map(|(name, mut entries)| {
                entries.sort_by(|left, right| {
                    left.tag.cmp(&right.tag).then_with(|| left.key.cmp(&right.key))
                });
                TagGroup {
                    name: name.to_string(),
                    entries,
                }
            })
            .collect()
    }
}
