use tracing::debug;

use crate::models::{MetadataModel, TagKey, TagValue};

/// Copies incoming values onto keys the model already has, marking each one
/// modified. Keys the file does not already report are skipped, so imports
/// never introduce tags the tool has not seen on this file.
///
/// Returns the number of keys updated.
pub fn merge_known_keys<I>(model: &mut MetadataModel, incoming: I) -> usize
where
    I: IntoIterator<Item = (TagKey, TagValue)>,
{
    let mut updated = 0;
    let mut skipped = 0;

    for (key, value) in incoming {
        if model.contains_key(&key) {
            model.set_field(key, value);
            updated += 1;
        } else {
            skipped += 1;
        }
    }

    debug!(updated, skipped, "merged incoming tags");
    updated
}
