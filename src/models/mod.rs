mod operation;
mod record;
mod tag;
mod template;

pub use operation::{
    BatchOperation, BatchReport, BatchState, OperationResult, ProgressEvent, ShiftDelta,
};
pub use record::{MetadataModel, MetadataRecord, TagEntry, TagGroup};
pub use tag::{
    split_tag_key, truncate_for_display, TagKey, TagValue, DEFAULT_GROUP, DISPLAY_KEEP_CHARS,
    DISPLAY_MAX_CHARS, ELLIPSIS,
};
pub use template::Template;
