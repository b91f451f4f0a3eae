pub mod bulk;
pub mod formats;
pub mod merge;
pub mod metadata;
pub mod shift;
pub mod templates;
pub mod worker;
