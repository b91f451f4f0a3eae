use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::core::formats::{self, MediaCategory};
use crate::core::merge::merge_known_keys;
use crate::core::metadata::{MetadataError, MetadataTool};
use crate::core::shift::{preview_shift, ShiftPreview};
use crate::core::templates::TemplateError;
use crate::models::{MetadataModel, MetadataRecord, ShiftDelta, TagGroup, TagKey, TagValue, Template};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no file is open")]
    NoFileOpen,

    #[error("no changes to save")]
    NothingToSave,

    #[error("no valid metadata to import: {0}")]
    ImportParse(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One open file and its editable metadata.
///
/// Replaces process-wide "current file" state: every front end (or test)
/// creates its own session around a [`MetadataTool`].
pub struct EditorSession {
    tool: Arc<dyn MetadataTool>,
    current_file: Option<PathBuf>,
    model: MetadataModel,
    clipboard: Option<MetadataRecord>,
    status: String,
}

impl EditorSession {
    pub fn new(tool: Arc<dyn MetadataTool>) -> Self {
        Self {
            tool,
            current_file: None,
            model: MetadataModel::default(),
            clipboard: None,
            status: String::from("Open a file to start."),
        }
    }

    pub fn tool(&self) -> Arc<dyn MetadataTool> {
        Arc::clone(&self.tool)
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn model(&self) -> &MetadataModel {
        &self.model
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn file_category(&self) -> Option<MediaCategory> {
        self.current_file.as_deref().map(formats::detect_category)
    }

    /// Reads `path` and makes it the current file. On failure the session
    /// keeps whatever it had before.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let record = self.tool.read_metadata(path)?;
        self.apply_loaded(path.to_path_buf(), record);
        Ok(())
    }

    /// Installs a record read elsewhere, e.g. on a [`ToolWorker`](crate::core::worker::ToolWorker).
    pub fn apply_loaded(&mut self, path: PathBuf, record: MetadataRecord) {
        self.status = format!("Loaded: {}", file_label(&path));
        self.model.load(record);
        self.current_file = Some(path);
    }

    pub fn reload(&mut self) -> Result<(), AppError> {
        let path = self.require_file()?.to_path_buf();
        let record = self.tool.read_metadata(&path)?;
        self.model.load(record);
        Ok(())
    }

    pub fn set_field(&mut self, key: impl Into<TagKey>, value: TagValue) -> Result<(), AppError> {
        self.require_file()?;
        let key = key.into();
        self.status = format!("Modified: {key}");
        self.model.set_field(key, value);
        Ok(())
    }

    pub fn grouped_view(&self, filter: &str) -> Vec<TagGroup> {
        self.model.grouped_view(filter)
    }

    pub fn modified_only_view(&self) -> Vec<TagGroup> {
        self.model.modified_only_view()
    }

    /// Writes every modified field in one tool call, then reloads from disk.
    /// Returns the number of fields written.
    pub fn save(&mut self) -> Result<usize, AppError> {
        let path = self.require_file()?.to_path_buf();
        if !self.model.has_changes() {
            return Err(AppError::NothingToSave);
        }

        let fields = self.model.modified_fields();
        self.tool.write_fields(&path, &fields)?;
        self.model.clear_modified();
        info!(path = %path.display(), fields = fields.len(), "changes saved");

        self.reload()?;
        self.status = String::from("Changes saved");
        Ok(fields.len())
    }

    pub fn export_to(&mut self, output: &Path) -> Result<(), AppError> {
        self.require_file()?;

        let encoded = serde_json::to_string_pretty(self.model.record())
            .map_err(|err| AppError::Io(io::Error::other(err)))?;
        fs::write(output, encoded)?;

        self.status = format!("Exported to: {}", file_label(output));
        Ok(())
    }

    /// Merges a JSON export into the open file's metadata. Only tags the file
    /// already has are taken; the count of updated tags is returned.
    pub fn import_from(&mut self, input: &Path) -> Result<usize, AppError> {
        self.require_file()?;

        let contents = fs::read_to_string(input)?;
        let incoming = parse_record(&contents)?;
        let count = merge_known_keys(&mut self.model, incoming);

        self.status = format!("Imported {count} tags from {}", file_label(input));
        Ok(count)
    }

    /// Keeps the full record for a later [`paste`](Self::paste) and returns it
    /// as JSON for the system clipboard.
    pub fn copy_all(&mut self) -> Result<String, AppError> {
        self.require_file()?;

        let record = self.model.record().clone();
        let encoded = serde_json::to_string_pretty(&record)
            .map_err(|err| AppError::Io(io::Error::other(err)))?;

        self.status = format!("Copied {} tags to clipboard", record.len());
        self.clipboard = Some(record);
        Ok(encoded)
    }

    /// Pastes the internally copied record, or `text` when nothing was copied
    /// in this session.
    pub fn paste(&mut self, text: Option<&str>) -> Result<usize, AppError> {
        self.require_file()?;

        let incoming = match (&self.clipboard, text) {
            (Some(record), _) => record.clone(),
            (None, Some(text)) => parse_record(text)?,
            (None, None) => {
                return Err(AppError::ImportParse(String::from("clipboard is empty")));
            }
        };

        let count = merge_known_keys(&mut self.model, incoming);
        self.status = format!("Pasted {count} tags");
        Ok(count)
    }

    pub fn apply_template(&mut self, template: &Template) -> Result<usize, AppError> {
        self.require_file()?;

        let count = merge_known_keys(&mut self.model, template.as_record());
        self.status = format!("Applied {count} tags from '{}'", template.name);
        Ok(count)
    }

    pub fn strip_all(&mut self) -> Result<(), AppError> {
        let path = self.require_file()?.to_path_buf();
        self.tool.strip_all_metadata(&path)?;
        self.reload()?;
        self.status = String::from("All metadata removed");
        Ok(())
    }

    /// Shifts every date tag of the open file. A zero delta makes no tool call
    /// and returns `false`.
    pub fn shift_dates(&mut self, delta: &ShiftDelta) -> Result<bool, AppError> {
        let path = self.require_file()?.to_path_buf();

        let expression = delta.expression();
        if expression.is_empty() {
            self.status = String::from("No shift specified");
            return Ok(false);
        }

        self.tool.shift_all_dates(&path, &expression)?;
        self.reload()?;
        self.status = String::from("Date/time shifted successfully");
        Ok(true)
    }

    pub fn shift_preview(&self, delta: &ShiftDelta) -> Vec<ShiftPreview> {
        preview_shift(&self.model, delta)
    }

    /// Cover art of an open audio file, if it has any.
    pub fn album_art(&self) -> Option<Vec<u8>> {
        let path = self.current_file.as_deref()?;
        if formats::detect_category(path) != MediaCategory::Audio {
            return None;
        }

        self.tool.extract_embedded_picture(path)
    }

    fn require_file(&self) -> Result<&Path, AppError> {
        self.current_file.as_deref().ok_or(AppError::NoFileOpen)
    }
}

/// Parses a JSON object of tag values as produced by export or copy.
pub fn parse_record(text: &str) -> Result<MetadataRecord, AppError> {
    serde_json::from_str(text).map_err(|err| AppError::ImportParse(err.to_string()))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
