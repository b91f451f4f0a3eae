use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ToolConfig;
use crate::models::{MetadataRecord, TagValue};
use crate::platform::{current_platform, Platform};

/// Joins list items on write and is passed to the tool as `-sep`. A control
/// character, so commas inside items and in plain text tags stay intact.
pub const LIST_SEPARATOR: &str = "\u{1f}";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("exiftool executable not found ({} location(s) searched)", .searched.len())]
    ToolNotFound { searched: Vec<PathBuf> },

    #[error("failed to launch {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("exiftool failed with {status}: {stderr}")]
    ExternalTool { status: String, stderr: String },

    #[error("exiftool produced unreadable output: {0}")]
    MalformedOutput(String),
}

impl MetadataError {
    /// Non-zero exits and unparseable output, as opposed to discovery failures.
    pub fn is_external_tool_error(&self) -> bool {
        matches!(
            self,
            Self::Spawn { .. } | Self::ExternalTool { .. } | Self::MalformedOutput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;

/// Everything the editor needs from the external metadata program.
pub trait MetadataTool: Send + Sync {
    fn read_metadata(&self, path: &Path) -> Result<MetadataRecord>;

    fn write_fields(&self, path: &Path, fields: &MetadataRecord) -> Result<()>;

    fn strip_all_metadata(&self, path: &Path) -> Result<()>;

    fn shift_all_dates(&self, path: &Path, shift_expression: &str) -> Result<()>;

    /// Embedded cover art or preview. `None` is the normal "no picture" outcome.
    fn extract_embedded_picture(&self, path: &Path) -> Option<Vec<u8>>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExifTool {
    executable: PathBuf,
}

impl ExifTool {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn discover(config: &ToolConfig) -> Result<Self> {
        let platform = current_platform();
        let mut fallbacks = platform.known_tool_locations();
        fallbacks.extend(
            config
                .extra_search_paths
                .iter()
                .map(|dir| dir.join(platform.tool_executable_name())),
        );

        let executable = locate_executable(
            config.executable.as_deref(),
            std::env::var_os("PATH"),
            &fallbacks,
            platform,
        )?;

        info!(executable = %executable.display(), "using exiftool");
        Ok(Self::new(executable))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn run(&self, args: &[OsString]) -> Result<Output> {
        debug!(program = %self.executable.display(), ?args, "invoking exiftool");

        Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|source| MetadataError::Spawn {
                program: self.executable.clone(),
                source,
            })
    }

    fn run_checked(&self, args: &[OsString]) -> Result<Vec<u8>> {
        let output = self.run(args)?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            warn!(status = %output.status, %stderr, "exiftool reported failure");
            return Err(MetadataError::ExternalTool {
                status: output.status.to_string(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            debug!(%stderr, "exiftool diagnostics");
        }

        Ok(output.stdout)
    }
}

impl MetadataTool for ExifTool {
    fn read_metadata(&self, path: &Path) -> Result<MetadataRecord> {
        let stdout = self.run_checked(&read_args(path))?;
        let record = parse_read_output(&stdout)?;
        info!(path = %path.display(), tags = record.len(), "metadata loaded");
        Ok(record)
    }

    fn write_fields(&self, path: &Path, fields: &MetadataRecord) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }

        self.run_checked(&write_args(path, fields))?;
        info!(path = %path.display(), fields = fields.len(), "metadata written");
        Ok(())
    }

    fn strip_all_metadata(&self, path: &Path) -> Result<()> {
        self.run_checked(&strip_args(path))?;
        info!(path = %path.display(), "all metadata removed");
        Ok(())
    }

    fn shift_all_dates(&self, path: &Path, shift_expression: &str) -> Result<()> {
        self.run_checked(&shift_args(path, shift_expression))?;
        info!(path = %path.display(), shift = shift_expression, "dates shifted");
        Ok(())
    }

    fn extract_embedded_picture(&self, path: &Path) -> Option<Vec<u8>> {
        let output = match self.run(&picture_args(path)) {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "picture extraction failed");
                return None;
            }
        };

        if !output.status.success() || output.stdout.is_empty() {
            return None;
        }

        Some(output.stdout)
    }
}

/// Resolves the tool executable: explicit path, then the search path, then
/// the fallback locations in order.
pub fn locate_executable(
    explicit: Option<&Path>,
    search_path: Option<OsString>,
    fallbacks: &[PathBuf],
    platform: Platform,
) -> Result<PathBuf> {
    let mut searched = Vec::new();

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        warn!(path = %path.display(), "configured exiftool path does not exist");
        searched.push(path.to_path_buf());
    }

    if let Some(paths) = search_path {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if let Ok(found) = which::which_in(platform.tool_executable_name(), Some(&paths), cwd) {
            return Ok(found);
        }
        searched.extend(std::env::split_paths(&paths));
    }

    for candidate in fallbacks {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
        searched.push(candidate.clone());
    }

    Err(MetadataError::ToolNotFound { searched })
}

pub fn parse_read_output(stdout: &[u8]) -> Result<MetadataRecord> {
    let value: Value = serde_json::from_slice(stdout)
        .map_err(|err| MetadataError::MalformedOutput(err.to_string()))?;

    let Value::Array(items) = value else {
        return Err(MetadataError::MalformedOutput(String::from(
            "expected a JSON array",
        )));
    };

    let Some(Value::Object(first)) = items.into_iter().next() else {
        return Err(MetadataError::MalformedOutput(String::from(
            "expected a JSON object for the file",
        )));
    };

    Ok(first
        .into_iter()
        .map(|(key, value)| (key, TagValue::from(value)))
        .collect())
}

/// Value text for a `-Key=value` argument. Embedded double quotes are escaped.
pub fn encode_for_write(value: &TagValue) -> String {
    match value {
        TagValue::Text(text) => text.replace('"', "\\\""),
        TagValue::Number(number) => number.to_string(),
        TagValue::Sequence(items) => items
            .iter()
            .map(encode_for_write)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        TagValue::Mapping(_) => value.to_string(),
    }
}

pub fn field_assignment(key: &str, value: &TagValue) -> String {
    format!("-{key}={}", encode_for_write(value))
}

pub fn read_args(path: &Path) -> Vec<OsString> {
    with_path(["-j", "-G", "-s"], path)
}

pub fn write_args(path: &Path, fields: &MetadataRecord) -> Vec<OsString> {
    let mut args = vec![OsString::from("-overwrite_original")];

    if fields
        .values()
        .any(|value| matches!(value, TagValue::Sequence(_)))
    {
        args.push(OsString::from("-sep"));
        args.push(OsString::from(LIST_SEPARATOR));
    }

    args.extend(
        fields
            .iter()
            .map(|(key, value)| OsString::from(field_assignment(key, value))),
    );
    args.push(path.as_os_str().to_os_string());
    args
}

pub fn strip_args(path: &Path) -> Vec<OsString> {
    with_path(["-all=", "-overwrite_original"], path)
}

pub fn shift_args(path: &Path, shift_expression: &str) -> Vec<OsString> {
    vec![
        OsString::from("-overwrite_original"),
        OsString::from(format!("-AllDates+={shift_expression}")),
        path.as_os_str().to_os_string(),
    ]
}

pub fn picture_args(path: &Path) -> Vec<OsString> {
    with_path(["-Picture", "-b"], path)
}

fn with_path<const N: usize>(flags: [&str; N], path: &Path) -> Vec<OsString> {
    flags
        .into_iter()
        .map(OsString::from)
        .chain(std::iter::once(path.as_os_str().to_os_string()))
        .collect()
}
