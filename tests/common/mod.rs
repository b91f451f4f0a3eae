#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use exiftool_desk::core::metadata::{MetadataError, MetadataTool, Result};
use exiftool_desk::models::{MetadataRecord, TagValue};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Read(PathBuf),
    Write(PathBuf, MetadataRecord),
    Strip(PathBuf),
    Shift(PathBuf, String),
    Picture(PathBuf),
}

/// In-memory stand-in for exiftool. Writes land in the stored record so a
/// reload sees them.
#[derive(Default)]
pub struct FakeTool {
    files: Mutex<HashMap<PathBuf, MetadataRecord>>,
    pictures: Mutex<HashMap<PathBuf, Vec<u8>>>,
    failing: Mutex<HashSet<PathBuf>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, record: MetadataRecord) -> Self {
        self.files
            .lock()
            .expect("files lock")
            .insert(path.into(), record);
        self
    }

    pub fn with_picture(self, path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        self.pictures
            .lock()
            .expect("pictures lock")
            .insert(path.into(), bytes.to_vec());
        self
    }

    pub fn failing_on(self, path: impl Into<PathBuf>) -> Self {
        self.failing
            .lock()
            .expect("failing lock")
            .insert(path.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn record_of(&self, path: &Path) -> Option<MetadataRecord> {
        self.files.lock().expect("files lock").get(path).cloned()
    }

    fn log(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.failing.lock().expect("failing lock").contains(path) {
            return Err(MetadataError::ExternalTool {
                status: String::from("exit status: 1"),
                stderr: format!("Error: File not writable - {}", path.display()),
            });
        }
        Ok(())
    }
}

impl MetadataTool for FakeTool {
    fn read_metadata(&self, path: &Path) -> Result<MetadataRecord> {
        self.log(Call::Read(path.to_path_buf()));
        self.check(path)?;
        self.record_of(path).ok_or_else(|| MetadataError::ExternalTool {
            status: String::from("exit status: 1"),
            stderr: format!("Error: File not found - {}", path.display()),
        })
    }

    fn write_fields(&self, path: &Path, fields: &MetadataRecord) -> Result<()> {
        self.log(Call::Write(path.to_path_buf(), fields.clone()));
        self.check(path)?;
        let mut files = self.files.lock().expect("files lock");
        let record = files.entry(path.to_path_buf()).or_default();
        record.extend(fields.clone());
        Ok(())
    }

    fn strip_all_metadata(&self, path: &Path) -> Result<()> {
        self.log(Call::Strip(path.to_path_buf()));
        self.check(path)?;
        let mut files = self.files.lock().expect("files lock");
        if let Some(record) = files.get_mut(path) {
            record.retain(|key, _| key.starts_with("File:"));
        }
        Ok(())
    }

    fn shift_all_dates(&self, path: &Path, shift_expression: &str) -> Result<()> {
        self.log(Call::Shift(path.to_path_buf(), shift_expression.to_string()));
        self.check(path)
    }

    fn extract_embedded_picture(&self, path: &Path) -> Option<Vec<u8>> {
        self.log(Call::Picture(path.to_path_buf()));
        self.pictures.lock().expect("pictures lock").get(path).cloned()
    }
}

pub fn record(pairs: &[(&str, &str)]) -> MetadataRecord {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), TagValue::text(*value)))
        .collect()
}

pub fn sample_record() -> MetadataRecord {
    let mut record = record(&[
        ("SourceFile", "/photos/IMG_0001.jpg"),
        ("File:FileName", "IMG_0001.jpg"),
        ("EXIF:Make", "Canon"),
        ("EXIF:Model", "EOS R5"),
        ("EXIF:DateTimeOriginal", "2023:06:15 14:30:00"),
        ("EXIF:CreateDate", "2023:06:15 14:30:00"),
        ("XMP:Subject", "holiday"),
    ]);
    record.insert(String::from("EXIF:ISO"), TagValue::from(400));
    record
}
