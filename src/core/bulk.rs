use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::formats;
use crate::core::merge::merge_known_keys;
use crate::core::metadata::{self, MetadataTool};
use crate::models::{
    BatchOperation, BatchReport, BatchState, MetadataModel, OperationResult, ProgressEvent,
};

/// Files picked for one batch run, in insertion order without duplicates.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchFileList {
    files: Vec<PathBuf>,
}

impl BatchFileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends paths not already listed; returns how many were added.
    pub fn add_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let before = self.files.len();

        for candidate in paths {
            let path = candidate.as_ref();
            if !self.files.iter().any(|existing| existing == path) {
                self.files.push(path.to_path_buf());
            }
        }

        self.files.len() - before
    }

    /// Adds the supported media files directly inside `dir`, sorted by name.
    pub fn add_folder(&mut self, dir: &Path) -> io::Result<usize> {
        let mut found = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && formats::is_supported(&path) {
                found.push(path);
            }
        }

        found.sort();
        Ok(self.add_files(found))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn count_label(&self) -> String {
        let count = self.files.len();
        format!("{count} file{}", if count == 1 { "" } else { "s" })
    }
}

/// Applies one operation to many files, strictly one after another.
///
/// A failing file is recorded and logged; the remaining files still run.
pub struct BatchRunner<'a> {
    tool: &'a dyn MetadataTool,
    state: BatchState,
}

impl<'a> BatchRunner<'a> {
    pub fn new(tool: &'a dyn MetadataTool) -> Self {
        Self {
            tool,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn run<F>(
        &mut self,
        files: &[PathBuf],
        operation: &BatchOperation,
        mut progress: F,
    ) -> BatchReport
    where
        F: FnMut(&ProgressEvent),
    {
        self.state = BatchState::Running;
        let total = files.len();
        let mut results = Vec::with_capacity(total);

        info!(total, operation = operation.label(), "batch started");

        for (index, path) in files.iter().enumerate() {
            progress(&ProgressEvent {
                index,
                total,
                path: path.clone(),
            });

            let result = match Self::process_one(self.tool, path, operation) {
                Ok(()) => OperationResult::success(path.clone()),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "batch item failed");
                    OperationResult::failure(path.clone(), err.to_string())
                }
            };
            results.push(result);
        }

        let report = BatchReport::from_results(results);
        self.state = report.state;

        info!(
            attempted = report.attempted(),
            failed = report.failed(),
            "batch finished"
        );
        report
    }

    pub fn process_one(
        tool: &dyn MetadataTool,
        path: &Path,
        operation: &BatchOperation,
    ) -> metadata::Result<()> {
        match operation {
            BatchOperation::StripAll => tool.strip_all_metadata(path),
            BatchOperation::ShiftDates(delta) => {
                if delta.is_zero() {
                    debug!(path = %path.display(), "zero shift, nothing to do");
                    return Ok(());
                }
                tool.shift_all_dates(path, &delta.expression())
            }
            BatchOperation::ApplyTemplate(template) => {
                let mut model = MetadataModel::new(tool.read_metadata(path)?);
                let updated = merge_known_keys(&mut model, template.as_record());
                if updated == 0 {
                    debug!(path = %path.display(), template = %template.name, "no matching tags");
                    return Ok(());
                }
                tool.write_fields(path, &model.modified_fields())
            }
        }
    }
}
