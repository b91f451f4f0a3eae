use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::Template;

/// Signed calendar/clock offset applied to every date tag of a file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShiftDelta {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
}

impl ShiftDelta {
    pub fn new(years: i32, months: i32, days: i32, hours: i32, minutes: i32) -> Self {
        Self {
            years,
            months,
            days,
            hours,
            minutes,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BatchOperation {
    StripAll,
    ApplyTemplate(Template),
    ShiftDates(ShiftDelta),
}

impl BatchOperation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StripAll => "Remove all metadata",
            Self::ApplyTemplate(_) => "Apply template",
            Self::ShiftDates(_) => "Shift date/time",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    PartiallyFailed,
}

impl BatchState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::PartiallyFailed)
    }
}

/// Emitted before a file is handed to the tool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgressEvent {
    pub index: usize,
    pub total: usize,
    pub path: PathBuf,
}

impl ProgressEvent {
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationResult {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(path: PathBuf) -> Self {
        Self {
            path,
            success: true,
            error: None,
        }
    }

    pub fn failure(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchReport {
    pub state: BatchState,
    pub results: Vec<OperationResult>,
}

impl BatchReport {
    pub fn from_results(results: Vec<OperationResult>) -> Self {
        let state = if results.iter().all(|result| result.success) {
            BatchState::Completed
        } else {
            BatchState::PartiallyFailed
        };

        Self { state, results }
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.success).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted().saturating_sub(self.succeeded())
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(|result| !result.success)
    }
}
