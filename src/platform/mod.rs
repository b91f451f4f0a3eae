use std::path::PathBuf;

pub mod macos;
pub mod windows;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    MacOS,
    Windows,
    Other,
}

pub fn current_platform() -> Platform {
    if cfg!(target_os = "macos") {
        Platform::MacOS
    } else if cfg!(target_os = "windows") {
        Platform::Windows
    } else {
        Platform::Other
    }
}

impl Platform {
    pub fn tool_executable_name(self) -> &'static str {
        match self {
            Self::Windows => "exiftool.exe",
            Self::MacOS | Self::Other => "exiftool",
        }
    }

    /// Install locations checked when the tool is not on the search path.
    pub fn known_tool_locations(self) -> Vec<PathBuf> {
        match self {
            Self::MacOS => macos::known_tool_locations(),
            Self::Windows => windows::known_tool_locations(),
            Self::Other => [
                "/usr/local/bin/exiftool",
                "/opt/homebrew/bin/exiftool",
                "/usr/bin/exiftool",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}
