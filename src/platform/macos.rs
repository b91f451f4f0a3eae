use std::path::PathBuf;

pub fn known_tool_locations() -> Vec<PathBuf> {
    [
        "/usr/local/bin/exiftool",
        "/opt/homebrew/bin/exiftool",
        "/usr/bin/exiftool",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}
