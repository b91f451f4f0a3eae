use std::path::PathBuf;

pub fn known_tool_locations() -> Vec<PathBuf> {
    let mut locations = vec![
        PathBuf::from(r"C:\Windows\exiftool.exe"),
        PathBuf::from(r"C:\Program Files\ExifTool\exiftool.exe"),
    ];

    if let Some(local) = std::env::var_os("LOCALAPPDATA") {
        locations.push(
            PathBuf::from(local)
                .join("Programs")
                .join("ExifTool")
                .join("exiftool.exe"),
        );
    }

    locations
}
