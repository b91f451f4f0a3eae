use std::fs;
use std::path::{Path, PathBuf};

use exiftool_desk::config::AppConfig;
use exiftool_desk::core::formats::{detect_category, is_supported, MediaCategory};
use exiftool_desk::platform::Platform;

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig::load(Some(dir.path().join("absent.toml").as_path())).expect("defaults");
    assert_eq!(config, AppConfig::default());
    assert!(config.tool.executable.is_none());
}

#[test]
fn config_round_trips_through_toml() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("conf").join("config.toml");

    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(
        &path,
        "[tool]\nexecutable = \"/opt/exiftool/exiftool\"\n\n[templates]\npath = \"/tmp/t.json\"\n",
    )
    .expect("write config");

    let config = AppConfig::load(Some(path.as_path())).expect("config should parse");
    assert_eq!(
        config.tool.executable.as_deref(),
        Some(Path::new("/opt/exiftool/exiftool"))
    );
    assert!(config.tool.extra_search_paths.is_empty());
    assert_eq!(config.templates.store_path(), PathBuf::from("/tmp/t.json"));

    let copy = dir.path().join("copy.toml");
    config.save(&copy).expect("save should succeed");
    assert_eq!(AppConfig::load(Some(copy.as_path())).expect("reload"), config);

    fs::write(&path, "[tool\nexecutable = 3").expect("write broken config");
    assert!(AppConfig::load(Some(path.as_path())).is_err());
}

#[test]
fn categories_follow_file_extensions() {
    assert_eq!(detect_category(Path::new("a/IMG.JPG")), MediaCategory::Image);
    assert_eq!(detect_category(Path::new("raw.cr3")), MediaCategory::Image);
    assert_eq!(detect_category(Path::new("clip.mov")), MediaCategory::Video);
    assert_eq!(detect_category(Path::new("song.flac")), MediaCategory::Audio);
    assert_eq!(detect_category(Path::new("paper.pdf")), MediaCategory::Document);
    assert_eq!(detect_category(Path::new("bundle.7z")), MediaCategory::Archive);
    assert_eq!(detect_category(Path::new("README")), MediaCategory::Other);
    assert_eq!(MediaCategory::Audio.as_str(), "Audio");
    assert!(!is_supported(Path::new("notes.xyz")));
}

#[test]
fn platforms_know_their_executable_and_install_paths() {
    assert_eq!(Platform::Windows.tool_executable_name(), "exiftool.exe");
    assert_eq!(Platform::MacOS.tool_executable_name(), "exiftool");
    assert!(Platform::MacOS
        .known_tool_locations()
        .contains(&PathBuf::from("/opt/homebrew/bin/exiftool")));
    assert!(Platform::Windows
        .known_tool_locations()
        .iter()
        .all(|path| path.to_string_lossy().ends_with("exiftool.exe")));
    assert_eq!(
        Platform::Other.known_tool_locations(),
        vec![
            PathBuf::from("/usr/local/bin/exiftool"),
            PathBuf::from("/opt/homebrew/bin/exiftool"),
            PathBuf::from("/usr/bin/exiftool")
        ]
    );
}
