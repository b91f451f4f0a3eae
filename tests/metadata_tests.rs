use std::ffi::OsString;
use std::fs;
use std::path::Path;

use exiftool_desk::core::metadata::{
    encode_for_write, locate_executable, parse_read_output, read_args, shift_args, strip_args,
    write_args, MetadataError,
};
use exiftool_desk::models::{MetadataRecord, TagValue};
use exiftool_desk::platform::Platform;

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect()
}

#[test]
fn argument_lists_match_exiftool_conventions() {
    let path = Path::new("/photos/a b.jpg");

    assert_eq!(strings(&read_args(path)), vec!["-j", "-G", "-s", "/photos/a b.jpg"]);
    assert_eq!(
        strings(&strip_args(path)),
        vec!["-all=", "-overwrite_original", "/photos/a b.jpg"]
    );
    assert_eq!(
        strings(&shift_args(path, "+2:-05:0")),
        vec!["-overwrite_original", "-AllDates+=+2:-05:0", "/photos/a b.jpg"]
    );

    let mut fields = MetadataRecord::new();
    fields.insert(String::from("EXIF:Artist"), TagValue::text("Jane \"JD\" Doe"));
    fields.insert(String::from("EXIF:ISO"), TagValue::from(200));
    assert_eq!(
        strings(&write_args(path, &fields)),
        vec![
            "-overwrite_original",
            "-EXIF:Artist=Jane \\\"JD\\\" Doe",
            "-EXIF:ISO=200",
            "/photos/a b.jpg",
        ]
    );

    fields.insert(
        String::from("XMP:Subject"),
        TagValue::Sequence(vec![TagValue::text("sea"), TagValue::text("sky")]),
    );
    let args = strings(&write_args(path, &fields));
    assert_eq!(&args[..3], &["-overwrite_original", "-sep", "\u{1f}"]);
    assert!(args.contains(&String::from("-XMP:Subject=sea\u{1f}sky")));
}

#[test]
fn commas_survive_list_writes() {
    let path = Path::new("/photos/a.jpg");

    let mut fields = MetadataRecord::new();
    fields.insert(String::from("XMP:Creator"), TagValue::text("Smith, John"));
    fields.insert(
        String::from("XMP:Subject"),
        TagValue::Sequence(vec![TagValue::text("Doe, Jane"), TagValue::text("sky")]),
    );

    let args = strings(&write_args(path, &fields));
    assert_eq!(
        args,
        vec![
            "-overwrite_original",
            "-sep",
            "\u{1f}",
            "-XMP:Creator=Smith, John",
            "-XMP:Subject=Doe, Jane\u{1f}sky",
            "/photos/a.jpg",
        ]
    );

    let separator = &args[2];
    assert!(!args[3].contains(separator.as_str()));
    let subject = args[4].trim_start_matches("-XMP:Subject=");
    assert_eq!(subject.split(separator.as_str()).collect::<Vec<_>>(), vec!["Doe, Jane", "sky"]);
}

#[test]
fn encodes_structured_values_as_json() {
    let mut map = std::collections::BTreeMap::new();
    map.insert(String::from("x"), TagValue::from(1));
    assert_eq!(encode_for_write(&TagValue::Mapping(map)), r#"{"x":1}"#);
    assert_eq!(encode_for_write(&TagValue::text("")), "");
}

#[test]
fn read_output_takes_the_first_object() {
    let record = parse_read_output(
        br#"[{"SourceFile":"a.jpg","EXIF:Make":"Canon","EXIF:ISO":100,"EXIF:Flash":false}]"#,
    )
    .expect("valid output");
    assert_eq!(record.len(), 4);
    assert_eq!(record["EXIF:Flash"], TagValue::text("False"));

    assert!(matches!(
        parse_read_output(b"Error: File not found"),
        Err(MetadataError::MalformedOutput(_))
    ));
    assert!(matches!(
        parse_read_output(b"[]"),
        Err(MetadataError::MalformedOutput(_))
    ));
    assert!(matches!(
        parse_read_output(br#"{"a":1}"#),
        Err(MetadataError::MalformedOutput(_))
    ));
}

#[test]
fn locate_prefers_explicit_then_search_path_then_fallbacks() {
    let dir = tempfile::tempdir().expect("temp dir");
    let explicit = dir.path().join("custom-exiftool");
    fs::write(&explicit, b"").expect("write explicit");

    let found = locate_executable(Some(explicit.as_path()), None, &[], Platform::Other)
        .expect("explicit path exists");
    assert_eq!(found, explicit);

    let fallback = dir.path().join("fallback-exiftool");
    fs::write(&fallback, b"").expect("write fallback");
    let missing = dir.path().join("nope");
    let found = locate_executable(
        Some(missing.as_path()),
        Some(OsString::new()),
        &[dir.path().join("also-missing"), fallback.clone()],
        Platform::Other,
    )
    .expect("fallback exists");
    assert_eq!(found, fallback);

    let err = locate_executable(None, None, &[missing.clone()], Platform::Other)
        .expect_err("nothing exists");
    match err {
        MetadataError::ToolNotFound { searched } => assert_eq!(searched, vec![missing]),
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
mod script {
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use exiftool_desk::core::metadata::{ExifTool, MetadataTool};

    use super::*;

    /// Shell stand-in for exiftool: logs its arguments, answers `-j` reads,
    /// prints bytes for `-Picture` and fails on paths containing `broken`.
    fn fake_exiftool(dir: &Path) -> PathBuf {
        let script = dir.join("exiftool");
        let log = dir.join("args.txt");
        let body = format!(
            r#"#!/bin/sh
for last; do :; done
printf '%s\n' "$@" >> "{log}"
echo '--' >> "{log}"
case "$last" in
  *broken*) echo "Error: File not found - $last" >&2; exit 1 ;;
esac
case "$1" in
  -j) printf '[{{"SourceFile":"%s","EXIF:Make":"Canon","EXIF:ISO":100}}]' "$last" ;;
  -Picture) printf 'PICTURE' ;;
esac
exit 0
"#,
            log = log.display()
        );
        fs::write(&script, body).expect("write script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod script");
        script
    }

    fn logged_calls(dir: &Path) -> Vec<Vec<String>> {
        let text = fs::read_to_string(dir.join("args.txt")).unwrap_or_default();
        text.split("--\n")
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| chunk.lines().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn exiftool_runs_the_expected_commands() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tool = ExifTool::new(fake_exiftool(dir.path()));
        let photo = dir.path().join("photo.jpg");
        let photo_arg = photo.display().to_string();

        let record = tool.read_metadata(&photo).expect("read should succeed");
        assert_eq!(record["EXIF:Make"], TagValue::text("Canon"));
        assert_eq!(record["SourceFile"], TagValue::text(photo_arg.as_str()));

        let mut fields = MetadataRecord::new();
        fields.insert(String::from("EXIF:Artist"), TagValue::text("Jane"));
        tool.write_fields(&photo, &fields).expect("write should succeed");
        tool.write_fields(&photo, &MetadataRecord::new())
            .expect("empty write is a no-op");
        tool.strip_all_metadata(&photo).expect("strip should succeed");
        tool.shift_all_dates(&photo, "0:0:+1").expect("shift should succeed");

        let song = dir.path().join("song.mp3");
        assert_eq!(tool.extract_embedded_picture(&song), Some(b"PICTURE".to_vec()));

        assert_eq!(
            logged_calls(dir.path()),
            vec![
                strings(&read_args(&photo)),
                vec![
                    String::from("-overwrite_original"),
                    String::from("-EXIF:Artist=Jane"),
                    photo_arg.clone(),
                ],
                strings(&strip_args(&photo)),
                strings(&shift_args(&photo, "0:0:+1")),
                vec![String::from("-Picture"), String::from("-b"), song.display().to_string()],
            ]
        );

        let broken = dir.path().join("broken.jpg");
        match tool.read_metadata(&broken) {
            Err(MetadataError::ExternalTool { stderr, .. }) => {
                assert!(stderr.starts_with("Error: File not found"));
                assert!(!stderr.ends_with('\n'));
            }
            other => panic!("expected tool failure, got {other:?}"),
        }
        assert!(tool.extract_embedded_picture(&broken).is_none());

        let missing = ExifTool::new(dir.path().join("no-such-binary"));
        let err = missing.strip_all_metadata(&photo).expect_err("spawn should fail");
        assert!(matches!(err, MetadataError::Spawn { .. }));
        assert!(err.is_external_tool_error());
    }
}
