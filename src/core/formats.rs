use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif",
];

pub const RAW_EXTENSIONS: &[&str] = &[
    "raw", "cr2", "cr3", "nef", "arw", "dng", "orf", "rw2", "raf", "srw",
];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "m4v", "mpg", "mpeg",
];

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "aiff", "ape",
];

pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods",
];

pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"];

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl MediaCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "Images",
            Self::Video => "Videos",
            Self::Audio => "Audio",
            Self::Document => "Documents",
            Self::Archive => "Archives",
            Self::Other => "Other",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Other
    }
}

pub fn detect_category(path: &Path) -> MediaCategory {
    let Some(ext) = path.extension().and_then(|value| value.to_str()) else {
        return MediaCategory::Other;
    };

    let ext = ext.to_ascii_lowercase();
    let ext = ext.as_str();

    if IMAGE_EXTENSIONS.contains(&ext) || RAW_EXTENSIONS.contains(&ext) {
        MediaCategory::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        MediaCategory::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        MediaCategory::Audio
    } else if DOCUMENT_EXTENSIONS.contains(&ext) {
        MediaCategory::Document
    } else if ARCHIVE_EXTENSIONS.contains(&ext) {
        MediaCategory::Archive
    } else {
        MediaCategory::Other
    }
}

pub fn is_supported(path: &Path) -> bool {
    detect_category(path).is_known()
}
