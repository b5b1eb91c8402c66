use std::path::Path;

/// Extension classes the importer cares about. Anything else in the pool
/// is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Raw,
    Jpeg,
    Video,
}

const RAW_EXTENSIONS: &[&str] = &[
    "3fr", "ari", "arw", "bay", "crw", "cr2", "cap", "dcs", "dcr", "dng",
    "drf", "eip", "erf", "fff", "iiq", "k25", "kdc", "mdc", "mef", "mos",
    "mrw", "nef", "nrw", "obm", "orf", "pef", "ptx", "pxn", "r3d", "raf",
    "raw", "rwl", "rw2", "rwz", "sr2", "srf", "srw", "x3f",
];

const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

const VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4", "avi", "mts", "m2ts", "mkv"];

impl MediaKind {
    /// Subdirectory inside an event folder, so RAW, JPEG and movie files
    /// from the same event stay grouped without colliding on name.
    pub fn subdir(self) -> &'static str {
        match self {
            MediaKind::Raw => "raw",
            MediaKind::Jpeg => "jpeg",
            MediaKind::Video => "mov",
        }
    }
}

pub fn classify(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if RAW_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Raw)
    } else if JPEG_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Jpeg)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}
