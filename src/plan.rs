use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::media::MediaKind;

/// Destination for one file inside a resolved event directory. Only called
/// for resolved events; ignored keys never reach planning.
pub fn plan_path(event_dir: &Path, kind: MediaKind, file_name: &OsStr) -> PathBuf {
    event_dir.join(kind.subdir()).join(file_name)
}
