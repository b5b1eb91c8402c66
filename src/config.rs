//! Startup settings: a plain `Key value` rc file plus the fatal checks
//! that must pass before any file is touched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed line {line} in {path}: expected `Key value`")]
    Malformed { path: PathBuf, line: usize },
    #[error("invalid value for {key}: {value:?} (expected yes or no)")]
    InvalidFlag { key: String, value: String },
    #[error("source directory {path} does not exist")]
    MissingSource { path: PathBuf },
    #[error("destination root {path} is not mounted")]
    NotMounted { path: PathBuf },
    #[error("cannot inspect {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub camera_maker: Option<String>,
    pub camera_model: Option<String>,
    pub root: PathBuf,
    pub image_path: String,
    pub video_path: String,
    pub source_path: Option<PathBuf>,
    pub check_if_mounted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_maker: None,
            camera_model: None,
            root: home_dir(),
            image_path: "Pictures".to_string(),
            video_path: "Videos".to_string(),
            source_path: None,
            check_if_mounted: false,
        }
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(value),
    }
}

impl Settings {
    pub fn default_config_path() -> PathBuf {
        home_dir().join(".mediaimporterrc")
    }

    /// A missing file means defaults, unless the user pointed at the path
    /// explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Unreadable { path: path.to_path_buf(), source });
            }
        };
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for (number, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                return Err(ConfigError::Malformed {
                    path: path.to_path_buf(),
                    line: number + 1,
                });
            };
            let value = value.trim();
            match key {
                "CameraMaker" => settings.camera_maker = Some(value.to_string()),
                "CameraModel" => settings.camera_model = Some(value.to_string()),
                "Root" => settings.root = expand_tilde(value),
                "ImagePath" => settings.image_path = value.to_string(),
                "VideoPath" => settings.video_path = value.to_string(),
                "SourcePath" => settings.source_path = Some(expand_tilde(value)),
                "CheckIfMounted" => settings.check_if_mounted = parse_flag(key, value)?,
                other => warn!("unknown config key {other:?} in {}", path.display()),
            }
        }
        Ok(settings)
    }

    pub fn image_root(&self) -> PathBuf {
        self.root.join(&self.image_path)
    }

    pub fn video_root(&self) -> PathBuf {
        self.root.join(&self.video_path)
    }

    /// Fatal preconditions, checked before the pipeline starts.
    pub fn ensure_ready(&self, source: &Path) -> Result<(), ConfigError> {
        if !source.is_dir() {
            return Err(ConfigError::MissingSource { path: source.to_path_buf() });
        }
        if self.check_if_mounted && !is_mount_point(&self.root)? {
            return Err(ConfigError::NotMounted { path: self.root.clone() });
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key: key.to_string(), value: value.to_string() }),
    }
}

/// A path is considered mounted when it sits on a different device than
/// its parent.
#[cfg(unix)]
fn is_mount_point(path: &Path) -> Result<bool, ConfigError> {
    use std::os::unix::fs::MetadataExt;

    let inspect_err = |source| ConfigError::Inaccessible { path: path.to_path_buf(), source };
    let resolved = fs::canonicalize(path).map_err(inspect_err)?;
    let Some(parent) = resolved.parent() else {
        // The filesystem root is always a mount point.
        return Ok(true);
    };
    let meta = fs::metadata(&resolved).map_err(inspect_err)?;
    let parent_meta = fs::metadata(parent).map_err(inspect_err)?;
    Ok(meta.dev() != parent_meta.dev())
}

#[cfg(not(unix))]
fn is_mount_point(_path: &Path) -> Result<bool, ConfigError> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_key_value_lines() {
        let contents = "\
# importer settings
CameraMaker Nikon
CameraModel D7000

Root /mnt/library
ImagePath Pictures
VideoPath Videos
SourcePath /media/card
CheckIfMounted yes
";
        let settings = Settings::parse(contents, Path::new("rc")).expect("parse");
        assert_eq!(settings.camera_maker.as_deref(), Some("Nikon"));
        assert_eq!(settings.camera_model.as_deref(), Some("D7000"));
        assert_eq!(settings.root, PathBuf::from("/mnt/library"));
        assert_eq!(settings.source_path, Some(PathBuf::from("/media/card")));
        assert!(settings.check_if_mounted);
        assert_eq!(settings.image_root(), PathBuf::from("/mnt/library/Pictures"));
        assert_eq!(settings.video_root(), PathBuf::from("/mnt/library/Videos"));
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let settings =
            Settings::parse("Root /mnt/library\nFrobnicate yes\n", Path::new("rc")).expect("parse");
        assert_eq!(settings.root, PathBuf::from("/mnt/library"));
    }

    #[test]
    fn value_may_contain_spaces() {
        let settings =
            Settings::parse("CameraMaker HMD Global\n", Path::new("rc")).expect("parse");
        assert_eq!(settings.camera_maker.as_deref(), Some("HMD Global"));
    }

    #[test]
    fn bare_key_is_malformed() {
        let err = Settings::parse("CameraMaker\n", Path::new("rc")).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 1, .. }));
    }

    #[test]
    fn mount_flag_must_be_yes_or_no() {
        let err = Settings::parse("CheckIfMounted maybe\n", Path::new("rc")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));

        let settings = Settings::parse("CheckIfMounted NO\n", Path::new("rc")).expect("parse");
        assert!(!settings.check_if_mounted);
    }

    #[test]
    fn missing_file_yields_defaults_unless_explicit() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("no-such-rc");

        let settings = Settings::load(&path, false).expect("defaults");
        assert_eq!(settings, Settings::default());

        assert!(matches!(
            Settings::load(&path, true),
            Err(ConfigError::Unreadable { .. })
        ));
    }

    #[test]
    fn missing_source_is_fatal() {
        let dir = tempdir().expect("tempdir");
        let settings = Settings { root: dir.path().to_path_buf(), ..Default::default() };
        let err = settings.ensure_ready(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSource { .. }));
    }

    #[test]
    fn unmounted_root_is_fatal_when_check_enabled() {
        let dir = tempdir().expect("tempdir");
        let source = dir.path().join("pool");
        fs::create_dir(&source).expect("pool dir");
        let root = dir.path().join("library");
        fs::create_dir(&root).expect("library dir");

        let relaxed = Settings { root: root.clone(), ..Default::default() };
        relaxed.ensure_ready(&source).expect("no mount check");

        let strict = Settings { root, check_if_mounted: true, ..Default::default() };
        let err = strict.ensure_ready(&source).unwrap_err();
        assert!(matches!(err, ConfigError::NotMounted { .. }));
    }
}
