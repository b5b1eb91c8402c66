//! Thin adapter around exiftool. The importer never parses media files
//! itself; it shells out once per file and reads the JSON back.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;

use crate::media::MediaKind;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to run exiftool on {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unparseable exiftool output for {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw fields as exiftool reports them (`-j -n`). Absent tags deserialize
/// to `None` rather than failing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MetadataFields {
    pub make: Option<String>,
    pub model: Option<String>,
    pub date_time_original: Option<String>,
    pub create_date: Option<String>,
    pub media_create_date: Option<String>,
    #[serde(rename = "GPSLatitude")]
    pub gps_latitude: Option<f64>,
    #[serde(rename = "GPSLongitude")]
    pub gps_longitude: Option<f64>,
}

/// One capability surface, two variants. Images and videos store their
/// capture timestamp under different tags, so each variant has its own
/// primary field; everything else is shared.
#[derive(Debug, Clone)]
pub enum MediaMetadata {
    Image(MetadataFields),
    Video(MetadataFields),
}

impl MediaMetadata {
    pub fn for_kind(kind: MediaKind, fields: MetadataFields) -> Self {
        match kind {
            MediaKind::Video => MediaMetadata::Video(fields),
            MediaKind::Raw | MediaKind::Jpeg => MediaMetadata::Image(fields),
        }
    }

    pub fn empty(kind: MediaKind) -> Self {
        Self::for_kind(kind, MetadataFields::default())
    }

    fn fields(&self) -> &MetadataFields {
        match self {
            MediaMetadata::Image(fields) | MediaMetadata::Video(fields) => fields,
        }
    }

    pub fn make(&self) -> Option<&str> {
        self.fields().make.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.fields().model.as_deref()
    }

    /// Preferred capture timestamp for this variant.
    pub fn date_primary(&self) -> Option<&str> {
        match self {
            MediaMetadata::Image(fields) => fields.date_time_original.as_deref(),
            MediaMetadata::Video(fields) => fields.media_create_date.as_deref(),
        }
    }

    /// Secondary timestamp, consulted when the primary tag is missing.
    pub fn date_fallback(&self) -> Option<&str> {
        self.fields().create_date.as_deref()
    }

    pub fn gps(&self) -> Option<(f64, f64)> {
        let fields = self.fields();
        match (fields.gps_latitude, fields.gps_longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

pub trait MetadataAdapter {
    fn read(&self, path: &Path, kind: MediaKind) -> Result<MediaMetadata, MetadataError>;
}

/// Production adapter: `exiftool -j -n <file>`. `-n` keeps GPS coordinates
/// as signed decimals instead of degree/minute strings.
pub struct ExiftoolAdapter;

impl MetadataAdapter for ExiftoolAdapter {
    fn read(&self, path: &Path, kind: MediaKind) -> Result<MediaMetadata, MetadataError> {
        let output = Command::new("exiftool")
            .arg("-j")
            .arg("-n")
            .arg(path)
            .output()
            .map_err(|source| MetadataError::Spawn { path: path.to_path_buf(), source })?;
        let records: Vec<MetadataFields> = serde_json::from_slice(&output.stdout)
            .map_err(|source| MetadataError::Parse { path: path.to_path_buf(), source })?;
        let fields = records.into_iter().next().unwrap_or_default();
        Ok(MediaMetadata::for_kind(kind, fields))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn fields_with_dates() -> MetadataFields {
        MetadataFields {
            date_time_original: Some("2021:06:04 19:23:11".to_string()),
            create_date: Some("2021:06:05 08:00:00".to_string()),
            media_create_date: Some("2021:06:06 10:30:00".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn image_variant_prefers_date_time_original() {
        let meta = MediaMetadata::for_kind(MediaKind::Jpeg, fields_with_dates());
        assert_eq!(meta.date_primary(), Some("2021:06:04 19:23:11"));
        assert_eq!(meta.date_fallback(), Some("2021:06:05 08:00:00"));
    }

    #[test]
    fn video_variant_prefers_media_create_date() {
        let meta = MediaMetadata::for_kind(MediaKind::Video, fields_with_dates());
        assert_eq!(meta.date_primary(), Some("2021:06:06 10:30:00"));
        assert_eq!(meta.date_fallback(), Some("2021:06:05 08:00:00"));
    }

    #[test]
    fn gps_requires_both_coordinates() {
        let mut fields = MetadataFields::default();
        fields.gps_latitude = Some(57.7);
        let meta = MediaMetadata::for_kind(MediaKind::Jpeg, fields.clone());
        assert_eq!(meta.gps(), None);

        fields.gps_longitude = Some(11.9);
        let meta = MediaMetadata::for_kind(MediaKind::Jpeg, fields);
        assert_eq!(meta.gps(), Some((57.7, 11.9)));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let fields: MetadataFields = serde_json::from_str("{}").expect("empty object");
        assert!(fields.make.is_none());
        assert!(fields.date_time_original.is_none());
        assert!(fields.gps_latitude.is_none());
    }

    #[test]
    fn exiftool_style_record_deserializes() {
        let json = r#"[{
            "SourceFile": "DSC_0001.NEF",
            "Make": "NIKON CORPORATION",
            "Model": "NIKON D7000",
            "DateTimeOriginal": "2021:06:04 19:23:11",
            "GPSLatitude": 57.70887,
            "GPSLongitude": 11.97456
        }]"#;
        let records: Vec<MetadataFields> = serde_json::from_str(json).expect("record list");
        let fields = records.into_iter().next().expect("one record");
        assert_eq!(fields.make.as_deref(), Some("NIKON CORPORATION"));
        assert_eq!(fields.gps_latitude, Some(57.70887));
    }
}
