//! Grouping keys. Two files with the same normalized identity, capture
//! date and (optionally) GPS cell must end up in the same event directory.

use std::fmt;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use tracing::warn;

use crate::identity::IdentityNormalizer;
use crate::metadata::MediaMetadata;

/// GPS coordinates rounded to a ~100 m cell so jitter between shots at one
/// location does not split an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpsCell {
    lat_mdeg: i32,
    lon_mdeg: i32,
}

impl GpsCell {
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat_mdeg: (lat * 1000.0).round() as i32,
            lon_mdeg: (lon * 1000.0).round() as i32,
        }
    }

    pub fn lat(&self) -> f64 {
        f64::from(self.lat_mdeg) / 1000.0
    }

    pub fn lon(&self) -> f64 {
        f64::from(self.lon_mdeg) / 1000.0
    }
}

impl fmt::Display for GpsCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3},{:.3}", self.lat(), self.lon())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub make: String,
    pub model: String,
    pub date: NaiveDate,
    pub gps: Option<GpsCell>,
}

impl GroupKey {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn year_str(&self) -> String {
        format!("{:04}", self.date.year())
    }
}

impl fmt::Display for GroupKey {
    // Fixed order: make, model, date, gps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.make, self.model, self.date_str())?;
        if let Some(cell) = &self.gps {
            write!(f, "/{cell}")?;
        }
        Ok(())
    }
}

/// Identity strings become path segments, so separators are not welcome.
pub fn sanitize_segment(raw: &str) -> String {
    raw.trim().replace(['/', '\\'], "-")
}

pub struct KeyBuilder {
    normalizer: IdentityNormalizer,
    default_make: String,
    default_model: String,
    use_gps: bool,
    filename_date: Regex,
}

impl KeyBuilder {
    pub fn new(
        normalizer: IdentityNormalizer,
        default_make: String,
        default_model: String,
        use_gps: bool,
    ) -> Self {
        let filename_date =
            Regex::new(r"_(\d{4})(\d{2})(\d{2})_").expect("invalid filename date pattern");
        Self { normalizer, default_make, default_model, use_gps, filename_date }
    }

    pub fn build(&self, source: &Path, meta: &MediaMetadata) -> GroupKey {
        let make = meta
            .make()
            .map(|raw| self.normalizer.normalize_make(raw))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_make.clone());
        let model = meta
            .model()
            .map(|raw| self.normalizer.normalize_model(raw))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_model.clone());
        let date = self.derive_date(source, meta);
        let gps = if self.use_gps {
            meta.gps().map(|(lat, lon)| GpsCell::from_degrees(lat, lon))
        } else {
            None
        };
        GroupKey {
            make: sanitize_segment(&make),
            model: sanitize_segment(&model),
            date,
            gps,
        }
    }

    /// Capture date, in order of preference: primary tag, fallback tag, a
    /// `_YYYYMMDD_` token in the filename, today.
    fn derive_date(&self, source: &Path, meta: &MediaMetadata) -> NaiveDate {
        if let Some(raw) = meta.date_primary()
            && let Some(date) = parse_capture_date(raw)
        {
            return date;
        }
        if let Some(raw) = meta.date_fallback()
            && let Some(date) = parse_capture_date(raw)
        {
            return date;
        }
        if let Some(name) = source.file_name().and_then(|n| n.to_str())
            && let Some(date) = self.date_from_filename(name)
        {
            return date;
        }
        warn!("no capture date for {}, using today's date", source.display());
        Utc::now().date_naive()
    }

    fn date_from_filename(&self, name: &str) -> Option<NaiveDate> {
        let caps = self.filename_date.captures(name)?;
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if year < 1990 {
            return None;
        }
        // from_ymd_opt rejects month/day outside the calendar.
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Exif timestamps look like `2021:06:04 19:23:11`; only the date part
/// matters here. Separator variants are normalized before parsing.
fn parse_capture_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(&prefix.replace(':', "-"), "%Y-%m-%d").ok()
}
