//! Reverse geocoding against Nominatim. Strictly best-effort: any network,
//! HTTP or decoding problem degrades to "no location name".

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Place {
    /// Most specific populated field, smallest first.
    pub fn display_name(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
            .or(self.county.as_deref())
            .or(self.state.as_deref())
            .or(self.country.as_deref())
    }
}

pub trait GeoLookup {
    fn lookup(&self, lat: f64, lon: f64) -> Option<Place>;
}

/// Used when GPS naming is disabled.
pub struct NoGeoLookup;

impl GeoLookup for NoGeoLookup {
    fn lookup(&self, _lat: f64, _lon: f64) -> Option<Place> {
        None
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Place>,
}

pub struct NominatimLookup {
    agent: ureq::Agent,
    endpoint: String,
}

impl NominatimLookup {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(7))
            .build();
        Self {
            agent,
            endpoint: "https://nominatim.openstreetmap.org/reverse".to_string(),
        }
    }
}

impl Default for NominatimLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoLookup for NominatimLookup {
    fn lookup(&self, lat: f64, lon: f64) -> Option<Place> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("format", "jsonv2")
            .query("lat", &lat.to_string())
            .query("lon", &lon.to_string())
            .set("User-Agent", concat!("media_importer/", env!("CARGO_PKG_VERSION")))
            .call();
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!("reverse geocoding failed for {lat:.3},{lon:.3}: {err}");
                return None;
            }
        };
        match response.into_json::<ReverseResponse>() {
            Ok(decoded) => decoded.address,
            Err(err) => {
                warn!("unparseable reverse geocoding response for {lat:.3},{lon:.3}: {err}");
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_most_specific_field() {
        let place = Place {
            town: Some("Mölndal".to_string()),
            state: Some("Västra Götaland".to_string()),
            country: Some("Sweden".to_string()),
            ..Default::default()
        };
        assert_eq!(place.display_name(), Some("Mölndal"));

        let place = Place { country: Some("Sweden".to_string()), ..Default::default() };
        assert_eq!(place.display_name(), Some("Sweden"));
    }

    #[test]
    fn empty_address_has_no_display_name() {
        assert_eq!(Place::default().display_name(), None);
    }

    #[test]
    fn reverse_response_tolerates_missing_address() {
        let decoded: ReverseResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).expect("error body");
        assert!(decoded.address.is_none());
    }
}
