//! Resolved location model

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A place the forecast can be fetched for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Place name as returned by the geocoder
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// First-level administrative region (state, canton, ...)
    pub region: Option<String>,
    /// Country name
    pub country: Option<String>,
}

impl ResolvedLocation {
    /// Create a new location
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            region: None,
            country: None,
        }
    }

    /// Create location with country
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl Display for ResolvedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.country {
            Some(country) if country != &self.name => write!(f, "{}, {}", self.name, country),
            _ => write!(f, "{}", self.name),
        }
    }
}
