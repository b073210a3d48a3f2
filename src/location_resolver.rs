//! Location Resolution Module
//!
//! This module turns the location phrase of a turn into a `ResolvedLocation`.
//! Typed coordinates ("46.8182, 8.2275") are taken as they are; anything else
//! goes through the geocoder.

use tracing::debug;

use crate::Result;
use crate::error::ForecastChatError;
use crate::models::ResolvedLocation;
use crate::weather::GeocodeClient;

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Location name (city, region, etc.)
    Name(String),
}

impl LocationInput {
    /// Classify a location phrase
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match Self::parse_coordinates(input) {
            Some((lat, lon)) => Self::Coordinates(lat, lon),
            None => Self::Name(input.to_string()),
        }
    }

    /// Parse coordinates from string like "46.8182,8.2275" or "46.8182 8.2275"
    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };
        let lat = lat.parse::<f64>().ok()?;
        let lon = lon.parse::<f64>().ok()?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        Some((lat, lon))
    }
}

/// Service for resolving location phrases
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a location phrase into a structured location
    pub async fn resolve(geocoder: &dyn GeocodeClient, text: &str) -> Result<ResolvedLocation> {
        let input = LocationInput::parse(text);
        debug!("Resolving location input: {:?}", input);

        let location = match input {
            LocationInput::Coordinates(lat, lon) => {
                ResolvedLocation::new(format!("{lat:.4}, {lon:.4}"), lat, lon)
            }
            LocationInput::Name(name) => Self::resolve_name(geocoder, &name).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }

    async fn resolve_name(geocoder: &dyn GeocodeClient, name: &str) -> Result<ResolvedLocation> {
        debug!("Geocoding location name: {}", name);

        geocoder
            .lookup(name)
            .await?
            .ok_or_else(|| ForecastChatError::location_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SingleCity {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeClient for SingleCity {
        async fn lookup(&self, name: &str) -> Result<Option<ResolvedLocation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((name == "Interlaken")
                .then(|| ResolvedLocation::new("Interlaken", 46.6863, 7.8632).with_country("Switzerland")))
        }
    }

    fn geocoder() -> SingleCity {
        SingleCity {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_location_input_coordinates() {
        assert_eq!(
            LocationInput::parse("46.8182,8.2275"),
            LocationInput::Coordinates(46.8182, 8.2275)
        );
        assert_eq!(
            LocationInput::parse("46.8182 8.2275"),
            LocationInput::Coordinates(46.8182, 8.2275)
        );
        assert_eq!(
            LocationInput::parse("-46.8182, -8.2275"),
            LocationInput::Coordinates(-46.8182, -8.2275)
        );
    }

    #[test]
    fn test_location_input_invalid_coordinates_are_names() {
        assert!(matches!(LocationInput::parse("91.0,8.0"), LocationInput::Name(_)));
        assert!(matches!(LocationInput::parse("46.0,181.0"), LocationInput::Name(_)));
        assert!(matches!(LocationInput::parse("46.0"), LocationInput::Name(_)));
        assert!(matches!(LocationInput::parse("46.0,8.0,0.0"), LocationInput::Name(_)));
    }

    #[test]
    fn test_location_input_names() {
        assert_eq!(
            LocationInput::parse(" New York City "),
            LocationInput::Name("New York City".to_string())
        );
        assert!(matches!(
            LocationInput::parse("Chamonix-Mont-Blanc"),
            LocationInput::Name(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_coordinates_bypasses_geocoder() {
        let geocoder = geocoder();
        let location = LocationResolver::resolve(&geocoder, "46.8182, 8.2275").await.unwrap();

        assert_eq!(location.name, "46.8182, 8.2275");
        assert_eq!(location.latitude, 46.8182);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_name_via_geocoder() {
        let geocoder = geocoder();
        let location = LocationResolver::resolve(&geocoder, "Interlaken").await.unwrap();

        assert_eq!(location.to_string(), "Interlaken, Switzerland");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_name_is_location_not_found() {
        let err = LocationResolver::resolve(&geocoder(), "Qzxlflorp").await.unwrap_err();
        assert!(matches!(
            err,
            ForecastChatError::LocationNotFound { ref name } if name == "Qzxlflorp"
        ));
    }
}
