//! Geocoding and forecast collaborators
//!
//! The query pipeline only sees these traits; `open_meteo` is the production
//! implementation of both.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;
use crate::models::{ForecastDay, ResolvedLocation};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Place name to coordinates lookup
#[async_trait]
pub trait GeocodeClient: Send + Sync {
    /// Best match for `name`, `Ok(None)` when the provider knows no such place.
    ///
    /// Transport failures are `ForecastUnavailable`, never `Ok(None)`.
    async fn lookup(&self, name: &str) -> Result<Option<ResolvedLocation>>;
}

/// Daily forecast series for a location
#[async_trait]
pub trait ForecastClient: Send + Sync {
    /// Daily entries for offsets `0..=MAX_OFFSET` counted from `today`,
    /// in ascending order. Days the provider did not return are absent.
    async fn fetch(&self, location: &ResolvedLocation, today: NaiveDate)
    -> Result<Vec<ForecastDay>>;
}
