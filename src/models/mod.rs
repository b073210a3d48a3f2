//! Data models for the forecast conversation
//!
//! - Location: resolved place with coordinates
//! - Forecast: daily forecast entries and the per-turn resolved query
//! - Intent: location/day phrases extracted from an utterance

pub mod forecast;
pub mod intent;
pub mod location;

// Re-export all public types for convenient access
pub use forecast::{ForecastDay, ResolvedQuery};
pub use intent::ParsedIntent;
pub use location::ResolvedLocation;
