//! Daily forecast model and the per-turn resolved query

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::ResolvedLocation;

/// Aggregated forecast for one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    /// Days from today (0 = today)
    pub offset: u8,
    /// Calendar date of this entry
    pub date: NaiveDate,
    /// Maximum temperature in Celsius
    pub temperature_high: f64,
    /// Maximum precipitation probability (0-100%)
    pub precipitation_probability: f64,
    /// Precipitation sum in mm
    pub precipitation_sum: f64,
    /// Hours with precipitation
    pub precipitation_hours: f64,
    /// Maximum wind speed in km/h
    pub wind_speed: f64,
    /// Maximum wind gust in km/h
    pub wind_gust: f64,
}

impl ForecastDay {
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// English weekday name, e.g. "Tuesday"
    #[must_use]
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.0}°C", self.temperature_high)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!(
            "{:.0} km/h (gusts {:.0} km/h)",
            self.wind_speed, self.wind_gust
        )
    }

    #[must_use]
    pub fn format_precipitation(&self) -> String {
        if self.precipitation_sum > 0.0 {
            format!(
                "{:.0}% chance of rain ({:.0} mm over {:.0} h)",
                self.precipitation_probability, self.precipitation_sum, self.precipitation_hours
            )
        } else {
            format!("{:.0}% chance of rain", self.precipitation_probability)
        }
    }
}

/// A validated (location, days) answer for one turn
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub location: ResolvedLocation,
    /// Requested days in ascending offset order
    pub days: Vec<ForecastDay>,
}

impl ResolvedQuery {
    #[must_use]
    pub fn offsets(&self) -> Vec<u8> {
        self.days.iter().map(|day| day.offset).collect()
    }
}
