//! Prompt templates for the language model
//!
//! Plain `format!()` interpolation; the model output contracts are enforced by
//! the callers, not by the wording here.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ForecastDay;

const METEOROLOGIST: &str = "You are a meteorologist telling people about the weather forecast for the next seven days. Please use normal/simple language, like 'rain' instead of 'precipitation'.";

/// "Today is Monday, 2026-10-19."
#[must_use]
pub fn today_sentence(today: NaiveDate) -> String {
    format!("Today is {}.", today.format("%A, %Y-%m-%d"))
}

/// System prompt for turning one utterance into a location/day pair
#[must_use]
pub fn extraction_system_prompt(today: NaiveDate) -> String {
    format!(
        r#"You extract weather questions into structured data. {today}

Identify the place the user asks about and the day or days they mean.
Return a JSON object with exactly two fields:
- "location": the place name as written by the user, or null if the message names no place
  (words like "there" or "the same place" are not places).
- "date_expression": the day phrase as written by the user (for example "tomorrow",
  "friday", "this weekend", "21.10."), or null if no day is mentioned.

Do not resolve dates yourself and do not guess a place that was not mentioned in the
current message. Respond with valid JSON only, for example:
{{"location": "Paris", "date_expression": "friday"}}"#,
        today = today_sentence(today)
    )
}

/// User turn as sent to the extractor, prefixed with the last location when known
#[must_use]
pub fn extraction_user_prompt(utterance: &str, previous_location: Option<&str>) -> String {
    match previous_location {
        Some(place) => format!("Previously, I asked about {place}. {utterance}"),
        None => utterance.to_string(),
    }
}

/// System prompt for phrasing a forecast answer
#[must_use]
pub fn rendering_system_prompt(today: NaiveDate) -> String {
    format!(
        "{METEOROLOGIST} {} Answer only about the days listed in the forecast data, using their weekday names.",
        today_sentence(today)
    )
}

#[derive(Serialize)]
struct DayRecord {
    date: String,
    day_of_week: String,
    temperature_2m_max: f64,
    precipitation_sum: f64,
    precipitation_hours: f64,
    precipitation_probability_max: f64,
    wind_speed_10m_max: f64,
    wind_gusts_10m_max: f64,
}

/// Forecast days as JSON records, one object per day
pub fn forecast_records(days: &[ForecastDay]) -> serde_json::Result<String> {
    let records: Vec<DayRecord> = days
        .iter()
        .map(|day| DayRecord {
            date: day.date.format("%Y-%m-%d").to_string(),
            day_of_week: day.weekday_name(),
            temperature_2m_max: day.temperature_high,
            precipitation_sum: day.precipitation_sum,
            precipitation_hours: day.precipitation_hours,
            precipitation_probability_max: day.precipitation_probability,
            wind_speed_10m_max: day.wind_speed,
            wind_gusts_10m_max: day.wind_gust,
        })
        .collect();
    serde_json::to_string(&records)
}

/// User turn for rendering: the question plus the forecast data for the place
#[must_use]
pub fn rendering_user_prompt(utterance: &str, place: &str, records: &str) -> String {
    format!("{utterance}\n\nForecast data for {place} (temperatures in °C, wind in km/h):\n{records}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuesday() -> ForecastDay {
        ForecastDay {
            offset: 1,
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            temperature_high: 14.0,
            precipitation_probability: 35.0,
            precipitation_sum: 2.0,
            precipitation_hours: 3.0,
            wind_speed: 12.0,
            wind_gust: 27.0,
        }
    }

    #[test]
    fn test_today_sentence() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(today_sentence(today), "Today is Monday, 2026-10-19.");
        assert!(extraction_system_prompt(today).contains("Today is Monday, 2026-10-19."));
    }

    #[test]
    fn test_extraction_user_prompt_prefix() {
        assert_eq!(
            extraction_user_prompt("And tomorrow?", Some("Paris")),
            "Previously, I asked about Paris. And tomorrow?"
        );
        assert_eq!(extraction_user_prompt("Berlin today", None), "Berlin today");
    }

    #[test]
    fn test_forecast_records_include_weekday() {
        let json = forecast_records(&[tuesday()]).unwrap();
        let records: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(records[0]["day_of_week"], "Tuesday");
        assert_eq!(records[0]["date"], "2026-10-20");
        assert_eq!(records[0]["temperature_2m_max"], 14.0);
    }
}
