//! Error types and handling for `ForecastChat`

use chrono::NaiveDate;
use thiserror::Error;

use crate::date_resolver::MAX_OFFSET;

/// Main error type for a conversation turn
#[derive(Error, Debug)]
pub enum ForecastChatError {
    /// The utterance could not be turned into a structured intent
    #[error("Could not understand the request: {message}")]
    ParseFailure { message: String },

    /// No location in the utterance and nothing remembered from earlier turns
    #[error("No location given and no previous location to fall back to")]
    NoLocationContext,

    /// The geocoder has no match for the requested place
    #[error("Location not found: {name}")]
    LocationNotFound { name: String },

    /// Requested date lies outside the forecast horizon
    #[error("Date {date} is {offset} day(s) from today, outside the forecast window")]
    OutOfRangeDate { date: NaiveDate, offset: i64 },

    /// Day expression that maps to no offset at all
    #[error("Could not resolve day expression: '{expression}'")]
    UnresolvedDateExpression { expression: String },

    /// Weather or geocoding provider outage
    #[error("Forecast unavailable: {message}")]
    ForecastUnavailable { message: String },

    /// Natural-language rendering failed
    #[error("Rendering failed: {message}")]
    RenderFailure { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastChatError {
    /// Create a new parse failure
    pub fn parse_failure<S: Into<String>>(message: S) -> Self {
        Self::ParseFailure {
            message: message.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(name: S) -> Self {
        Self::LocationNotFound { name: name.into() }
    }

    pub fn out_of_range(date: NaiveDate, today: NaiveDate) -> Self {
        Self::OutOfRangeDate {
            date,
            offset: (date - today).num_days(),
        }
    }

    pub fn unresolved_date<S: Into<String>>(expression: S) -> Self {
        Self::UnresolvedDateExpression {
            expression: expression.into(),
        }
    }

    /// Create a new provider outage error
    pub fn forecast_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ForecastUnavailable {
            message: message.into(),
        }
    }

    pub fn render_failure<S: Into<String>>(message: S) -> Self {
        Self::RenderFailure {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastChatError::ParseFailure { .. } => {
                "Sorry, I could not understand that. Could you rephrase your question?"
                    .to_string()
            }
            ForecastChatError::NoLocationContext => {
                "Which place would you like the forecast for? Please name a city or region."
                    .to_string()
            }
            ForecastChatError::LocationNotFound { name } => {
                format!("I could not find a place called '{name}'. Please check the spelling.")
            }
            ForecastChatError::OutOfRangeDate { date, .. } => format!(
                "I can only forecast today and the next {MAX_OFFSET} days, and {date} is outside that window."
            ),
            ForecastChatError::UnresolvedDateExpression { expression } => format!(
                "I could not work out which day '{expression}' means. Try a weekday, 'tomorrow' or a date within the next {MAX_OFFSET} days."
            ),
            ForecastChatError::ForecastUnavailable { .. } => {
                "The weather service is not reachable right now. Please try again later."
                    .to_string()
            }
            ForecastChatError::RenderFailure { .. } => {
                "I could not phrase an answer for this forecast.".to_string()
            }
            ForecastChatError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            ForecastChatError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
