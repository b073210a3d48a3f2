//! `ForecastChat` - Conversational weather forecasts for the next seven days
//!
//! This library turns free-form questions ("How about Paris on Friday?") into
//! geocoded, date-resolved forecast queries and renders the answers, keeping
//! the last location of a conversation as context for follow-up turns.

pub mod config;
pub mod date_resolver;
pub mod error;
pub mod http;
pub mod llm;
pub mod location_resolver;
pub mod memory;
pub mod models;
pub mod parser;
pub mod renderer;
pub mod resolver;
pub mod session;
pub mod telemetry;
pub mod weather;

// Re-export core types for public API
pub use config::ForecastChatConfig;
pub use date_resolver::{DateResolver, DayOffsets, FORECAST_DAYS, MAX_OFFSET};
pub use error::ForecastChatError;
pub use llm::{LanguageExtractor, LanguageRenderer, MistralClient};
pub use location_resolver::{LocationInput, LocationResolver};
pub use memory::LocationMemory;
pub use models::{ForecastDay, ParsedIntent, ResolvedLocation, ResolvedQuery};
pub use parser::UtteranceParser;
pub use renderer::{Rendered, ResponseRenderer};
pub use resolver::QueryResolver;
pub use session::{ConversationSession, Reply};
pub use weather::{ForecastClient, GeocodeClient, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
