//! Language collaborators: utterance extraction and answer rendering

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;
use crate::models::{ParsedIntent, ResolvedQuery};

mod mistral;
pub mod prompts;

pub use mistral::MistralClient;

/// Pulls the location phrase and day phrase out of a free-form utterance
#[async_trait]
pub trait LanguageExtractor: Send + Sync {
    /// `hint` is the previously resolved place name, if any; `today` is the
    /// date relative day phrases are read against. Output that does not fit
    /// the intent shape is a `ParseFailure`.
    async fn extract(
        &self,
        utterance: &str,
        hint: Option<&str>,
        today: NaiveDate,
    ) -> Result<ParsedIntent>;
}

/// Phrases a resolved query as natural language
#[async_trait]
pub trait LanguageRenderer: Send + Sync {
    async fn render(&self, query: &ResolvedQuery, utterance: &str) -> Result<String>;
}
