//! Utterance parsing on top of a language extractor
//!
//! The extractor is free to answer loosely; this layer enforces the intent
//! contract so the resolver only ever sees trimmed, non-empty phrases.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::Result;
use crate::error::ForecastChatError;
use crate::llm::LanguageExtractor;
use crate::models::ParsedIntent;

/// Phrases that point back at an earlier turn instead of naming a place
const PLACEHOLDER_LOCATIONS: &[&str] = &[
    "there",
    "here",
    "it",
    "that",
    "that place",
    "this place",
    "same place",
    "the same place",
    "same location",
    "the same location",
    "same city",
    "the same city",
    "previous location",
    "the previous location",
    "null",
    "none",
    "unknown",
    "n/a",
];

/// Stand-ins a model writes for "no day mentioned"
const PLACEHOLDER_DATES: &[&str] = &["null", "none", "unknown", "n/a", "unspecified"];

/// Turns one utterance into a normalised `ParsedIntent`
#[derive(Clone)]
pub struct UtteranceParser {
    extractor: Arc<dyn LanguageExtractor>,
}

impl UtteranceParser {
    pub fn new(extractor: Arc<dyn LanguageExtractor>) -> Self {
        Self { extractor }
    }

    /// Parse `utterance`; `hint` is the place remembered from earlier turns.
    /// Blank utterances fail without consulting the extractor.
    pub async fn parse(
        &self,
        utterance: &str,
        hint: Option<&str>,
        today: NaiveDate,
    ) -> Result<ParsedIntent> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ForecastChatError::parse_failure("The message is empty"));
        }

        let raw = self.extractor.extract(utterance, hint, today).await?;
        let intent = ParsedIntent {
            location_text: raw
                .location_text
                .as_deref()
                .and_then(|location| clean_phrase(location.trim_end().trim_end_matches('.')))
                .filter(|location| !is_placeholder(PLACEHOLDER_LOCATIONS, location)),
            date_expression: raw
                .date_expression
                .as_deref()
                .and_then(clean_phrase)
                .filter(|date| !is_placeholder(PLACEHOLDER_DATES, date)),
        };

        debug!(
            "Parsed intent: location={:?} date_expression={:?}",
            intent.location_text, intent.date_expression
        );
        Ok(intent)
    }
}

/// Trim, collapse inner whitespace and drop trailing punctuation; `None` when nothing is left
fn clean_phrase(phrase: &str) -> Option<String> {
    let collapsed = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed
        .trim_end_matches(['?', '!', ',', ';', ':'])
        .trim_matches(['"', '\''])
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn is_placeholder(placeholders: &[&str], phrase: &str) -> bool {
    let lowered = phrase.to_lowercase();
    placeholders.contains(&lowered.as_str())
}
