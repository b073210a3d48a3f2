//! Reply rendering with a plain-data fallback

use std::sync::Arc;

use tracing::warn;

use crate::llm::LanguageRenderer;
use crate::models::ResolvedQuery;

/// Text produced for one resolved query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// True when the language renderer failed and the template was used
    pub degraded: bool,
}

/// Wraps a `LanguageRenderer`; a render failure never fails the turn
#[derive(Clone)]
pub struct ResponseRenderer {
    renderer: Arc<dyn LanguageRenderer>,
}

impl ResponseRenderer {
    pub fn new(renderer: Arc<dyn LanguageRenderer>) -> Self {
        Self { renderer }
    }

    pub async fn render(&self, query: &ResolvedQuery, utterance: &str) -> Rendered {
        match self.renderer.render(query, utterance).await {
            Ok(text) if !text.trim().is_empty() => Rendered {
                text,
                degraded: false,
            },
            Ok(_) => {
                warn!("Renderer returned empty text, using template");
                Self::fallback(query)
            }
            Err(e) => {
                warn!("Rendering failed, using template: {}", e);
                Self::fallback(query)
            }
        }
    }

    fn fallback(query: &ResolvedQuery) -> Rendered {
        Rendered {
            text: template(query),
            degraded: true,
        }
    }
}

/// Plain listing of the forecast, one line per day
#[must_use]
pub fn template(query: &ResolvedQuery) -> String {
    let mut text = format!("Forecast for {}:", query.location);
    for day in &query.days {
        text.push_str(&format!(
            "\n- {} {}: high {}, {}, wind {}",
            day.weekday_name(),
            day.date.format("%Y-%m-%d"),
            day.format_temperature(),
            day.format_precipitation(),
            day.format_wind()
        ));
    }
    text
}
