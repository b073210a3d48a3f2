//! Query resolution pipeline
//!
//! One turn: utterance -> intent -> location (memory fallback) -> day offsets
//! -> forecast subset. Every step short-circuits; nothing is retried here.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument};

use crate::Result;
use crate::date_resolver::DateResolver;
use crate::error::ForecastChatError;
use crate::location_resolver::LocationResolver;
use crate::memory::LocationMemory;
use crate::models::{ParsedIntent, ResolvedLocation, ResolvedQuery};
use crate::parser::UtteranceParser;
use crate::weather::{ForecastClient, GeocodeClient};

/// Orchestrates parser, geocoder, date resolution and forecast selection
#[derive(Clone)]
pub struct QueryResolver {
    parser: UtteranceParser,
    geocoder: Arc<dyn GeocodeClient>,
    forecaster: Arc<dyn ForecastClient>,
}

impl QueryResolver {
    pub fn new(
        parser: UtteranceParser,
        geocoder: Arc<dyn GeocodeClient>,
        forecaster: Arc<dyn ForecastClient>,
    ) -> Self {
        Self {
            parser,
            geocoder,
            forecaster,
        }
    }

    /// Resolve a turn against the local calendar date
    pub async fn resolve(&self, utterance: &str, memory: &mut LocationMemory) -> Result<ResolvedQuery> {
        self.resolve_on(utterance, Local::now().date_naive(), memory).await
    }

    /// Resolve a turn as if the current date were `today`
    #[instrument(skip(self, memory))]
    pub async fn resolve_on(
        &self,
        utterance: &str,
        today: NaiveDate,
        memory: &mut LocationMemory,
    ) -> Result<ResolvedQuery> {
        let intent = self.parser.parse(utterance, memory.hint(), today).await?;
        self.resolve_intent(&intent, today, memory).await
    }

    /// Resolve an already parsed intent. Memory is only written after a
    /// successful geocode.
    pub async fn resolve_intent(
        &self,
        intent: &ParsedIntent,
        today: NaiveDate,
        memory: &mut LocationMemory,
    ) -> Result<ResolvedQuery> {
        let location = self.resolve_location(intent, memory).await?;

        let offsets = DateResolver::resolve(intent.date_expression.as_deref(), today)?;
        debug!("Resolved day offsets: {:?}", offsets);

        let series = self.forecaster.fetch(&location, today).await?;
        if series.is_empty() {
            return Err(ForecastChatError::forecast_unavailable(format!(
                "No forecast data for {location}"
            )));
        }

        let mut days = Vec::with_capacity(offsets.len());
        for offset in offsets.iter() {
            let day = series
                .iter()
                .find(|day| day.offset == offset)
                .ok_or_else(|| {
                    ForecastChatError::forecast_unavailable(format!(
                        "Forecast for {location} has no data for day {offset}"
                    ))
                })?;
            days.push(day.clone());
        }

        info!("Resolved {} day(s) for {}", days.len(), location);
        Ok(ResolvedQuery { location, days })
    }

    async fn resolve_location(
        &self,
        intent: &ParsedIntent,
        memory: &mut LocationMemory,
    ) -> Result<ResolvedLocation> {
        match intent.location_text.as_deref() {
            Some(text) => {
                let location = LocationResolver::resolve(self.geocoder.as_ref(), text).await?;
                memory.set(location.clone());
                Ok(location)
            }
            None => {
                let location = memory.get().cloned().ok_or(ForecastChatError::NoLocationContext)?;
                debug!("Using remembered location: {}", location);
                Ok(location)
            }
        }
    }
}
