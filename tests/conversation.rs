//! End-to-end conversation scenarios with in-memory collaborators

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};

use forecast_chat::{
    ConversationSession, ForecastChatError, ForecastClient, ForecastDay, GeocodeClient,
    LanguageExtractor, LanguageRenderer, LocationMemory, ParsedIntent, QueryResolver,
    ResolvedLocation, ResolvedQuery, ResponseRenderer, Result, UtteranceParser,
};

/// Answers with a canned intent per utterance
struct ScriptedExtractor {
    intents: HashMap<&'static str, ParsedIntent>,
}

impl ScriptedExtractor {
    fn new(script: &[(&'static str, Option<&str>, Option<&str>)]) -> Self {
        Self {
            intents: script
                .iter()
                .map(|(utterance, location, date)| (*utterance, ParsedIntent::new(*location, *date)))
                .collect(),
        }
    }
}

#[async_trait]
impl LanguageExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        utterance: &str,
        _hint: Option<&str>,
        _today: NaiveDate,
    ) -> Result<ParsedIntent> {
        self.intents
            .get(utterance)
            .cloned()
            .ok_or_else(|| ForecastChatError::parse_failure(format!("unscripted: {utterance}")))
    }
}

struct Atlas {
    lookups: AtomicUsize,
}

#[async_trait]
impl GeocodeClient for Atlas {
    async fn lookup(&self, name: &str) -> Result<Option<ResolvedLocation>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(match name {
            "Paris" => Some(ResolvedLocation::new("Paris", 48.8534, 2.3488).with_country("France")),
            "Berlin" => {
                Some(ResolvedLocation::new("Berlin", 52.5244, 13.4105).with_country("Germany"))
            }
            _ => None,
        })
    }
}

/// Seven days per location, temperature derived from latitude and offset
struct SevenDays;

#[async_trait]
impl ForecastClient for SevenDays {
    async fn fetch(&self, location: &ResolvedLocation, today: NaiveDate) -> Result<Vec<ForecastDay>> {
        Ok((0..7u8)
            .map(|offset| ForecastDay {
                offset,
                date: today.checked_add_days(Days::new(offset.into())).unwrap(),
                temperature_high: (location.latitude / 4.0).round() + f64::from(offset),
                precipitation_probability: 10.0 * f64::from(offset),
                precipitation_sum: 0.0,
                precipitation_hours: 0.0,
                wind_speed: 10.0,
                wind_gust: 20.0,
            })
            .collect())
    }
}

/// Lists the weekdays it was asked about, or fails when `broken`
struct EchoRenderer {
    broken: bool,
}

#[async_trait]
impl LanguageRenderer for EchoRenderer {
    async fn render(&self, query: &ResolvedQuery, _utterance: &str) -> Result<String> {
        if self.broken {
            return Err(ForecastChatError::render_failure("model offline"));
        }
        let days: Vec<String> = query.days.iter().map(ForecastDay::weekday_name).collect();
        Ok(format!("{}: {}", query.location.name, days.join(", ")))
    }
}

const SCRIPT: &[(&str, Option<&str>, Option<&str>)] = &[
    ("What's the weather in Paris tomorrow?", Some("Paris"), Some("tomorrow")),
    ("And the day after?", None, Some("the day after")),
    ("What's the weather in Qzxlflorp?", Some("Qzxlflorp"), None),
    ("And on Friday?", None, Some("friday")),
    ("What's the weather in Berlin tomorrow?", Some("Berlin"), Some("tomorrow")),
    ("How about next weekend there?", None, Some("this weekend")),
    ("Is it nice on the 25th?", None, Some("2026-10-25")),
    ("And on the 26th?", None, Some("2026-10-26")),
    ("Tomorrow?", None, Some("tomorrow")),
];

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn pipeline(broken_renderer: bool) -> (QueryResolver, ResponseRenderer, Arc<Atlas>) {
    let atlas = Arc::new(Atlas {
        lookups: AtomicUsize::new(0),
    });
    let resolver = QueryResolver::new(
        UtteranceParser::new(Arc::new(ScriptedExtractor::new(SCRIPT))),
        atlas.clone(),
        Arc::new(SevenDays),
    );
    let renderer = ResponseRenderer::new(Arc::new(EchoRenderer {
        broken: broken_renderer,
    }));
    (resolver, renderer, atlas)
}

fn session(broken_renderer: bool) -> ConversationSession {
    let (resolver, renderer, _) = pipeline(broken_renderer);
    ConversationSession::new(resolver, renderer)
}

#[tokio::test]
async fn berlin_tomorrow_on_a_monday_is_exactly_tuesday() {
    let mut session = session(false);
    let reply = session
        .answer_on("What's the weather in Berlin tomorrow?", monday())
        .await
        .unwrap();

    assert_eq!(reply.query.location.latitude, 52.5244);
    assert_eq!(reply.query.location.longitude, 13.4105);
    assert_eq!(reply.query.days.len(), 1);
    assert_eq!(reply.query.days[0].offset, 1);
    assert_eq!(reply.query.days[0].weekday(), Weekday::Tue);
    assert_eq!(reply.query.days[0].date.weekday(), Weekday::Tue);
    assert_eq!(reply.text, "Berlin: Tuesday");
    assert!(!reply.degraded);
}

#[tokio::test]
async fn follow_up_reuses_remembered_location() {
    let mut session = session(false);
    session
        .answer_on("What's the weather in Paris tomorrow?", monday())
        .await
        .unwrap();

    let reply = session.answer_on("And the day after?", monday()).await.unwrap();
    assert_eq!(reply.query.location.name, "Paris");
    assert_eq!(reply.query.offsets(), vec![2]);
}

#[tokio::test]
async fn failed_lookup_does_not_corrupt_memory() {
    let mut session = session(false);
    session
        .answer_on("What's the weather in Paris tomorrow?", monday())
        .await
        .unwrap();

    let err = session
        .answer_on("What's the weather in Qzxlflorp?", monday())
        .await
        .unwrap_err();
    assert!(matches!(err, ForecastChatError::LocationNotFound { .. }));
    assert_eq!(session.memory().hint(), Some("Paris"));

    let reply = session.answer_on("And on Friday?", monday()).await.unwrap();
    assert_eq!(reply.query.location.name, "Paris");
    assert_eq!(reply.query.offsets(), vec![4]);
}

#[tokio::test]
async fn first_turn_without_location_has_no_context() {
    let mut session = session(false);
    let err = session.answer_on("Tomorrow?", monday()).await.unwrap_err();
    assert!(matches!(err, ForecastChatError::NoLocationContext));

    // respond() never fails, it explains instead
    let text = session.respond("Tomorrow?").await;
    assert_eq!(text, ForecastChatError::NoLocationContext.user_message());
}

#[tokio::test]
async fn six_days_out_succeeds_and_seven_fails() {
    let mut session = session(false);
    session
        .answer_on("What's the weather in Berlin tomorrow?", monday())
        .await
        .unwrap();

    let reply = session.answer_on("Is it nice on the 25th?", monday()).await.unwrap();
    assert_eq!(reply.query.offsets(), vec![6]);
    assert_eq!(reply.query.days[0].weekday(), Weekday::Sun);

    let err = session.answer_on("And on the 26th?", monday()).await.unwrap_err();
    assert!(matches!(err, ForecastChatError::OutOfRangeDate { offset: 7, .. }));
}

#[tokio::test]
async fn weekend_resolves_to_saturday_and_sunday() {
    let mut session = session(false);
    session
        .answer_on("What's the weather in Berlin tomorrow?", monday())
        .await
        .unwrap();

    let reply = session
        .answer_on("How about next weekend there?", monday())
        .await
        .unwrap();
    assert_eq!(reply.query.offsets(), vec![5, 6]);
    assert_eq!(reply.text, "Berlin: Saturday, Sunday");
}

#[tokio::test]
async fn render_failure_falls_back_to_template() {
    let mut session = session(true);
    let reply = session
        .answer_on("What's the weather in Berlin tomorrow?", monday())
        .await
        .unwrap();

    assert!(reply.degraded);
    assert!(reply.text.starts_with("Forecast for Berlin, Germany:"));
    assert!(reply.text.contains("Tuesday 2026-10-20"));
}

#[tokio::test]
async fn resolving_the_same_intent_twice_is_identical() {
    let (resolver, _, atlas) = pipeline(false);
    let intent = ParsedIntent::new(Some("Paris"), Some("saturday, sunday"));

    let mut first_memory = LocationMemory::new();
    let mut second_memory = LocationMemory::new();
    let first = resolver
        .resolve_intent(&intent, monday(), &mut first_memory)
        .await
        .unwrap();
    let second = resolver
        .resolve_intent(&intent, monday(), &mut second_memory)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.offsets(), vec![5, 6]);
    assert_eq!(atlas.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn sessions_do_not_share_memory() {
    let mut first = session(false);
    let mut second = session(false);

    first
        .answer_on("What's the weather in Paris tomorrow?", monday())
        .await
        .unwrap();
    let err = second.answer_on("Tomorrow?", monday()).await.unwrap_err();

    assert!(matches!(err, ForecastChatError::NoLocationContext));
}
