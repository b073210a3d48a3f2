//! Chat-completions client for the Mistral API

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, instrument};

use super::{LanguageExtractor, LanguageRenderer, prompts};
use crate::Result;
use crate::config::LlmConfig;
use crate::error::ForecastChatError;
use crate::http::build_client;
use crate::models::{ParsedIntent, ResolvedQuery};

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: String) -> Self {
        Self { role: "system", content }
    }

    fn user(content: String) -> Self {
        Self { role: "user", content }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Shape the extractor is asked to answer in. Both keys must be present;
/// `null` marks a phrase the utterance did not contain.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IntentReply {
    #[serde(deserialize_with = "nullable")]
    location: Option<String>,
    #[serde(deserialize_with = "nullable")]
    date_expression: Option<String>,
}

/// Same as the derived `Option` impl, but without the implicit default that
/// lets a missing key pass as `None`
fn nullable<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Mistral-backed extractor and renderer
pub struct MistralClient {
    client: ClientWithMiddleware,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl MistralClient {
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self> {
        let client = build_client(config.timeout_seconds, config.max_retries)?;
        Ok(Self::with_client(client, config, api_key))
    }

    #[must_use]
    pub fn with_client(client: ClientWithMiddleware, config: &LlmConfig, api_key: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
            temperature: config.temperature,
        }
    }

    /// Send one chat completion and return the first choice's text.
    /// Failures are reported as `String` so each caller picks its error kind.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        json_mode: bool,
    ) -> std::result::Result<String, String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            response_format: json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| format!("Failed to encode chat request: {e}"))?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| format!("Chat completion request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Chat completion returned status {}: {}", status, detail);
            return Err(format!("Chat completion failed with status: {status}"));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("Invalid chat completion response: {e}"))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| "Chat completion returned no content".to_string())
    }
}

/// Decode the extractor's JSON answer, tolerating a markdown code fence around it
fn parse_intent_reply(content: &str) -> Result<ParsedIntent> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let reply: IntentReply = serde_json::from_str(unfenced).map_err(|e| {
        debug!("Unparseable extraction reply: {}", unfenced);
        ForecastChatError::parse_failure(format!("Extractor reply is not an intent: {e}"))
    })?;

    Ok(ParsedIntent {
        location_text: reply.location,
        date_expression: reply.date_expression,
    })
}

#[async_trait]
impl LanguageExtractor for MistralClient {
    #[instrument(skip(self))]
    async fn extract(
        &self,
        utterance: &str,
        hint: Option<&str>,
        today: NaiveDate,
    ) -> Result<ParsedIntent> {
        let messages = vec![
            ChatMessage::system(prompts::extraction_system_prompt(today)),
            ChatMessage::user(prompts::extraction_user_prompt(utterance, hint)),
        ];

        let content = self
            .complete(messages, true)
            .await
            .map_err(ForecastChatError::parse_failure)?;

        let intent = parse_intent_reply(&content)?;
        info!(
            "Extracted location={:?} date_expression={:?}",
            intent.location_text, intent.date_expression
        );
        Ok(intent)
    }
}

#[async_trait]
impl LanguageRenderer for MistralClient {
    #[instrument(skip(self, query), fields(location = %query.location))]
    async fn render(&self, query: &ResolvedQuery, utterance: &str) -> Result<String> {
        let today = query
            .days
            .first()
            .and_then(|day| day.date.checked_sub_days(Days::new(day.offset.into())))
            .unwrap_or_else(|| Local::now().date_naive());

        let records = prompts::forecast_records(&query.days)
            .map_err(|e| ForecastChatError::render_failure(format!("Failed to encode forecast: {e}")))?;

        let messages = vec![
            ChatMessage::system(prompts::rendering_system_prompt(today)),
            ChatMessage::user(prompts::rendering_user_prompt(
                utterance,
                &query.location.to_string(),
                &records,
            )),
        ];

        let text = self
            .complete(messages, false)
            .await
            .map_err(ForecastChatError::render_failure)?;
        Ok(text.trim().to_string())
    }
}
