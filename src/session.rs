//! One conversation: its memory plus the resolve/render pipeline

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::Result;
use crate::memory::LocationMemory;
use crate::models::ResolvedQuery;
use crate::renderer::ResponseRenderer;
use crate::resolver::QueryResolver;

/// Answer to a single turn
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub query: ResolvedQuery,
    /// The text is the plain-data template, not the language renderer's output
    pub degraded: bool,
}

/// Owns exactly one `LocationMemory`; turns are processed one at a time
pub struct ConversationSession {
    resolver: QueryResolver,
    renderer: ResponseRenderer,
    memory: LocationMemory,
}

impl ConversationSession {
    pub fn new(resolver: QueryResolver, renderer: ResponseRenderer) -> Self {
        Self {
            resolver,
            renderer,
            memory: LocationMemory::new(),
        }
    }

    #[must_use]
    pub fn memory(&self) -> &LocationMemory {
        &self.memory
    }

    /// Run one turn against today's local date
    pub async fn answer(&mut self, utterance: &str) -> Result<Reply> {
        self.answer_on(utterance, Local::now().date_naive()).await
    }

    /// Run one turn as if the current date were `today`
    pub async fn answer_on(&mut self, utterance: &str, today: NaiveDate) -> Result<Reply> {
        let query = self
            .resolver
            .resolve_on(utterance, today, &mut self.memory)
            .await?;
        let rendered = self.renderer.render(&query, utterance).await;

        Ok(Reply {
            text: rendered.text,
            query,
            degraded: rendered.degraded,
        })
    }

    /// Run one turn and always produce text; failures become their user message
    pub async fn respond(&mut self, utterance: &str) -> String {
        match self.answer(utterance).await {
            Ok(reply) => {
                info!("Answered for {} ({} day(s))", reply.query.location, reply.query.days.len());
                reply.text
            }
            Err(e) => {
                warn!("Turn failed: {}", e);
                e.user_message()
            }
        }
    }
}
