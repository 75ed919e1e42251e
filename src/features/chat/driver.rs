//! # Chat Session Driver
//!
//! Runs one submission: records the user message, sends the persona's fixed
//! four-message request, relays the streamed reply and records the result.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Clear the thinking placeholder when the stream fails
//! - 1.0.0: Initial release with thinking placeholder for warm personas

use anyhow::Result;
use futures::StreamExt;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use super::completion::{CompletionRequest, CompletionService};
use super::events::ChatEvent;
use super::message::ChatMessage;
use super::session::ChatSession;
use crate::features::personas::PromptBuilder;
use crate::features::render::Bubble;

#[derive(Clone)]
pub struct ChatDriver {
    completion: Arc<dyn CompletionService>,
    model: String,
}

impl ChatDriver {
    pub fn new(completion: Arc<dyn CompletionService>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a user message and stream the reply.
    ///
    /// Events are pushed to `events` as they happen. A dropped receiver does
    /// not stop the stream. On an upstream failure the error is returned as-is
    /// and no assistant message is recorded.
    pub async fn submit(
        &self,
        session: &mut ChatSession,
        text: &str,
        events: &mpsc::Sender<ChatEvent>,
    ) -> Result<String> {
        let start_time = Instant::now();
        let session_id = session.id;
        let warm = session.persona.warm;
        session.touch();

        info!(
            "[{session_id}] Submission | Persona: {} | Chars: {} | Transcript: {}",
            session.persona.id,
            text.len(),
            session.transcript().len()
        );

        let user_message = ChatMessage::user(text);
        let user_bubble = Bubble::for_message(&user_message, &session.persona);
        session.push(user_message);
        emit(events, ChatEvent::UserMessage { bubble: user_bubble }).await;

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: PromptBuilder::new(&session.persona)
                .with_user_message(text)
                .build(),
        };

        if warm {
            emit(
                events,
                ChatEvent::Thinking {
                    bubble: Bubble::thinking(&session.persona),
                },
            )
            .await;
        }

        let relayed = self.relay(request, events).await;

        // The placeholder goes away on every exit, failed streams included
        if warm {
            emit(events, ChatEvent::ThinkingCleared).await;
        }

        let (response, fragment_count) = relayed?;

        session.push(ChatMessage::assistant(response.clone()));
        session.touch();
        emit(
            events,
            ChatEvent::Done {
                bubble: Bubble::assistant(response.clone(), &session.persona),
            },
        )
        .await;

        info!(
            "[{session_id}] Reply complete | Fragments: {fragment_count} | Chars: {} | Elapsed: {}ms",
            response.len(),
            start_time.elapsed().as_millis()
        );

        Ok(response)
    }

    /// Open the stream and forward each fragment, returning the full reply
    /// and the fragment count
    async fn relay(
        &self,
        request: CompletionRequest,
        events: &mpsc::Sender<ChatEvent>,
    ) -> Result<(String, usize)> {
        let mut fragments = self.completion.stream(request).await?;
        let mut response = String::new();
        let mut fragment_count = 0usize;

        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            fragment_count += 1;
            response.push_str(&fragment);
            emit(events, ChatEvent::Fragment { text: fragment }).await;
        }

        Ok((response, fragment_count))
    }
}

async fn emit(events: &mpsc::Sender<ChatEvent>, event: ChatEvent) {
    let name = event.name();
    if events.send(event).await.is_err() {
        debug!("Event receiver gone, dropping {name} event");
    }
}
