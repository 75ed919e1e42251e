//! # HTTP Routes
//!
//! Page, history, submission (SSE) and static avatar endpoints.
//!
//! - **Version**: 1.1.1
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.1: Bubbles carry Markdown-rendered HTML
//! - 1.1.0: Added /api/personas listing
//! - 1.0.0: Initial release

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::services::ServeDir;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use crate::features::chat::ChatEvent;
use crate::features::personas::{is_known_persona, parse_selector, BubbleStyle};
use crate::features::render::Bubble;

/// Query parameter carrying the persona selector
pub const SELECTOR_PARAM: &str = "type";

/// Event channel capacity per submission
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PersonaSummary {
    pub id: u8,
    pub title: String,
    pub description: String,
    pub bubble_style: BubbleStyle,
    pub warm: bool,
    pub has_avatar: bool,
}

pub fn router(state: AppState) -> Router {
    let public = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/personas", get(list_personas))
        .route("/api/sessions/{id}/history", get(history))
        .route("/api/sessions/{id}/messages", post(submit_message))
        .nest_service("/public", public)
        .with_state(state)
}

/// Chat page for the selected persona, or the credential prompt when chat is disabled
async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let selector = params.get(SELECTOR_PARAM).map(String::as_str);
    if !is_known_persona(parse_selector(selector)) {
        debug!("Persona selector {selector:?} not recognised, using default persona");
    }
    let persona = state
        .registry
        .resolve_with_avatar(selector, state.config.avatar_base_url.as_deref());

    if !state.chat_enabled() {
        return Ok(Html(state.renderer.missing_key_page(&persona)?));
    }

    let session_id = state.sessions.create(persona.clone());
    Ok(Html(state.renderer.chat_page(&persona, session_id)?))
}

async fn health() -> &'static str {
    "ok"
}

async fn list_personas(State(state): State<AppState>) -> Json<Vec<PersonaSummary>> {
    let summaries = state
        .registry
        .list()
        .iter()
        .map(|p| PersonaSummary {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            bubble_style: p.bubble_style,
            warm: p.warm,
            has_avatar: p.avatar.is_some(),
        })
        .collect();
    Json(summaries)
}

/// Full transcript as bubbles, system prompt excluded
async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Bubble>>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown session: {id}")))?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(session.render_history()))
}

/// Submit a message and stream the reply as server-sent events
async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let driver = state.driver.clone().ok_or_else(|| {
        ApiError::Unavailable("Please add your OpenAI API key to continue.".to_string())
    })?;
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown session: {id}")))?;
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Message text is empty".to_string()));
    }

    let (tx, rx) = mpsc::channel::<ChatEvent>(EVENT_CHANNEL_CAPACITY);
    let text = body.text;

    tokio::spawn(async move {
        let mut session = session.lock().await;
        if let Err(e) = driver.submit(&mut session, &text, &tx).await {
            error!("[{id}] Completion stream failed: {e:#}");
            let _ = tx
                .send(ChatEvent::Error {
                    message: format!("{e:#}"),
                })
                .await;
        }
    });

    let stream = ReceiverStream::new(rx)
        .map(|event| Event::default().event(event.name()).json_data(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
