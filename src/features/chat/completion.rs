//! # Completion Service
//!
//! Streaming chat completion behind a trait seam. The production
//! implementation posts to the OpenAI chat completions endpoint with
//! `stream: true` and decodes the server-sent event body itself, so HTTP
//! errors, transport drops and truncated streams all surface as `Err`.
//! Tests swap in a scripted service.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Drive the request with reqwest; require `finish_reason` before end of stream
//! - 1.0.0: Initial release with OpenAI streaming completions

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use log::debug;
use openai::chat::{ChatCompletionMessage, ChatCompletionMessageRole};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;

use super::message::{ChatMessage, Role};

/// Lazy, finite, non-restartable sequence of reply fragments.
/// `None` marks end of stream.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Trait for streaming chat completion backends
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Start a streaming completion and hand back its fragments
    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream>;
}

/// OpenAI chat completions in streaming mode
pub struct OpenAiCompletion {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompletion {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct StreamingRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage>,
    stream: bool,
}

fn to_openai_message(message: &ChatMessage) -> ChatCompletionMessage {
    let role = match message.role {
        Role::System => ChatCompletionMessageRole::System,
        Role::User => ChatCompletionMessageRole::User,
        Role::Assistant => ChatCompletionMessageRole::Assistant,
    };
    ChatCompletionMessage {
        role,
        content: Some(message.content.clone()),
        name: None,
        function_call: None,
        tool_call_id: None,
        tool_calls: None,
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream> {
        let body = StreamingRequest {
            model: &request.model,
            messages: request.messages.iter().map(to_openai_message).collect(),
            stream: true,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to open completion stream")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("OpenAI API error {status}: {detail}");
        }
        debug!("Completion stream open | Model: {}", request.model);

        Ok(Box::pin(fragment_stream(Box::pin(response.bytes_stream()))))
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

/// Line decoder for an OpenAI server-sent event body.
///
/// Bytes are buffered until a full line arrives so multi-byte characters split
/// across network chunks decode intact.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    finish_reason: Option<String>,
}

impl SseDecoder {
    /// Feed raw body bytes, returning the content of every completed line
    fn feed(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(bytes);
        let mut fragments = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.read_line(&line, &mut fragments)?;
        }
        Ok(fragments)
    }

    /// Flush the trailing line once the body ends.
    ///
    /// A body that ends before any choice reported a `finish_reason` was cut
    /// off and is an error.
    fn finish(&mut self) -> Result<Vec<String>> {
        let rest = std::mem::take(&mut self.buffer);
        let mut fragments = Vec::new();
        self.read_line(&rest, &mut fragments)?;
        if self.finish_reason.is_none() {
            bail!("Completion stream ended before finish_reason");
        }
        Ok(fragments)
    }

    fn read_line(&mut self, raw: &[u8], fragments: &mut Vec<String>) -> Result<()> {
        let line = std::str::from_utf8(raw).context("Completion stream sent invalid UTF-8")?;
        // Blank separators, `event:` lines and `:` keep-alive comments carry no data
        let Some(data) = line.trim().strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim_start();
        if data == "[DONE]" {
            return Ok(());
        }

        let chunk: StreamChunk = serde_json::from_str(data)
            .with_context(|| format!("Malformed completion chunk: {data}"))?;
        if let Some(error) = chunk.error {
            bail!("Completion stream error: {}", error.message);
        }
        for choice in chunk.choices {
            if let Some(content) = choice.delta.and_then(|delta| delta.content) {
                if !content.is_empty() {
                    fragments.push(content);
                }
            }
            if choice.finish_reason.is_some() {
                self.finish_reason = choice.finish_reason;
            }
        }
        Ok(())
    }
}

struct FragmentReader<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

impl<S, B, E> FragmentReader<S>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    async fn next_fragment(&mut self) -> Option<Result<String>> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Some(Ok(fragment));
            }
            if self.done {
                return None;
            }
            let decoded = match self.body.next().await {
                Some(Ok(bytes)) => self.decoder.feed(bytes.as_ref()),
                Some(Err(e)) => Err(anyhow::Error::new(e).context("Completion stream interrupted")),
                None => {
                    self.done = true;
                    self.decoder.finish()
                }
            };
            match decoded {
                Ok(fragments) => self.pending.extend(fragments),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Turn a raw event-stream body into reply fragments.
///
/// Yields at most one `Err`, after which the stream ends.
fn fragment_stream<S, B, E>(body: S) -> impl Stream<Item = Result<String>> + Send + 'static
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    let reader = FragmentReader {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        done: false,
    };
    stream::unfold(reader, |mut reader| async move {
        let item = reader.next_fragment().await?;
        Some((item, reader))
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use anyhow::anyhow;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    /// One scripted stream item: a fragment or a mid-stream failure
    #[derive(Debug, Clone)]
    pub enum Step {
        Fragment(&'static str),
        Fail(&'static str),
    }

    /// Completion service replaying a fixed script and recording requests
    pub struct ScriptedCompletion {
        steps: Vec<Step>,
        refuse: Option<&'static str>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedCompletion {
        pub fn fragments(fragments: &[&'static str]) -> Self {
            Self::with_steps(fragments.iter().map(|f| Step::Fragment(*f)).collect())
        }

        pub fn with_steps(steps: Vec<Step>) -> Self {
            Self {
                steps,
                refuse: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// A service whose stream never opens
        pub fn refusing(message: &'static str) -> Self {
            Self {
                steps: Vec::new(),
                refuse: Some(message),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream> {
            self.requests.lock().unwrap().push(request);
            if let Some(message) = self.refuse {
                return Err(anyhow!(message));
            }
            let items: Vec<Result<String>> = self
                .steps
                .iter()
                .map(|step| match step {
                    Step::Fragment(text) => Ok(text.to_string()),
                    Step::Fail(message) => Err(anyhow!(*message)),
                })
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    /// Well-formed stream: role chunk, two content chunks, stop chunk, `[DONE]`
    pub const COMPLETE_BODY: &str = concat!(
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"2 + 2\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" = 4\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    /// Connection closed after one content chunk
    pub const TRUNCATED_BODY: &str = "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"The answer is\"},\"finish_reason\":null}]}\n\n";

    pub const UNAUTHORIZED_BODY: &str =
        "{\"error\":{\"message\":\"Incorrect API key provided\",\"type\":\"invalid_request_error\"}}";

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub authorization: Option<String>,
        pub body: serde_json::Value,
    }

    #[derive(Clone)]
    struct MockUpstream {
        status: StatusCode,
        body: &'static str,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    async fn chat_completions(
        State(mock): State<MockUpstream>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        mock.calls
            .lock()
            .unwrap()
            .push(RecordedCall { authorization, body });
        (
            mock.status,
            [(header::CONTENT_TYPE, "text/event-stream")],
            mock.body,
        )
    }

    /// Serve a canned `/v1/chat/completions` answer on a local port.
    ///
    /// Returns the base URL to hand to `OpenAiCompletion::new` and the log of
    /// calls the server received.
    pub async fn mock_upstream(
        status: StatusCode,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<RecordedCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mock = MockUpstream {
            status,
            body,
            calls: calls.clone(),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(mock);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1/"), calls)
    }
}
