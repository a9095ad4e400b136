//! OpenAI-compatible `/chat/completions` adapter, used for both model backends.

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use folio_kit::http::TracedClient;
use futures::{stream::BoxStream, StreamExt};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::{
    error::ProviderError,
    inference::{ChatMessage, ContentPart, LanguageModel, TextStream},
};

/// Upper bound for a single unterminated SSE line.
const MAX_SSE_BUFFER_SIZE: usize = 1_000_000;

#[derive(Clone)]
pub struct ChatCompletionsModel {
    http: TracedClient,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

impl ChatCompletionsModel {
    pub fn new(
        http: TracedClient,
        base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    async fn post(&self, body: Value) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let builder = self
            .http
            .request(Method::POST, &url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let resp = self.http.send(builder).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(ProviderError::from_status(status.as_u16(), &text, false))
    }
}

fn message_to_json(message: &ChatMessage) -> Value {
    let parts: Vec<Value> = message
        .content
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => json!({ "type": "text", "text": text }),
            ContentPart::File {
                media_type,
                filename,
                data,
            } => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(data);
                json!({
                    "type": "file",
                    "file": {
                        "filename": filename.as_deref().unwrap_or("document"),
                        "file_data": format!("data:{media_type};base64,{encoded}"),
                    }
                })
            }
        })
        .collect();
    json!({ "role": message.role, "content": parts })
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let resp = self
            .post(json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .await?;
        let completion: Completion = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::Decode("completion has no choices".into()))
    }

    async fn stream_text(&self, messages: Vec<ChatMessage>) -> Result<TextStream, ProviderError> {
        let messages: Vec<Value> = messages.iter().map(message_to_json).collect();
        let resp = self
            .post(json!({
                "model": self.model,
                "messages": messages,
                "stream": true,
            }))
            .await?;
        debug!(model = %self.model, "completion stream opened");
        Ok(sse_text_stream(resp.bytes_stream().boxed()))
    }
}

enum SseLine {
    Delta(String),
    Done,
    Failed(String),
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    let value: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "skipping malformed stream chunk");
            return SseLine::Skip;
        }
    };
    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| err.to_string());
        return SseLine::Failed(message);
    }
    match serde_json::from_value::<StreamChunk>(value) {
        Ok(chunk) => {
            let text: String = chunk
                .choices
                .into_iter()
                .filter_map(|c| c.delta.content)
                .collect();
            if text.is_empty() {
                SseLine::Skip
            } else {
                SseLine::Delta(text)
            }
        }
        Err(_) => SseLine::Skip,
    }
}

struct SseState {
    bytes: BoxStream<'static, reqwest::Result<Bytes>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String, ProviderError>>,
    finished: bool,
}

impl SseState {
    /// Move every complete line from the buffer into `pending`.
    fn drain_lines(&mut self, flush: bool) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.handle_line(&line);
            if self.finished {
                return;
            }
        }
        if flush && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.handle_line(&line);
        }
    }

    fn handle_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        match parse_sse_line(line.trim()) {
            SseLine::Delta(text) => self.pending.push_back(Ok(text)),
            SseLine::Done => {
                self.finished = true;
                self.buffer.clear();
            }
            SseLine::Failed(message) => {
                self.pending.push_back(Err(ProviderError::Api {
                    status: 200,
                    message,
                }));
                self.finished = true;
            }
            SseLine::Skip => {}
        }
    }
}

/// Turn an SSE byte stream into the `choices[].delta.content` text deltas.
fn sse_text_stream(bytes: BoxStream<'static, reqwest::Result<Bytes>>) -> TextStream {
    let state = SseState {
        bytes,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    st.buffer.extend_from_slice(&chunk);
                    if st.buffer.len() > MAX_SSE_BUFFER_SIZE {
                        st.finished = true;
                        st.pending.push_back(Err(ProviderError::Decode(
                            "stream buffer exceeded maximum size".into(),
                        )));
                        continue;
                    }
                    st.drain_lines(false);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.pending.push_back(Err(e.into()));
                }
                None => {
                    st.drain_lines(true);
                    st.finished = true;
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(chunks: Vec<&'static str>) -> BoxStream<'static, reqwest::Result<Bytes>> {
        futures::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))))
            .boxed()
    }

    async fn collect(stream: TextStream) -> Vec<Result<String, ProviderError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn parses_deltas_across_chunk_boundaries() {
        let out = collect(sse_text_stream(byte_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"## Sum",
            "mary\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" text\"}}]}\n\n",
            "data: [DONE]\n\n",
        ])))
        .await;

        let texts: Vec<String> = out.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts, vec!["## Summary".to_string(), " text".to_string()]);
    }

    #[tokio::test]
    async fn multibyte_characters_split_between_chunks_survive() {
        let full = "data: {\"choices\":[{\"delta\":{\"content\":\"caf\u{e9}\"}}]}\n";
        let bytes = full.as_bytes();
        let split = full.find('\u{e9}').unwrap() + 1;
        let (a, b) = bytes.split_at(split);
        let stream = futures::stream::iter(vec![
            Ok(Bytes::copy_from_slice(a)),
            Ok(Bytes::copy_from_slice(b)),
        ])
        .boxed();

        let out = collect(sse_text_stream(stream)).await;
        assert_eq!(out, vec![Ok("caf\u{e9}".to_string())]);
    }

    #[tokio::test]
    async fn in_band_error_ends_stream() {
        let out = collect(sse_text_stream(byte_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
            "data: {\"error\":{\"message\":\"overloaded\"}}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n",
        ])))
        .await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Ok("a".to_string()));
        assert_eq!(out[1].as_ref().unwrap_err().to_string(), "overloaded");
    }

    #[tokio::test]
    async fn trailing_line_without_newline_is_flushed() {
        let out = collect(sse_text_stream(byte_stream(vec![
            ": keep-alive\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}",
        ])))
        .await;
        assert_eq!(out, vec![Ok("tail".to_string())]);
    }

    #[test]
    fn file_parts_become_data_urls() {
        let msg = ChatMessage::user(vec![
            ContentPart::Text("Summarize".into()),
            ContentPart::File {
                media_type: "application/pdf".into(),
                filename: Some("a.pdf".into()),
                data: Bytes::from_static(b"%PDF"),
            },
        ]);
        let v = message_to_json(&msg);
        assert_eq!(v["role"], "user");
        assert_eq!(v["content"][0]["text"], "Summarize");
        assert_eq!(v["content"][1]["type"], "file");
        assert_eq!(
            v["content"][1]["file"]["file_data"],
            "data:application/pdf;base64,JVBERg=="
        );
    }
}
