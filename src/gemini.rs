use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReplyError;

// Structures matching Gemini's :streamGenerateContent endpoint
#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

// Gemini reports failures inside a 200 stream as `{"error": {...}}` events.
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl std::fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = self.code {
            write!(f, "{} ", code)?;
        }
        if let Some(status) = &self.status {
            write!(f, "{}: ", status)?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateChunk {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Streaming client for the hosted Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ReplyError> {
        let mut builder = Client::builder().user_agent("berezka-chat/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Sends `prompt` as a single user turn and yields the text of each
    /// streamed event as it arrives. Empty events are skipped.
    pub async fn generate_stream(
        &self,
        prompt: &str,
    ) -> Result<impl Stream<Item = Result<String, ReplyError>> + Send + 'static, ReplyError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ReplyError::Status { status, body });
        }
        debug!(%status, model = %self.model, "Gemini stream opened");

        let mut bytes = response.bytes_stream();
        Ok(async_stream::stream! {
            let mut events = SseBuffer::default();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ReplyError::from(e));
                        return;
                    }
                };
                for data in events.push(&chunk) {
                    match parse_event(&data) {
                        Ok(Some(text)) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
            if let Some(data) = events.finish() {
                match parse_event(&data) {
                    Ok(Some(text)) => yield Ok(text),
                    Ok(None) => {}
                    Err(e) => yield Err(e),
                }
            }
        })
    }
}

fn parse_event(data: &str) -> Result<Option<String>, ReplyError> {
    let chunk: GenerateChunk = serde_json::from_str(data)?;
    if let Some(error) = chunk.error {
        return Err(ReplyError::Api(error.to_string()));
    }
    let text = chunk.text();
    Ok((!text.is_empty()).then_some(text))
}

/// Reassembles `data:` payloads from server-sent event bytes that may be
/// split at arbitrary points, including inside a UTF-8 sequence.
#[derive(Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some((end, sep_len)) = find_event_end(&self.pending) {
            let raw: Vec<u8> = self.pending.drain(..end + sep_len).take(end).collect();
            if let Some(data) = event_data(&String::from_utf8_lossy(&raw)) {
                out.push(data);
            }
        }
        out
    }

    /// Whatever is left once the body ends without a trailing blank line.
    fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        event_data(&String::from_utf8_lossy(&rest))
    }
}

fn find_event_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Joins the `data:` lines of one event; comments and other fields are ignored.
fn event_data(event: &str) -> Option<String> {
    let lines: Vec<&str> = event
        .lines()
        .filter_map(|line| line.trim_end_matches('\r').strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if lines.is_empty() {
        if !event.trim().is_empty() {
            debug!(event, "Ignoring SSE event without data");
        }
        return None;
    }
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_joins_parts() {
        let chunk: GenerateChunk = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"При"},{"text":"вет"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.text(), "Привет");
    }

    #[test]
    fn test_chunk_without_candidates_is_empty() {
        let chunk: GenerateChunk =
            serde_json::from_str(r#"{"usageMetadata":{"totalTokenCount":3}}"#).unwrap();
        assert_eq!(chunk.text(), "");
        assert_eq!(parse_event(r#"{"candidates":[]}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_event_error_object() {
        let result = parse_event(
            r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#,
        );
        match result {
            Err(ReplyError::Api(message)) => {
                assert_eq!(message, "503 UNAVAILABLE: The model is overloaded.")
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_event_rejects_garbage() {
        assert!(matches!(parse_event("not json"), Err(ReplyError::Malformed(_))));
    }

    #[test]
    fn test_sse_buffer_split_events() {
        let mut buf = SseBuffer::default();
        assert!(buf.push(b"data: {\"a\"").is_empty());
        let events = buf.push(b":1}\n\ndata: {\"b\":2}\r\n\r\n: keep-alive\n\n");
        assert_eq!(events, vec![r#"{"a":1}"#.to_string(), r#"{"b":2}"#.to_string()]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_sse_buffer_split_inside_utf8() {
        let payload = "data: {\"t\":\"ё\"}\n\n".as_bytes();
        // 'ё' is two bytes; cut between them.
        let cut = payload.iter().position(|&b| b >= 0x80).unwrap() + 1;
        let mut buf = SseBuffer::default();
        assert!(buf.push(&payload[..cut]).is_empty());
        assert_eq!(buf.push(&payload[cut..]), vec!["{\"t\":\"ё\"}".to_string()]);
    }

    #[test]
    fn test_sse_buffer_finish_without_trailing_blank_line() {
        let mut buf = SseBuffer::default();
        assert!(buf.push(b"data: {\"x\":1}").is_empty());
        assert_eq!(buf.finish(), Some("{\"x\":1}".to_string()));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("http://localhost:1234/", "k", "gemini-2.0-flash", None).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-2.0-flash:streamGenerateContent?alt=sse"
        );
    }
}
