use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;

/// Incremental output of a streaming chat completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Text token(s) from the model
    Message {
        content: String,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    pub fn is_done(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .is_some()
    }

    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Parse one SSE line into stream events.
///
/// Returns `None` for lines that carry no data (comments, keep-alives, blanks) and
/// `Some(Err)` for data lines that fail to decode. `[DONE]` yields a bare `Done`.
pub(crate) fn parse_sse_line(line: &str) -> Option<Result<Vec<StreamEvent>>> {
    let line = line.trim();
    let data = line.strip_prefix("data:")?.trim_start();

    if data == "[DONE]" {
        return Some(Ok(vec![StreamEvent::Done { finish_reason: None }]));
    }

    Some(
        serde_json::from_str::<ChatStreamChunk>(data)
            .map(|chunk| chunk.to_stream_events())
            .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e)),
    )
}

/// Turn a `text/event-stream` chat completion response into a stream of events
pub fn parse_chat_sse_stream(
    response: Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>> {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);

        'outer: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        let Ok(line_str) = std::str::from_utf8(&line_bytes) else {
                            continue;
                        };

                        match parse_sse_line(line_str) {
                            Some(Ok(events)) => {
                                let finished = events.iter().any(|e| matches!(e, StreamEvent::Done { finish_reason: None }));
                                for event in events {
                                    yield Ok(event);
                                }
                                if finished {
                                    break 'outer;
                                }
                            }
                            Some(Err(e)) => yield Err(e),
                            None => {}
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_line() {
        let line = r#"data: {"id":"c1","model":"m","choices":[{"index":0,"delta":{"content":"Hel"},"finish_reason":null}]}"#;
        let events = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(events, vec![StreamEvent::Message { content: "Hel".to_string() }]);
    }

    #[test]
    fn test_parse_finish_line() {
        let line = r#"data: {"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        let events = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(
            events,
            vec![StreamEvent::Done { finish_reason: Some("stop".to_string()) }]
        );
    }

    #[test]
    fn test_parse_done_marker() {
        let events = parse_sse_line("data: [DONE]\n").unwrap().unwrap();
        assert_eq!(events, vec![StreamEvent::Done { finish_reason: None }]);
    }

    #[test]
    fn test_non_data_lines_are_skipped() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: ping").is_none());
    }

    #[test]
    fn test_empty_delta_yields_nothing() {
        let line = r#"data: {"choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":null}]}"#;
        let events = parse_sse_line(line).unwrap().unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_malformed_chunk_is_an_error() {
        assert!(parse_sse_line("data: {not json").unwrap().is_err());
    }
}
