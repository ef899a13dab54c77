//! Adapters between generator events and turn events, and the demultiplexer that
//! turns a turn's event channel into framed answer chunks.

use crate::types::{Stage, StreamEvent};
use futures::Stream;
use tokio::sync::mpsc;

/// Terminates every framed chunk
pub const CHUNK_DELIMITER: &str = "<END_OF_CHUNK>";

/// Stream adapter trait for converting between event formats
///
/// Returns `None` from [`StreamAdapter::adapt`] for events that should be dropped.
pub trait StreamAdapter {
    type ProviderEvent;
    type GraphEvent;

    fn adapt(&self, event: Self::ProviderEvent) -> Option<Self::GraphEvent>;
}

/// Tags generator events with the stage that requested them
pub struct StageStreamAdapter {
    stage: Stage,
}

impl StageStreamAdapter {
    pub fn new(stage: Stage) -> Self {
        Self { stage }
    }
}

impl StreamAdapter for StageStreamAdapter {
    type ProviderEvent = docmind_llm::StreamEvent;
    type GraphEvent = StreamEvent;

    fn adapt(&self, event: Self::ProviderEvent) -> Option<Self::GraphEvent> {
        match event {
            docmind_llm::StreamEvent::Message { content } if content.is_empty() => None,
            docmind_llm::StreamEvent::Message { content } => Some(StreamEvent::Message {
                stage: self.stage,
                content,
            }),
            docmind_llm::StreamEvent::Done { finish_reason } => Some(StreamEvent::Done {
                stage: self.stage,
                finish_reason,
            }),
        }
    }
}

/// Frame one chunk for the wire
pub fn format_chunk(content: &str) -> String {
    format!("data: {}\n\n{}", content, CHUNK_DELIMITER)
}

/// Reduce a turn's events to framed answer chunks
///
/// Only non-empty `Message` events of [`Stage::GenerateAnswer`] pass. The stream
/// ends when the turn ends, errors, or closes the channel. Dropping the returned
/// stream drops the receiver, which aborts the turn on its next send.
pub fn demultiplex(mut rx: mpsc::Receiver<StreamEvent>) -> impl Stream<Item = String> + Send + 'static {
    async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Message { stage: Stage::GenerateAnswer, content } => {
                    if !content.is_empty() {
                        yield format_chunk(&content);
                    }
                }
                StreamEvent::Error { message, stage } => {
                    tracing::error!(stage = ?stage, error = %message, "Turn failed mid-stream");
                    break;
                }
                StreamEvent::EndStream { .. } => break,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_adapter_tags_stage() {
        let adapter = StageStreamAdapter::new(Stage::GenerateAnswer);
        let event = adapter
            .adapt(docmind_llm::StreamEvent::Message {
                content: "Hello".to_string(),
            })
            .unwrap();

        match event {
            StreamEvent::Message { stage, content } => {
                assert_eq!(stage, Stage::GenerateAnswer);
                assert_eq!(content, "Hello");
            }
            _ => panic!("Expected Message event"),
        }
    }

    #[test]
    fn test_adapter_drops_empty_tokens() {
        let adapter = StageStreamAdapter::new(Stage::GenerateAnswer);
        assert!(adapter
            .adapt(docmind_llm::StreamEvent::Message {
                content: String::new()
            })
            .is_none());
    }

    #[test]
    fn test_format_chunk() {
        assert_eq!(format_chunk("Hi"), "data: Hi\n\n<END_OF_CHUNK>");
    }

    #[tokio::test]
    async fn test_demultiplex_filters_by_stage() {
        let (tx, rx) = mpsc::channel(16);
        let events = vec![
            StreamEvent::NodeStarted { stage: Stage::RewriteQuestion },
            StreamEvent::Message { stage: Stage::RewriteQuestion, content: "{\"language\":\"en\"}".to_string() },
            StreamEvent::Message { stage: Stage::GenerateAnswer, content: "A".to_string() },
            StreamEvent::Message { stage: Stage::GenerateAnswer, content: String::new() },
            StreamEvent::Message { stage: Stage::SummarizeConversation, content: "sum".to_string() },
            StreamEvent::Message { stage: Stage::GenerateAnswer, content: "B".to_string() },
            StreamEvent::EndStream { status: "success".to_string(), total_duration_ms: 1 },
            StreamEvent::Message { stage: Stage::GenerateAnswer, content: "late".to_string() },
        ];
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let chunks: Vec<String> = demultiplex(rx).collect().await;
        assert_eq!(chunks, vec![format_chunk("A"), format_chunk("B")]);
    }

    #[tokio::test]
    async fn test_demultiplex_stops_on_error() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(StreamEvent::Message { stage: Stage::GenerateAnswer, content: "partial".to_string() })
            .await
            .unwrap();
        tx.send(StreamEvent::Error { message: "boom".to_string(), stage: Some(Stage::GenerateAnswer) })
            .await
            .unwrap();
        drop(tx);

        let chunks: Vec<String> = demultiplex(rx).collect().await;
        assert_eq!(chunks, vec![format_chunk("partial")]);
    }

    #[tokio::test]
    async fn test_demultiplex_ends_on_channel_close() {
        let (tx, rx) = mpsc::channel::<StreamEvent>(1);
        drop(tx);
        let chunks: Vec<String> = demultiplex(rx).collect().await;
        assert!(chunks.is_empty());
    }
}
