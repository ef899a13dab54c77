use crate::node::{EventSender, Node};
use crate::prompts;
use crate::streaming::{StageStreamAdapter, StreamAdapter};
use crate::types::{DeliveryMode, GraphConfig, Stage, StreamEvent, TurnState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use docmind_llm::{ChatClient, ChatRequest, Message};
use docmind_persist::ThreadMessage;
use docmind_retrieval::Document;
use futures::StreamExt;
use std::sync::Arc;

/// Generates the answer from retrieved context, summary and recent history
pub struct AnswerNode {
    client: Arc<dyn ChatClient>,
    config: Arc<GraphConfig>,
}

impl AnswerNode {
    pub fn new(client: Arc<dyn ChatClient>, config: Arc<GraphConfig>) -> Self {
        Self { client, config }
    }

    /// Assemble the generator prompt
    ///
    /// Order: answer instructions with context, summary (if any), recent history
    /// (if any), then the question itself as the user turn.
    pub fn build_messages(
        &self,
        question: &str,
        language: &str,
        local: &[Document],
        web: &[Document],
        summary: &str,
        history: &[ThreadMessage],
    ) -> Vec<Message> {
        let context: Vec<Document> = local.iter().chain(web.iter()).cloned().collect();
        let context = Document::join_contents(&context);

        let mut messages = vec![Message::system(prompts::answer_prompt(
            &self.config,
            &context,
            question,
            language,
        ))];

        if !summary.is_empty() {
            messages.push(Message::system(prompts::summary_prompt(summary)));
        }
        if !history.is_empty() {
            messages.push(Message::system(prompts::recent_messages_prompt(history)));
        }

        messages.push(Message::human(question));
        messages
    }

    fn request(&self, messages: Vec<Message>) -> ChatRequest {
        let llm = &self.config.answer_llm;
        ChatRequest::new(llm.model.clone(), messages).with_options(llm.chat_options())
    }

    async fn generate_buffered(&self, request: ChatRequest, event_tx: &EventSender) -> Result<String> {
        let response = self
            .client
            .chat(request)
            .await
            .context("Answer generation failed")?;
        let answer = response.text_or_empty().to_string();

        event_tx
            .send(StreamEvent::Message {
                stage: Stage::GenerateAnswer,
                content: answer.clone(),
            })
            .await?;
        event_tx
            .send(StreamEvent::Done {
                stage: Stage::GenerateAnswer,
                finish_reason: response.finish_reason,
            })
            .await?;

        Ok(answer)
    }

    async fn generate_streamed(&self, request: ChatRequest, event_tx: &EventSender) -> Result<String> {
        let mut stream = self
            .client
            .chat_stream(request)
            .await
            .context("Answer generation failed")?;

        let adapter = StageStreamAdapter::new(Stage::GenerateAnswer);
        let mut answer = String::new();

        while let Some(event_result) = stream.next().await {
            let llm_event = event_result.context("Answer stream failed")?;

            if let docmind_llm::StreamEvent::Message { content } = &llm_event {
                answer.push_str(content);
            }

            if let Some(graph_event) = adapter.adapt(llm_event) {
                // A closed channel means the consumer went away; dropping the
                // generator stream on return cancels the request.
                event_tx.send(graph_event).await?;
            }
        }

        Ok(answer)
    }
}

#[async_trait]
impl Node for AnswerNode {
    async fn execute(&self, state: &mut TurnState, event_tx: EventSender) -> Result<()> {
        let question = state.effective_question().to_string();
        let language = state.language(&self.config.fallback_language);

        let messages = self.build_messages(
            &question,
            &language,
            &state.local_context,
            &state.web_context,
            &state.summary,
            &state.messages,
        );
        let request = self.request(messages);

        let answer = match state.delivery {
            DeliveryMode::Buffered => self.generate_buffered(request, &event_tx).await?,
            DeliveryMode::Streamed => self.generate_streamed(request, &event_tx).await?,
        };

        state.add_message(ThreadMessage::user(question));
        state.add_message(ThreadMessage::assistant(answer.clone()));
        state.answer = Some(answer);
        state.documents = state
            .local_context
            .iter()
            .chain(state.web_context.iter())
            .cloned()
            .collect();

        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::GenerateAnswer
    }
}
