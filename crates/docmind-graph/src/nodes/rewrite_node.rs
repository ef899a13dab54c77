use crate::json::parse_first_object;
use crate::node::{EventSender, Node};
use crate::prompts;
use crate::types::{GraphConfig, RewrittenQuestion, Stage, StreamEvent, TurnState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use docmind_llm::{ChatClient, ChatRequest, Message};
use serde_json::Value;
use std::sync::Arc;

/// Translates and normalizes the question with the utility model
pub struct RewriteNode {
    client: Arc<dyn ChatClient>,
    config: Arc<GraphConfig>,
}

impl RewriteNode {
    pub fn new(client: Arc<dyn ChatClient>, config: Arc<GraphConfig>) -> Self {
        Self { client, config }
    }

    /// Ask the model for `{language, question}`; returns the parsed result and raw output
    pub async fn rewrite(&self, question: &str) -> Result<(RewrittenQuestion, String)> {
        let llm = &self.config.utility_llm;
        let request = ChatRequest::new(
            llm.model.clone(),
            vec![Message::human(prompts::rewrite_question_prompt(&self.config, question))],
        )
        .with_options(llm.chat_options());

        let response = self
            .client
            .chat(request)
            .await
            .context("Question rewrite failed")?;
        let raw = response.text_or_empty().to_string();

        let rewritten = parse_rewritten_question(&raw, question, &self.config.fallback_language);
        Ok((rewritten, raw))
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Interpret rewrite output; total over any input
///
/// Field-wise fallback: `language` falls back to `fallback_language`, `question`
/// to the raw output verbatim, or to `original` when the output is blank.
pub fn parse_rewritten_question(raw: &str, original: &str, fallback_language: &str) -> RewrittenQuestion {
    let raw_fallback = if raw.trim().is_empty() {
        original.to_string()
    } else {
        raw.to_string()
    };

    let Some(object) = parse_first_object(raw) else {
        tracing::error!(raw_output = %raw, "Failed to parse rewritten question, using fallback");
        return RewrittenQuestion {
            language: fallback_language.to_string(),
            question: raw_fallback,
        };
    };

    let language = non_blank(object.get("language")).unwrap_or_else(|| {
        tracing::error!(raw_output = %raw, "Rewritten question has no usable language");
        fallback_language.to_string()
    });
    let question = non_blank(object.get("question")).unwrap_or_else(|| {
        tracing::error!(raw_output = %raw, "Rewritten question has no usable question");
        raw_fallback
    });

    RewrittenQuestion { language, question }
}

#[async_trait]
impl Node for RewriteNode {
    async fn execute(&self, state: &mut TurnState, event_tx: EventSender) -> Result<()> {
        let (rewritten, raw) = self.rewrite(&state.question).await?;

        event_tx
            .send(StreamEvent::Message {
                stage: Stage::RewriteQuestion,
                content: raw,
            })
            .await?;

        tracing::debug!(
            run_id = %state.run_id,
            language = %rewritten.language,
            question = %rewritten.question,
            "question rewritten"
        );
        state.rewritten = Some(rewritten);
        Ok(())
    }

    fn stage(&self) -> Stage {
        Stage::RewriteQuestion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> RewrittenQuestion {
        parse_rewritten_question(raw, "original?", "en")
    }

    #[test]
    fn test_well_formed_output() {
        let r = parse(r#"{"language": "es", "question": "What is Laredo?"}"#);
        assert_eq!(r.language, "es");
        assert_eq!(r.question, "What is Laredo?");
    }

    #[test]
    fn test_output_wrapped_in_prose() {
        let r = parse("Sure! ```json\n{\"language\": \"ja\", \"question\": \"How do I upload?\"}\n```");
        assert_eq!(r.language, "ja");
        assert_eq!(r.question, "How do I upload?");
    }

    #[test]
    fn test_malformed_output_falls_back_to_raw() {
        let raw = "I think the question is about models";
        let r = parse(raw);
        assert_eq!(r.language, "en");
        assert_eq!(r.question, raw);
    }

    #[test]
    fn test_missing_and_non_string_fields() {
        let raw = r#"{"language": 42}"#;
        let r = parse(raw);
        assert_eq!(r.language, "en");
        assert_eq!(r.question, raw);

        let r = parse(r#"{"question": "  ", "language": " fr "}"#);
        assert_eq!(r.language, "fr");
        assert_eq!(r.question, r#"{"question": "  ", "language": " fr "}"#);
    }

    #[test]
    fn test_blank_output_uses_original_question() {
        let r = parse("   ");
        assert_eq!(r.language, "en");
        assert_eq!(r.question, "original?");
    }

    #[test]
    fn test_total_over_odd_inputs() {
        for raw in ["{", "}", "{}", "{\"a\":", "null", "[1,2]", "{\"question\": null}"] {
            let r = parse(raw);
            assert!(!r.language.is_empty());
            assert!(!r.question.is_empty());
        }
    }
}
