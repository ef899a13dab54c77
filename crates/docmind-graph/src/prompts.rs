//! Prompt templates for every generator call a turn makes.
//!
//! Placeholders are written `{name}` and filled in a single pass, so substituted
//! values (user questions, retrieved documents) are never re-scanned.

use crate::types::GraphConfig;
use docmind_persist::{MessageRole, ThreadMessage};

pub const ANSWER_PROMPT: &str = "\
You are {assistant}, an expert chatbot specialized in the {product} application.
You have full access to the official documentation and knowledge base of {product}.

Guidelines:
- Always format your response using Markdown (headings, bullet points, numbered lists, code blocks, etc. where appropriate).
- Respond in the specified language: {language}.
- Maintain a warm, professional, respectful and empathetic tone at all times.

User question:
{question}

Instructions:
1. Respond directly to the user's question without mentioning the context, the question itself, or that you are answering.
2. Use your own knowledge only if it is directly and clearly related to the topic.

Relevant context:
{context}
";

pub const SUMMARY_PROMPT: &str = "\
You are assisting in an ongoing conversation.

Conversation summary:
<summary>{summary}</summary>

Instructions:
1. Use the summary to understand the general context if helpful, but it is not mandatory.
2. Respond consistently with the prior conversation flow without repeating unnecessary details.
3. If the user introduces a new topic, address it clearly and independently.
";

pub const RECENT_MESSAGES_PROMPT: &str = "\
Recent conversation history:
<messages>{messages}</messages>

Instructions for responding:
1. If the user asks for clarification or more details, use the recent history to infer the topic, \
referring to the last relevant message if unsure.
2. If the user introduces a new topic, address it independently of the history.
3. Keep the flow, tone and style consistent with the previous conversation.
";

pub const SUMMARIZATION_PROMPT: &str = "\
You maintain an up-to-date conversation summary for a language model.

Current summary:
<summary>{summary}</summary>

New messages:
<messages>{messages}</messages>

Update instructions:
1. Integrate new topics, details and shifts in the conversation into the summary.
2. Remove redundancy; keep the summary concise yet complete.
3. Optimize for processing by a language model over human readability.

Only output the updated summary text, without preamble or formatting.
";

pub const SUMMARIZE_INSTRUCTION: &str = "Summarize the conversation.";

pub const REWRITE_QUESTION_PROMPT: &str = "\
You are an expert assistant optimizing questions for technical documentation search.

Your tasks:
1. Detect the language of the user's question. If uncertain, assume English ('{fallback_language}').
2. If the question is not in English, translate it into English without interpreting it.
3. If '{product}' is mentioned, it refers to a software application, not a place.
4. Return only a valid JSON object with two fields:
   - 'language': detected language code (e.g. 'en', 'es', 'ja').
   - 'question': the translated and optimized English question.

Rules:
- Translate exactly as written. Do not ask for clarification.
- Do not add interpretation, examples or questions.
- Output only the JSON object. No extra text, markdown or explanations.

User question:
<question>{question}</question>
";

/// Fill `{name}` placeholders from `vars`; unknown placeholders are left as is
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render history as `role: content` lines
pub fn format_history(messages: &[ThreadMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::System => "system",
            };
            format!("{}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn answer_prompt(config: &GraphConfig, context: &str, question: &str, language: &str) -> String {
    render(
        ANSWER_PROMPT,
        &[
            ("assistant", config.assistant_name.as_str()),
            ("product", config.product_name.as_str()),
            ("language", language),
            ("question", question),
            ("context", context),
        ],
    )
}

pub fn summary_prompt(summary: &str) -> String {
    render(SUMMARY_PROMPT, &[("summary", summary)])
}

pub fn recent_messages_prompt(history: &[ThreadMessage]) -> String {
    let messages = format_history(history);
    render(RECENT_MESSAGES_PROMPT, &[("messages", messages.as_str())])
}

pub fn summarization_prompt(summary: &str, history: &[ThreadMessage]) -> String {
    let messages = format_history(history);
    render(
        SUMMARIZATION_PROMPT,
        &[("summary", summary), ("messages", messages.as_str())],
    )
}

pub fn rewrite_question_prompt(config: &GraphConfig, question: &str) -> String {
    render(
        REWRITE_QUESTION_PROMPT,
        &[
            ("fallback_language", config.fallback_language.as_str()),
            ("product", config.product_name.as_str()),
            ("question", question),
        ],
    )
}
