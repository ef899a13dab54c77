use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the answer stage consumes the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// One completed response
    Buffered,
    /// Incremental tokens forwarded as they arrive
    Streamed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Answer model defaults
    pub fn answer() -> Self {
        Self::new("gemini-2.0-flash")
            .with_temperature(0.2)
            .with_max_tokens(2048)
    }

    /// Cheaper model used for rewriting and summarization
    pub fn utility() -> Self {
        Self::new("gemini-2.0-flash-lite")
            .with_temperature(0.0)
            .with_max_tokens(1024)
    }

    pub(crate) fn chat_options(&self) -> docmind_llm::ChatOptions {
        let mut options = docmind_llm::ChatOptions::new();
        if let Some(temp) = self.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        options
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::answer()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// History length above which the conversation is summarized
    pub summarization_threshold: usize,
    pub local_k: usize,
    pub web_k: usize,
    pub fallback_language: String,
    pub product_name: String,
    pub assistant_name: String,
    /// Per-query bound on each context store search
    pub retrieval_timeout: Duration,
    /// Bound on a whole turn
    pub execution_timeout: Duration,
    /// Capacity of the event channel between a turn and its consumer
    pub channel_capacity: usize,
    pub answer_llm: LLMConfig,
    pub utility_llm: LLMConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            summarization_threshold: 6,
            local_k: 3,
            web_k: 1,
            fallback_language: "en".to_string(),
            product_name: "Laredo".to_string(),
            assistant_name: "LaredocMind".to_string(),
            retrieval_timeout: Duration::from_secs(10),
            execution_timeout: Duration::from_secs(120),
            channel_capacity: 1000,
            answer_llm: LLMConfig::answer(),
            utility_llm: LLMConfig::utility(),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summarization_threshold(mut self, threshold: usize) -> Self {
        self.summarization_threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, local_k: usize, web_k: usize) -> Self {
        self.local_k = local_k;
        self.web_k = web_k;
        self
    }

    pub fn with_fallback_language(mut self, language: impl Into<String>) -> Self {
        self.fallback_language = language.into();
        self
    }

    pub fn with_names(mut self, product: impl Into<String>, assistant: impl Into<String>) -> Self {
        self.product_name = product.into();
        self.assistant_name = assistant.into();
        self
    }

    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_answer_llm(mut self, llm: LLMConfig) -> Self {
        self.answer_llm = llm;
        self
    }

    pub fn with_utility_llm(mut self, llm: LLMConfig) -> Self {
        self.utility_llm = llm;
        self
    }
}
