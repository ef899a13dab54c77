use config::{Config as ConfigLoader, ConfigError, Environment, File};
use docmind_graph::{GraphConfig, LLMConfig};
use docmind_llm::OpenAIConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub llm_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single HTTP request, streaming included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 20000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible endpoint; unset means api.openai.com
    #[serde(default)]
    pub base_url: Option<String>,
    pub answer_model: String,
    pub answer_temperature: f32,
    pub answer_max_tokens: u32,
    pub utility_model: String,
    pub utility_temperature: f32,
    pub utility_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let answer = LLMConfig::answer();
        let utility = LLMConfig::utility();
        Self {
            base_url: Some("https://generativelanguage.googleapis.com/v1beta/openai".to_string()),
            answer_model: answer.model,
            answer_temperature: answer.temperature.unwrap_or(0.2),
            answer_max_tokens: answer.max_tokens.unwrap_or(2048),
            utility_model: utility.model,
            utility_temperature: utility.temperature.unwrap_or(0.0),
            utility_max_tokens: utility.max_tokens.unwrap_or(1024),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotConfig {
    pub summarization_threshold: usize,
    pub local_k: usize,
    pub web_k: usize,
    pub fallback_language: String,
    /// Thread used when a request does not name one
    pub default_thread_id: String,
    pub product_name: String,
    pub assistant_name: String,
    pub retrieval_timeout_secs: u64,
    pub execution_timeout_secs: u64,
    pub stream_buffer: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        let graph = GraphConfig::default();
        Self {
            summarization_threshold: graph.summarization_threshold,
            local_k: graph.local_k,
            web_k: graph.web_k,
            fallback_language: graph.fallback_language,
            default_thread_id: "1".to_string(),
            product_name: graph.product_name,
            assistant_name: graph.assistant_name,
            retrieval_timeout_secs: graph.retrieval_timeout.as_secs(),
            execution_timeout_secs: graph.execution_timeout.as_secs(),
            stream_buffer: graph.channel_capacity,
        }
    }
}

/// JSON document files seeding each pool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub local_files: Vec<PathBuf>,
    #[serde(default)]
    pub web_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    pub backend: CheckpointBackend,
    pub dir: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::Memory,
            dir: PathBuf::from("data/threads"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed DOCMIND_, sections split by `__`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything, e.g. DOCMIND_SERVER__PORT
            .add_source(
                Environment::with_prefix("DOCMIND")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .with_list_parse_key("retrieval.local_files")
                    .with_list_parse_key("retrieval.web_files")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets come from ENV only
        cfg.llm_api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                ConfigError::Message(
                    "LLM_API_KEY or OPENAI_API_KEY environment variable is required".to_string(),
                )
            })?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn openai_config(&self) -> OpenAIConfig {
        let config = OpenAIConfig::new(self.llm_api_key.clone());
        match &self.llm.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        }
    }

    pub fn graph_config(&self) -> GraphConfig {
        let chatbot = &self.chatbot;
        GraphConfig::new()
            .with_summarization_threshold(chatbot.summarization_threshold)
            .with_top_k(chatbot.local_k, chatbot.web_k)
            .with_fallback_language(chatbot.fallback_language.clone())
            .with_names(chatbot.product_name.clone(), chatbot.assistant_name.clone())
            .with_retrieval_timeout(Duration::from_secs(chatbot.retrieval_timeout_secs))
            .with_timeout(Duration::from_secs(chatbot.execution_timeout_secs))
            .with_channel_capacity(chatbot.stream_buffer)
            .with_answer_llm(
                LLMConfig::new(self.llm.answer_model.clone())
                    .with_temperature(self.llm.answer_temperature)
                    .with_max_tokens(self.llm.answer_max_tokens),
            )
            .with_utility_llm(
                LLMConfig::new(self.llm.utility_model.clone())
                    .with_temperature(self.llm.utility_temperature)
                    .with_max_tokens(self.llm.utility_max_tokens),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [cors]
            enabled = true
            origins = ["http://localhost:3000"]

            [llm]
            answer_model = "gpt-4o"
            answer_temperature = 0.3
            answer_max_tokens = 4096
            utility_model = "gpt-4o-mini"
            utility_temperature = 0.0
            utility_max_tokens = 512

            [chatbot]
            summarization_threshold = 8
            local_k = 4
            web_k = 2
            fallback_language = "es"
            default_thread_id = "main"
            product_name = "Laredo"
            assistant_name = "LaredocMind"
            retrieval_timeout_secs = 5
            execution_timeout_secs = 60
            stream_buffer = 64

            [retrieval]
            local_files = ["data/local.json"]

            [checkpoint]
            backend = "file"
            dir = "/var/lib/docmind"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.chatbot.default_thread_id, "main");
        assert_eq!(config.retrieval.local_files, vec![PathBuf::from("data/local.json")]);
        assert!(config.retrieval.web_files.is_empty());
        assert_eq!(config.checkpoint.backend, CheckpointBackend::File);

        let graph = config.graph_config();
        assert_eq!(graph.summarization_threshold, 8);
        assert_eq!((graph.local_k, graph.web_k), (4, 2));
        assert_eq!(graph.execution_timeout, Duration::from_secs(60));
        assert_eq!(graph.answer_llm.model, "gpt-4o");
        assert_eq!(graph.utility_llm.max_tokens, Some(512));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[server]\nhost = \"localhost\"\nport = 8080\n").unwrap();
        assert_eq!(config.chatbot.summarization_threshold, 6);
        assert_eq!(config.chatbot.default_thread_id, "1");
        assert_eq!(config.checkpoint.backend, CheckpointBackend::Memory);
        assert_eq!(
            config.openai_config().base_url.as_deref(),
            Some("https://generativelanguage.googleapis.com/v1beta/openai")
        );
    }
}
