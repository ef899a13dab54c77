use serde::{Deserialize, Serialize};
use std::fmt;

/// Named document pool a snippet was retrieved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// Product documentation shipped with the application
    Local,
    /// Pages crawled from the product website
    Web,
}

impl Pool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::Local => "local",
            Pool::Web => "web",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub pool: Pool,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Retrieved documentation snippet. Read-only once produced by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(pool: Pool, source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            metadata: DocumentMetadata {
                pool,
                source: source.into(),
                title: None,
                url: None,
            },
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.metadata.url = Some(url.into());
        self
    }

    pub fn pool(&self) -> Pool {
        self.metadata.pool
    }

    /// Join snippet contents into one prompt context block
    pub fn join_contents(documents: &[Document]) -> String {
        documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = Document::new(Pool::Web, "https://example.com/docs", "Install the app")
            .with_id("w1")
            .with_title("Install")
            .with_url("https://example.com/docs");

        assert_eq!(doc.id, "w1");
        assert_eq!(doc.pool(), Pool::Web);
        assert_eq!(doc.metadata.title.as_deref(), Some("Install"));
    }

    #[test]
    fn test_pool_serialization() {
        assert_eq!(serde_json::to_string(&Pool::Local).unwrap(), "\"local\"");
        assert_eq!(Pool::Web.to_string(), "web");
    }

    #[test]
    fn test_join_contents() {
        let docs = vec![
            Document::new(Pool::Local, "a.md", "first"),
            Document::new(Pool::Web, "b", "second"),
        ];
        assert_eq!(Document::join_contents(&docs), "first\n\nsecond");
        assert_eq!(Document::join_contents(&[]), "");
    }
}
