use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;

pub const INVALID_QUESTION: &str = "A valid 'question' (string) is required";
pub const INVALID_THREAD_ID: &str = "'thread_id' must be a string";

/// Body accepted by both chatbot endpoints
///
/// Validated by hand rather than through `Json<ChatbotRequest>` so every
/// malformed body maps to the same 400 payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatbotRequest {
    #[schema(example = "What is a Random Forest Classifier?")]
    pub question: String,
    /// Conversation to continue; the configured default thread when absent
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl ChatbotRequest {
    pub fn from_value(body: Value) -> Result<Self, ApiError> {
        let question = match body.get("question") {
            Some(Value::String(q)) => q.clone(),
            _ => return Err(ApiError::BadRequest(INVALID_QUESTION.to_string())),
        };

        let thread_id = match body.get("thread_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => return Err(ApiError::BadRequest(INVALID_THREAD_ID.to_string())),
        };

        Ok(Self {
            question,
            thread_id,
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for ChatbotRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected chatbot body");
            ApiError::BadRequest(INVALID_QUESTION.to_string())
        })?;

        Self::from_value(body)
    }
}
