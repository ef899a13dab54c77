use axum::{extract::State, Json};
use docmind_graph::TurnInput;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::ApiResult,
    handlers::request::ChatbotRequest,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatbotResponse {
    pub answer: String,
}

/// Answer a question in one response
#[utoipa::path(
    post,
    path = "/chatbot",
    request_body = ChatbotRequest,
    responses(
        (status = 200, description = "Generated answer", body = ChatbotResponse),
        (status = 400, description = "Missing or invalid question", body = crate::error::ErrorBody),
        (status = 500, description = "Turn failed", body = crate::error::ErrorBody)
    ),
    tag = "chatbot"
)]
pub async fn chatbot(
    State(state): State<Arc<AppState>>,
    req: ChatbotRequest,
) -> ApiResult<Json<ChatbotResponse>> {
    let thread_id = req
        .thread_id
        .unwrap_or_else(|| state.default_thread_id().to_string());

    let output = state.graph.invoke(TurnInput::new(thread_id, req.question)).await?;

    tracing::debug!(
        thread_id = %output.thread_id,
        language = %output.language,
        documents = output.documents.len(),
        summarized = output.summarized,
        "Chatbot turn answered"
    );

    Ok(Json(ChatbotResponse {
        answer: output.answer,
    }))
}
