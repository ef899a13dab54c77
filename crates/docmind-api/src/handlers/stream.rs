use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use docmind_graph::TurnInput;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;

use crate::{handlers::request::ChatbotRequest, state::AppState};

/// Answer a question, streaming the answer token by token
///
/// Each unit is `data: <token>\n\n<END_OF_CHUNK>`. A failure mid-turn ends the
/// body without an error payload; validation errors are answered with 400
/// before anything is streamed.
#[utoipa::path(
    post,
    path = "/chatbot/stream",
    request_body = ChatbotRequest,
    responses(
        (status = 200, description = "Streaming answer", content_type = "text/event-stream", body = String),
        (status = 400, description = "Missing or invalid question", body = crate::error::ErrorBody)
    ),
    tag = "chatbot"
)]
pub async fn chatbot_stream(
    State(state): State<Arc<AppState>>,
    req: ChatbotRequest,
) -> Response {
    let thread_id = req
        .thread_id
        .unwrap_or_else(|| state.default_thread_id().to_string());

    tracing::info!(thread_id = %thread_id, "Streaming chatbot turn");

    let chunks = state
        .graph
        .stream(TurnInput::new(thread_id, req.question))
        .map(Ok::<_, Infallible>);

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(chunks),
    )
        .into_response()
}
