use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers::{self, request::ChatbotRequest};
use crate::routes::{self, chatbot::ChatbotResponse, health::HelloResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::chatbot::chatbot,
        handlers::stream::chatbot_stream,
        routes::health::hello,
    ),
    components(schemas(ChatbotRequest, ChatbotResponse, HelloResponse, ErrorBody)),
    tags(
        (name = "chatbot", description = "Documentation assistant"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
