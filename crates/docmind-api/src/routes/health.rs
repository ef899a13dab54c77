use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    pub mensaje: String,
    pub version: String,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/hello",
    responses(
        (status = 200, description = "Service is up", body = HelloResponse)
    ),
    tag = "health"
)]
pub async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        mensaje: "Hello, I'm working".to_string(),
        version: "1.0".to_string(),
    })
}
