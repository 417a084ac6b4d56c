use actix_web::HttpResponse;
use tracing::instrument;

use crate::common::RequestId;

#[instrument]
pub async fn get_app_health() -> HttpResponse {
    tracing::info!("GET /health");
    HttpResponse::Ok()
        .content_type("application/json")
        .body("healthy")
}

/// Echoes the caller's request id, read through the typed extractor.
pub async fn get_request_id(request_id: RequestId) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(request_id.0)
}
