use actix_web::HttpResponse;
use serde_json::json;

/// Liveness check, unauthenticated
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
