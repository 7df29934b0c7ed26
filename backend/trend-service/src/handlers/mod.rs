pub mod trends;

pub use trends::get_trends;

use actix_web::{get, HttpResponse};

/// GET /health
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "trend-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
