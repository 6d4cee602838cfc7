//! Health check endpoints

use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{CredibilityService, LlmClient};

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceHealth {
    pub status: String,
    pub version: String,
    /// Whether a reasoning credential was found at startup
    pub reasoning_configured: bool,
}

/// Liveness probe endpoint
///
/// Always returns 200 OK if the service is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Service health, including reasoning configuration
///
/// Stays 200 when the credential is missing so clients can show a setup hint.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = ServiceHealth)
    ),
    tag = "health"
)]
#[get("/api/health")]
pub async fn service_health(service: web::Data<CredibilityService<LlmClient>>) -> impl Responder {
    let reasoning_configured = service.is_configured();
    if !reasoning_configured {
        tracing::debug!("Health check: reasoning credential missing");
    }

    HttpResponse::Ok().json(ServiceHealth {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        reasoning_configured,
    })
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(service_health);
}
