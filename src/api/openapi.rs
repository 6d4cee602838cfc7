//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{analyze, error, health, response};
use crate::model;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Credence API",
        description = "Document acquisition and multi-task credibility analysis"
    ),
    paths(
        analyze::analyze_url,
        analyze::analyze_text,
        analyze::analyze_pdf,
        health::liveness,
        health::service_health,
    ),
    components(schemas(
        analyze::AnalyzeUrlRequest,
        analyze::AnalyzeTextRequest,
        response::AnalysisResponse,
        response::ResponseMetadata,
        response::RelevancyCheck,
        response::OrganizationCheck,
        error::ErrorResponse,
        health::HealthStatus,
        health::ServiceHealth,
        model::ScoreBase,
        model::ScorePolarity,
        model::ClaimResult,
        model::CitationResult,
        model::BiasResult,
        model::DateResult,
        model::EvidenceResult,
        model::UsefulnessResult,
        model::AuthorResult,
        model::SynthesisReport,
        model::Recommendation,
        model::CountedType,
        model::EvidenceItem,
        model::UsefulQuote,
        model::UsefulSection,
    )),
    tags(
        (name = "analysis", description = "Credibility analysis of URLs, text and uploads"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_analysis_routes() {
        let spec = ApiDoc::openapi();
        for path in ["/api/analyze/url", "/api/analyze/text", "/api/analyze/pdf", "/api/health"] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
