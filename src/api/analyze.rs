//! REST API endpoints for credibility analysis

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::response::AnalysisResponse;
use crate::service::{CredibilityService, LlmClient};

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Largest accepted JSON body; raw text is capped later by the acquisition layer
const MAX_JSON_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeUrlRequest {
    /// http(s) URL of the document
    pub url: String,
    /// What the caller intends to use the document for
    #[serde(default)]
    pub purpose: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeTextRequest {
    /// Document text, at least 100 characters
    pub text: String,
    #[serde(default)]
    pub purpose: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    /// Original file name; `.txt` and `.md` are read as text
    pub filename: Option<String>,
    pub purpose: Option<String>,
}

/// Analyze the document at a URL
#[utoipa::path(
    post,
    path = "/api/analyze/url",
    request_body = AnalyzeUrlRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResponse),
        (status = 400, description = "Invalid URL", body = ErrorResponse),
        (status = 422, description = "Document could not be acquired", body = ErrorResponse),
        (status = 502, description = "An analysis task failed", body = ErrorResponse),
        (status = 503, description = "Reasoning service not configured", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze/url")]
pub async fn analyze_url(
    service: web::Data<CredibilityService<LlmClient>>,
    request: web::Json<AnalyzeUrlRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = service
        .analyze_from_url(&request.url, request.purpose.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::from(outcome)))
}

/// Analyze text supplied directly
#[utoipa::path(
    post,
    path = "/api/analyze/text",
    request_body = AnalyzeTextRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResponse),
        (status = 400, description = "Text too short", body = ErrorResponse),
        (status = 502, description = "An analysis task failed", body = ErrorResponse),
        (status = 503, description = "Reasoning service not configured", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze/text")]
pub async fn analyze_text(
    service: web::Data<CredibilityService<LlmClient>>,
    request: web::Json<AnalyzeTextRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = service
        .analyze_from_text(&request.text, request.purpose.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::from(outcome)))
}

/// Analyze an uploaded PDF or text file sent as the raw request body
#[utoipa::path(
    post,
    path = "/api/analyze/pdf",
    params(UploadParams),
    request_body(content = Vec<u8>, description = "Raw file bytes", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResponse),
        (status = 400, description = "Empty upload", body = ErrorResponse),
        (status = 422, description = "No text could be extracted", body = ErrorResponse),
        (status = 502, description = "An analysis task failed", body = ErrorResponse),
        (status = 503, description = "Reasoning service not configured", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/api/analyze/pdf")]
pub async fn analyze_pdf(
    service: web::Data<CredibilityService<LlmClient>>,
    query: web::Query<UploadParams>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    tracing::debug!(
        filename = ?params.filename,
        bytes = body.len(),
        "Received upload"
    );

    let outcome = service
        .analyze_from_binary(
            body.to_vec(),
            params.filename.as_deref().unwrap_or_default(),
            params.purpose.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::from(outcome)))
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(analyze_url)
    .service(analyze_text)
    .service(analyze_pdf);
}
