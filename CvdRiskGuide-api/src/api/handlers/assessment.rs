use std::sync::Arc;
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, instrument, warn};

// Import domain services
use cvd_risk_guide_domain::services::{report, CvdRiskServiceError, CvdRiskServiceTrait};

// Import our entities
use crate::entities::assessment::{
    AssessmentRequest, AssessmentResponse, LdlProjectionRequest, LdlProjectionResponse,
    TherapyCatalogResponse,
};
use crate::entities::common::ErrorResponse;
use crate::entities::conversions::{
    convert_to_domain_request, convert_to_domain_selection, convert_to_public_assessment,
    convert_to_public_projection, public_therapy_catalog,
};

/// Service type for dependency injection
pub type CvdRiskService = Arc<dyn CvdRiskServiceTrait + Send + Sync>;

fn log_and_convert(err: CvdRiskServiceError) -> Response {
    match &err {
        CvdRiskServiceError::ValidationError(msg) => warn!("Invalid assessment data: {}", msg),
        CvdRiskServiceError::CalculationError(e) => warn!("Risk model rejected inputs: {}", e),
        CvdRiskServiceError::NotFound(msg) => info!("{}", msg),
        _ => {}
    }
    ErrorResponse::from(err).into_response()
}

/// List the lipid-lowering therapy catalog
#[utoipa::path(
    get,
    path = "/api/v1/cvd/therapies",
    responses(
        (status = 200, description = "Therapy catalog", body = TherapyCatalogResponse),
    ),
    tag = "cvd"
)]
#[instrument]
pub async fn list_therapies() -> Json<TherapyCatalogResponse> {
    Json(public_therapy_catalog())
}

/// Project LDL-C under the selected oral therapy
#[utoipa::path(
    post,
    path = "/api/v1/cvd/ldl-projection",
    request_body = LdlProjectionRequest,
    responses(
        (status = 200, description = "Projected LDL-C", body = LdlProjectionResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    tag = "cvd"
)]
#[instrument(skip(service, request))]
pub async fn project_ldl(
    State(service): State<CvdRiskService>,
    Json(request): Json<LdlProjectionRequest>,
) -> Result<Json<LdlProjectionResponse>, Response> {
    let selection = convert_to_domain_selection(&request);

    service
        .project_ldl(request.ldl, &selection)
        .map(|projection| Json(convert_to_public_projection(projection)))
        .map_err(log_and_convert)
}

/// Evaluate the form and make it the current session
#[utoipa::path(
    post,
    path = "/api/v1/cvd/assessment",
    request_body = AssessmentRequest,
    responses(
        (status = 200, description = "Assessment computed", body = AssessmentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Inputs outside the risk model's domain", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "cvd"
)]
#[instrument(skip(service, request))]
pub async fn submit_assessment(
    State(service): State<CvdRiskService>,
    Json(request): Json<AssessmentRequest>,
) -> Result<impl IntoResponse, Response> {
    info!("Submitting CVD risk assessment");

    let domain_request = convert_to_domain_request(request);

    match service.submit_assessment(domain_request).await {
        Ok(assessment) => {
            info!(
                ten_year = assessment.estimate.ten_year,
                "CVD risk assessment computed"
            );
            Ok((StatusCode::OK, Json(convert_to_public_assessment(assessment))))
        }
        Err(e) => Err(log_and_convert(e)),
    }
}

/// Get the assessment of the current session
#[utoipa::path(
    get,
    path = "/api/v1/cvd/assessment",
    responses(
        (status = 200, description = "Current assessment", body = AssessmentResponse),
        (status = 404, description = "Nothing submitted yet", body = ErrorResponse),
    ),
    tag = "cvd"
)]
#[instrument(skip(service))]
pub async fn get_current_assessment(
    State(service): State<CvdRiskService>,
) -> Result<Json<AssessmentResponse>, Response> {
    service
        .current_assessment()
        .await
        .map(|assessment| Json(convert_to_public_assessment(assessment)))
        .map_err(log_and_convert)
}

/// Forget the current session
#[utoipa::path(
    delete,
    path = "/api/v1/cvd/assessment",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "cvd"
)]
#[instrument(skip(service))]
pub async fn reset_assessment(
    State(service): State<CvdRiskService>,
) -> Result<StatusCode, Response> {
    let removed = service.reset_session().await.map_err(log_and_convert)?;
    info!(removed, "Session reset");
    Ok(StatusCode::NO_CONTENT)
}

/// Download the current assessment as CSV
#[utoipa::path(
    get,
    path = "/api/v1/cvd/assessment/export",
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 404, description = "Nothing submitted yet", body = ErrorResponse),
    ),
    tag = "cvd"
)]
#[instrument(skip(service))]
pub async fn export_assessment_csv(
    State(service): State<CvdRiskService>,
) -> Result<impl IntoResponse, Response> {
    let csv = service.export_current_csv().await.map_err(log_and_convert)?;
    let disposition = format!("attachment; filename=\"{}\"", report::EXPORT_FILENAME);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
