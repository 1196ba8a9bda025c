use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Calculator endpoints
        crate::api::handlers::assessment::list_therapies,
        crate::api::handlers::assessment::project_ldl,
        crate::api::handlers::assessment::submit_assessment,
        crate::api::handlers::assessment::get_current_assessment,
        crate::api::handlers::assessment::reset_assessment,
        crate::api::handlers::assessment::export_assessment_csv
    ),
    components(
        schemas(
            // Entities
            crate::entities::assessment::AssessmentRequest,
            crate::entities::assessment::AssessmentResponse,
            crate::entities::assessment::PublicSex,
            crate::entities::assessment::PublicOutcome,
            crate::entities::assessment::PublicChartPoint,
            crate::entities::assessment::LdlProjectionRequest,
            crate::entities::assessment::LdlProjectionResponse,
            crate::entities::assessment::TherapyCatalogEntry,
            crate::entities::assessment::AdvancedTherapyEntry,
            crate::entities::assessment::TherapyCatalogResponse,
            crate::entities::common::ErrorResponse,

            // Domain enums used in requests
            cvd_risk_guide_domain::entities::therapy::LipidDrug,
            cvd_risk_guide_domain::entities::therapy::AdvancedTherapy,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "cvd", description = "Cardiovascular risk calculator endpoints")
    ),
    info(
        title = "CvdRiskGuide API",
        version = "0.1.0",
        description = "Cardiovascular risk estimates, LDL-C projection and CSV export",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
