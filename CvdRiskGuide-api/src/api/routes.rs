use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    routing::post,
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use std::sync::Arc;

use cvd_risk_guide_data::repository::SessionRepository;
use cvd_risk_guide_domain::health::{HealthService, HealthServiceTrait};
use cvd_risk_guide_domain::services::assessment::CvdRiskService as DefaultCvdRiskService;

use crate::api::handlers::{assessment, health};
use crate::api::handlers::assessment::CvdRiskService;
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

/// Create the application router
///
/// The risk service and the health check share one session store.
pub fn create_app(config: &AppConfig) -> Router {
    let repository = SessionRepository::new();

    let cvd_service: CvdRiskService = Arc::new(DefaultCvdRiskService::new(repository.clone()));
    let health_service: Arc<dyn HealthServiceTrait + Send + Sync> =
        Arc::new(HealthService::new(repository));

    create_app_with_services(config, cvd_service, health_service)
}

/// Create the application router around the given services
pub fn create_app_with_services(
    config: &AppConfig,
    cvd_service: CvdRiskService,
    health_service: Arc<dyn HealthServiceTrait + Send + Sync>,
) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/cvd/therapies", get(assessment::list_therapies))
        .route("/cvd/ldl-projection", post(assessment::project_ldl))
        // Define specific routes before the bare resource
        .route("/cvd/assessment/export", get(assessment::export_assessment_csv))
        .route(
            "/cvd/assessment",
            get(assessment::get_current_assessment)
                .post(assessment::submit_assessment)
                .delete(assessment::reset_assessment),
        )
        .with_state(cvd_service);

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service))
        .layer(Extension(Arc::new(config.clone())));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes);

    let app = if config.enable_swagger {
        debug!("Swagger UI merged");
        add_swagger_ui(app)
    } else {
        debug!("Swagger UI disabled");
        app
    };

    let app = configure_security(app).layer(TraceLayer::new_for_http());

    // Initialize health check service startup time
    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    // Get Swagger UI routes
    let swagger = configure_swagger_routes();

    // Merge Swagger UI with the app router
    app.merge(swagger)
}

/// Apply CORS and security headers
pub fn configure_security(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    app.layer(security_headers).layer(cors)
}
