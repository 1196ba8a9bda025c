pub mod handlers;
pub mod routes;

use axum::Router;

use crate::config::AppConfig;

/// Create the application router
pub fn create_application(config: &AppConfig) -> Router {
    routes::create_app(config)
}
