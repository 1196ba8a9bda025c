use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use cvd_risk_guide_domain::services::CvdRiskServiceError;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create an error response for inputs outside the risk model's domain
    pub fn invalid_lab_value(message: &str) -> Self {
        Self {
            error: "invalid_lab_value".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    /// HTTP status for this error code
    pub fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "invalid_lab_value" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CvdRiskServiceError> for ErrorResponse {
    fn from(err: CvdRiskServiceError) -> Self {
        match err {
            CvdRiskServiceError::ValidationError(message) => {
                let details: Vec<serde_json::Value> = message
                    .split("; ")
                    .map(|field| serde_json::Value::String(field.to_string()))
                    .collect();
                Self::validation_error(
                    "The assessment request is invalid",
                    Some(serde_json::Value::Array(details)),
                )
            }
            CvdRiskServiceError::NotFound(_) => Self::not_found("assessment"),
            CvdRiskServiceError::CalculationError(e) => Self::invalid_lab_value(&e.to_string()),
            CvdRiskServiceError::RepositoryError(_) | CvdRiskServiceError::ExportError(_) => {
                error!("Unexpected service error: {}", err);
                Self::internal_error()
            }
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvd_risk_guide_domain::services::risk::RiskCalculationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorResponse::not_found("assessment").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorResponse::validation_error("bad", None).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorResponse::invalid_lab_value("crp").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorResponse::internal_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details_are_split_per_field() {
        let err = CvdRiskServiceError::ValidationError(
            "labs.hdl: HDL must be between 0.5 and 3.0 mmol/L; profile.age: Age must be between 30 and 90 years"
                .to_string(),
        );
        let response = ErrorResponse::from(err);

        assert_eq!(response.error, "validation_error");
        let details = response.details.unwrap();
        assert_eq!(details.as_array().map(|d| d.len()), Some(2));
    }

    #[test]
    fn test_calculation_error_maps_to_invalid_lab_value() {
        let err = CvdRiskServiceError::CalculationError(RiskCalculationError::InvalidLabValue(
            "crp".to_string(),
        ));
        let response = ErrorResponse::from(err);
        assert_eq!(response.error, "invalid_lab_value");
    }

    #[test]
    fn test_repository_error_is_hidden() {
        let response = ErrorResponse::from(CvdRiskServiceError::RepositoryError("lock".to_string()));
        assert_eq!(response.error, "internal_error");
        assert!(!response.message.contains("lock"));
    }
}
