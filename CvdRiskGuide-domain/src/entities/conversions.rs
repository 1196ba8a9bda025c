use cvd_risk_guide_data::models::session::{SaveSessionRequest, SessionSnapshot};

use crate::entities::assessment::{RiskAssessment, RiskAssessmentRequest};

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert a form snapshot and its result into a data-layer save request
pub fn convert_to_data_save_request(
    request: &RiskAssessmentRequest,
    assessment: &RiskAssessment,
) -> Result<SaveSessionRequest, serde_json::Error> {
    Ok(SaveSessionRequest {
        request: serde_json::to_value(request)?,
        assessment: serde_json::to_value(assessment)?,
    })
}

/// Convert a stored snapshot back into the domain assessment
pub fn convert_to_domain_assessment(snapshot: &SessionSnapshot) -> Result<RiskAssessment, serde_json::Error> {
    serde_json::from_value(snapshot.assessment.clone())
}
