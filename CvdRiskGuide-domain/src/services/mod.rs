pub mod risk;
pub mod therapy;
pub mod report;
pub mod assessment;

// Domain services
// Pure calculations live in risk/therapy/report; assessment ties them to the session.

// Re-export service traits and factory functions
pub use assessment::{CvdRiskServiceError, CvdRiskServiceTrait, create_default_cvd_risk_service};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use assessment::create_mock_cvd_risk_service;
