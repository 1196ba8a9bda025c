// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use cvd_risk_guide_data::repository::tests::MockSessionRepository;

use std::collections::HashMap;
use std::sync::RwLock;
use async_trait::async_trait;

use crate::entities::assessment::{RiskAssessment, RiskAssessmentRequest};
use crate::entities::therapy::{LdlProjection, TherapySelection};
use crate::health::{
    ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus,
    CALCULATOR_COMPONENT, SESSION_STORE_COMPONENT,
};
use crate::services::assessment::{self, CvdRiskServiceError, CvdRiskServiceTrait};
use crate::services::{report, therapy};

/// Mock implementation of the CvdRiskServiceTrait for testing
///
/// Calculations are real; the session lives in the mock and failures can be injected.
pub struct MockCvdRiskService {
    current: RwLock<Option<RiskAssessment>>,
    should_fail_validation: bool,
    should_fail_storage: bool,
}

impl Default for MockCvdRiskService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCvdRiskService {
    /// Create a new mock CVD risk service with an empty session
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            should_fail_validation: false,
            should_fail_storage: false,
        }
    }

    /// Configure the mock to fail validation
    pub fn with_validation_failure(mut self) -> Self {
        self.should_fail_validation = true;
        self
    }

    /// Configure the mock to fail every session operation
    pub fn with_storage_failure(mut self) -> Self {
        self.should_fail_storage = true;
        self
    }

    /// Start with a pre-computed assessment in the session
    pub fn with_assessment(self, assessment: RiskAssessment) -> Self {
        if let Ok(mut current) = self.current.write() {
            *current = Some(assessment);
        }
        self
    }

    fn storage_check(&self) -> Result<(), CvdRiskServiceError> {
        if self.should_fail_storage {
            Err(CvdRiskServiceError::RepositoryError(
                "Repository error - mock is configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn lock_error<T>(_: T) -> CvdRiskServiceError {
        CvdRiskServiceError::RepositoryError("Mock session lock poisoned".to_string())
    }
}

#[async_trait]
impl CvdRiskServiceTrait for MockCvdRiskService {
    fn validate_request(&self, request: &RiskAssessmentRequest) -> Result<(), CvdRiskServiceError> {
        if self.should_fail_validation {
            return Err(CvdRiskServiceError::ValidationError(
                "Validation failed - mock is configured to fail validation".to_string(),
            ));
        }
        assessment::validate_assessment_request(request)
    }

    fn assess(&self, request: &RiskAssessmentRequest) -> Result<RiskAssessment, CvdRiskServiceError> {
        self.validate_request(request)?;
        Ok(assessment::evaluate(request)?)
    }

    fn project_ldl(&self, baseline: f64, therapies: &TherapySelection) -> Result<LdlProjection, CvdRiskServiceError> {
        assessment::validate_ldl_baseline(baseline)?;
        Ok(therapy::project_post_therapy_ldl(baseline, therapies))
    }

    async fn submit_assessment(&self, request: RiskAssessmentRequest) -> Result<RiskAssessment, CvdRiskServiceError> {
        let result = self.assess(&request)?;
        self.storage_check()?;

        let mut current = self.current.write().map_err(Self::lock_error)?;
        *current = Some(result.clone());
        Ok(result)
    }

    async fn current_assessment(&self) -> Result<RiskAssessment, CvdRiskServiceError> {
        self.storage_check()?;

        let current = self.current.read().map_err(Self::lock_error)?;
        current.clone().ok_or_else(|| {
            CvdRiskServiceError::NotFound("No assessment has been submitted in this session".to_string())
        })
    }

    async fn export_current_csv(&self) -> Result<String, CvdRiskServiceError> {
        let assessment = self.current_assessment().await?;
        Ok(report::export_csv(&assessment.estimate)?)
    }

    async fn reset_session(&self) -> Result<bool, CvdRiskServiceError> {
        self.storage_check()?;

        let mut current = self.current.write().map_err(Self::lock_error)?;
        Ok(current.take().is_some())
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Session store component status
    session_store_status: ComponentStatus,
    /// System status
    system_status: SystemStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            session_store_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with an unhealthy session store
    pub fn with_unhealthy_session_store(mut self) -> Self {
        self.session_store_status = ComponentStatus::Unhealthy;
        self
    }

    /// Set the overall system status
    pub fn with_system_status(mut self, status: SystemStatus) -> Self {
        self.system_status = status;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            SESSION_STORE_COMPONENT.to_string(),
            HealthComponent {
                status: self.session_store_status.clone(),
                details: match self.session_store_status {
                    ComponentStatus::Healthy => None,
                    _ => Some("Session store unavailable".to_string()),
                },
            },
        );

        components.insert(
            CALCULATOR_COMPONENT.to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }

    async fn check_calculator_status(&self) -> Result<bool, String> {
        Ok(true)
    }

    async fn check_session_store_status(&self) -> Result<bool, String> {
        match self.session_store_status {
            ComponentStatus::Unhealthy => Err("Session store unavailable".to_string()),
            _ => Ok(true),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
