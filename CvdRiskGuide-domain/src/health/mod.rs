//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use async_trait::async_trait;
use tracing::warn;

use crate::entities::patient::{LabPanel, PatientProfile, RiskFactors, Sex, VascularTerritories};
use crate::services::risk::{self, RISK_CAP};
use cvd_risk_guide_data::repository::{SessionRepository, SessionRepositoryTrait};

/// Component name of the risk model self-check
pub const CALCULATOR_COMPONENT: &str = "calculator";

/// Component name of the session store
pub const SESSION_STORE_COMPONENT: &str = "session_store";

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build a system health report; the worst component decides the overall status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Run the risk model on a reference patient
    /// Returns true if the result is within the expected band, false if it drifted
    /// Returns an error if the model could not produce a result
    async fn check_calculator_status(&self) -> Result<bool, String>;

    /// Check that the session store can be read
    async fn check_session_store_status(&self) -> Result<bool, String>;
}

/// Run the risk model on a fixed reference patient.
///
/// The reference patient (60-year-old man, SBP 140, TC 5.2, HDL 1.3,
/// CRP 2.5, eGFR 90) scores about 18.6 % at ten years.
///
/// Returns:
/// - Ok(true) if the estimate is finite and close to the reference value
/// - Ok(false) if the estimate is finite but outside the expected band
/// - Err if the model rejected its inputs
pub fn check_calculator_status() -> Result<bool, String> {
    let profile = PatientProfile {
        age: 60,
        sex: Sex::Male,
        weight_kg: 75.0,
        height_cm: 170.0,
    };
    let labs = LabPanel {
        total_cholesterol: 5.2,
        hdl: 1.3,
        ldl: 3.0,
        crp: 2.5,
        hba1c: 5.5,
        triglycerides: 1.2,
        systolic_bp: 140,
    };
    let factors = RiskFactors {
        smoker: false,
        diabetes: false,
        vascular: VascularTerritories::default(),
        egfr: 90,
    };

    let estimate = risk::estimate_risk(&profile, &labs, &factors).map_err(|e| e.to_string())?;

    let in_range = (0.0..=RISK_CAP).contains(&estimate.ten_year)
        && (0.0..=RISK_CAP).contains(&estimate.five_year);
    let matches_reference = (estimate.ten_year - 18.6).abs() < 0.1;

    Ok(in_range && matches_reference)
}

/// Health service backed by the session repository
#[derive(Debug)]
pub struct HealthService<R: SessionRepositoryTrait> {
    repository: R,
}

impl<R: SessionRepositoryTrait> HealthService<R> {
    /// Create a new health service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> HealthServiceTrait for HealthService<R>
where
    R: SessionRepositoryTrait + Send + Sync + std::fmt::Debug,
{
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        let calculator = match self.check_calculator_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Reference estimate is outside the expected band".to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };
        components.insert(CALCULATOR_COMPONENT.to_string(), calculator);

        let session_store = match self.check_session_store_status().await {
            Ok(_) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };
        components.insert(SESSION_STORE_COMPONENT.to_string(), session_store);

        let health = SystemHealth::from_components(components);
        if health.status != SystemStatus::Healthy {
            warn!("System health is {:?}", health.status);
        }
        health
    }

    async fn check_calculator_status(&self) -> Result<bool, String> {
        check_calculator_status()
    }

    async fn check_session_store_status(&self) -> Result<bool, String> {
        self.repository
            .get_current()
            .await
            .map(|_| true)
            .map_err(|e| format!("Session store error: {}", e))
    }
}

/// Create a health service over the default in-memory session repository
pub fn create_default_health_service() -> impl HealthServiceTrait {
    HealthService::new(SessionRepository::new())
}
