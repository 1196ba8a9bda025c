use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use chrono::Utc;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};
use async_trait::async_trait;

use crate::entities::assessment::{RiskAssessment, RiskAssessmentRequest};
use crate::entities::conversions;
use crate::entities::therapy::{LdlProjection, TherapySelection};
use crate::services::report::{self, ReportError};
use crate::services::risk::{self, RiskCalculationError};
use crate::services::therapy;
use cvd_risk_guide_data::repository::{RepositoryError, SessionRepository, SessionRepositoryTrait};

/// CVD risk service errors
#[derive(Debug, Error)]
pub enum CvdRiskServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Nothing has been submitted in this session
    #[error("Assessment not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// The risk model rejected its inputs
    #[error("Calculation error: {0}")]
    CalculationError(#[from] RiskCalculationError),

    /// The CSV export could not be produced
    #[error("Export error: {0}")]
    ExportError(#[from] ReportError),
}

/// Trait for CVD risk service operations
#[async_trait]
pub trait CvdRiskServiceTrait {
    /// Validate a form snapshot
    fn validate_request(&self, request: &RiskAssessmentRequest) -> Result<(), CvdRiskServiceError>;

    /// Validate and evaluate a form snapshot without touching the session
    fn assess(&self, request: &RiskAssessmentRequest) -> Result<RiskAssessment, CvdRiskServiceError>;

    /// Project LDL-C for a therapy selection
    fn project_ldl(&self, baseline: f64, therapies: &TherapySelection) -> Result<LdlProjection, CvdRiskServiceError>;

    /// Evaluate a form snapshot and make it the current session
    async fn submit_assessment(&self, request: RiskAssessmentRequest) -> Result<RiskAssessment, CvdRiskServiceError>;

    /// The assessment stored in the current session
    async fn current_assessment(&self) -> Result<RiskAssessment, CvdRiskServiceError>;

    /// CSV export of the current assessment
    async fn export_current_csv(&self) -> Result<String, CvdRiskServiceError>;

    /// Forget the current session. Returns whether anything was stored.
    async fn reset_session(&self) -> Result<bool, CvdRiskServiceError>;
}

/// Flatten nested validator errors into "field: message" pairs
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
        let mut fields: Vec<_> = errors.errors().iter().collect();
        fields.sort_by_key(|(field, _)| **field);

        for (field, kind) in fields {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };

            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|err| match &err.message {
                            Some(msg) => msg.to_string(),
                            None => format!("Invalid {}", field),
                        })
                        .collect();
                    out.push(format!("{}: {}", path, messages.join(", ")));
                }
                ValidationErrorsKind::Struct(nested) => collect(&path, nested, out),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        collect(&format!("{}[{}]", path, index), nested, out);
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    collect("", errors, &mut out);
    out.join("; ")
}

/// Lowest baseline LDL-C accepted by the projection, in mmol/L
pub const MIN_BASELINE_LDL: f64 = 0.5;
/// Highest baseline LDL-C accepted by the projection, in mmol/L
pub const MAX_BASELINE_LDL: f64 = 6.0;

/// Check a standalone LDL-C baseline against the form's LDL range
pub fn validate_ldl_baseline(baseline: f64) -> Result<(), CvdRiskServiceError> {
    if (MIN_BASELINE_LDL..=MAX_BASELINE_LDL).contains(&baseline) {
        Ok(())
    } else {
        Err(CvdRiskServiceError::ValidationError(format!(
            "ldl: LDL-C must be between {:.1} and {:.1} mmol/L",
            MIN_BASELINE_LDL, MAX_BASELINE_LDL
        )))
    }
}

/// Validate a form snapshot: field ranges plus the injectable-therapy gate
pub fn validate_assessment_request(request: &RiskAssessmentRequest) -> Result<(), CvdRiskServiceError> {
    if let Err(validation_errors) = request.validate() {
        return Err(CvdRiskServiceError::ValidationError(format_validation_errors(
            &validation_errors,
        )));
    }

    let mut seen = HashSet::new();
    if let Some(repeated) = request.advanced_therapies.iter().find(|t| !seen.insert(**t)) {
        return Err(CvdRiskServiceError::ValidationError(format!(
            "advanced_therapies: {} is listed more than once",
            repeated.label()
        )));
    }

    if !request.advanced_therapies.is_empty() {
        let projection = therapy::project_post_therapy_ldl(request.labs.ldl, &request.therapies);
        if !therapy::advanced_therapy_eligible(projection.projected) {
            let names: Vec<&str> = request.advanced_therapies.iter().map(|t| t.label()).collect();
            return Err(CvdRiskServiceError::ValidationError(format!(
                "advanced_therapies: {} require projected LDL-C above {:.1} mmol/L (projected {:.1})",
                names.join(", "),
                therapy::ADVANCED_THERAPY_THRESHOLD,
                projection.projected
            )));
        }
    }

    Ok(())
}

/// Evaluate one form snapshot.
///
/// Assumes the snapshot has been validated; only the risk model's own
/// domain errors are reported.
pub fn evaluate(request: &RiskAssessmentRequest) -> Result<RiskAssessment, RiskCalculationError> {
    let estimate = risk::estimate_risk(&request.profile, &request.labs, &request.risk_factors)?;
    let outcome = risk::summarize_outcome(estimate.ten_year, estimate.lifetime);
    let ldl = therapy::project_post_therapy_ldl(request.labs.ldl, &request.therapies);
    let bmi = request.profile.bmi();

    debug!(
        ten_year = estimate.ten_year,
        lifetime_applicable = estimate.lifetime.is_some(),
        projected_ldl = ldl.projected,
        "Assessment evaluated"
    );

    Ok(RiskAssessment {
        estimate,
        outcome,
        ldl,
        bmi,
        advanced_therapy_eligible: therapy::advanced_therapy_eligible(ldl.projected),
        advanced_therapies: request.advanced_therapies.clone(),
        chart: report::chart_series(&estimate),
        report: report::build_report(&estimate, outcome.as_ref(), &ldl, bmi),
        generated_at: Utc::now(),
    })
}

/// CVD risk service backed by a session repository
pub struct CvdRiskService<R: SessionRepositoryTrait> {
    repository: R,
}

impl<R: SessionRepositoryTrait> CvdRiskService<R> {
    /// Create a new CVD risk service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> CvdRiskServiceError {
        match err {
            RepositoryError::NotFound(msg) => CvdRiskServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => CvdRiskServiceError::ValidationError(msg),
            _ => CvdRiskServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: SessionRepositoryTrait + Send + Sync> CvdRiskServiceTrait for CvdRiskService<R> {
    fn validate_request(&self, request: &RiskAssessmentRequest) -> Result<(), CvdRiskServiceError> {
        validate_assessment_request(request)
    }

    #[instrument(skip(self, request))]
    fn assess(&self, request: &RiskAssessmentRequest) -> Result<RiskAssessment, CvdRiskServiceError> {
        if let Err(e) = self.validate_request(request) {
            warn!("Rejected assessment request: {}", e);
            return Err(e);
        }

        Ok(evaluate(request)?)
    }

    fn project_ldl(&self, baseline: f64, therapies: &TherapySelection) -> Result<LdlProjection, CvdRiskServiceError> {
        validate_ldl_baseline(baseline)?;
        Ok(therapy::project_post_therapy_ldl(baseline, therapies))
    }

    #[instrument(skip(self, request))]
    async fn submit_assessment(&self, request: RiskAssessmentRequest) -> Result<RiskAssessment, CvdRiskServiceError> {
        let assessment = self.assess(&request)?;

        let save_request = conversions::convert_to_data_save_request(&request, &assessment)
            .map_err(|e| CvdRiskServiceError::RepositoryError(e.to_string()))?;

        let snapshot = self.repository.save(save_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Session snapshot {} stored", snapshot.id);
        Ok(assessment)
    }

    async fn current_assessment(&self) -> Result<RiskAssessment, CvdRiskServiceError> {
        let snapshot = self.repository.get_current()
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| CvdRiskServiceError::NotFound(
                "No assessment has been submitted in this session".to_string(),
            ))?;

        conversions::convert_to_domain_assessment(&snapshot)
            .map_err(|e| CvdRiskServiceError::RepositoryError(e.to_string()))
    }

    async fn export_current_csv(&self) -> Result<String, CvdRiskServiceError> {
        let assessment = self.current_assessment().await?;
        Ok(report::export_csv(&assessment.estimate)?)
    }

    async fn reset_session(&self) -> Result<bool, CvdRiskServiceError> {
        self.repository.clear()
            .await
            .map_err(|e| self.map_repo_error(e))
    }
}

/// Create a default CVD risk service using the in-memory session repository
pub fn create_default_cvd_risk_service() -> impl CvdRiskServiceTrait + Send + Sync {
    CvdRiskService::new(SessionRepository::new())
}

/// Create a mock CVD risk service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_cvd_risk_service() -> impl CvdRiskServiceTrait + Send + Sync {
    crate::testing::MockCvdRiskService::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::{LabPanel, PatientProfile, RiskFactors, Sex, VascularTerritories};
    use crate::entities::therapy::{AdvancedTherapy, LipidDrug};
    use cvd_risk_guide_data::models::session::{SaveSessionRequest, SessionSnapshot};
    use cvd_risk_guide_data::repository::tests::MockSessionRepository;
    use mockall::mock;

    mock! {
        pub Repo {}

        #[async_trait]
        impl SessionRepositoryTrait for Repo {
            async fn save(&self, request: SaveSessionRequest) -> Result<SessionSnapshot, RepositoryError>;
            async fn get_current(&self) -> Result<Option<SessionSnapshot>, RepositoryError>;
            async fn clear(&self) -> Result<bool, RepositoryError>;
        }
    }

    fn create_test_request() -> RiskAssessmentRequest {
        RiskAssessmentRequest {
            profile: PatientProfile {
                age: 60,
                sex: Sex::Male,
                weight_kg: 75.0,
                height_cm: 170.0,
            },
            labs: LabPanel {
                total_cholesterol: 5.2,
                hdl: 1.3,
                ldl: 3.0,
                crp: 2.5,
                hba1c: 7.0,
                triglycerides: 1.2,
                systolic_bp: 140,
            },
            risk_factors: RiskFactors {
                smoker: false,
                diabetes: false,
                vascular: VascularTerritories::default(),
                egfr: 90,
            },
            therapies: TherapySelection::new().with_newly_started(LipidDrug::AtorvastatinHigh),
            advanced_therapies: Vec::new(),
        }
    }

    #[test]
    fn test_assess_reference_patient() {
        let service = CvdRiskService::new(MockSessionRepository::new());
        let assessment = service.assess(&create_test_request()).unwrap();

        assert_eq!(format!("{:.1}", assessment.estimate.ten_year), "18.6");
        assert_eq!(format!("{:.1}", assessment.estimate.five_year), "9.8");
        assert_eq!(format!("{:.1}", assessment.estimate.lifetime.unwrap()), "40.2");
        assert!((assessment.ldl.projected - 1.5).abs() < 1e-9);
        assert!(!assessment.advanced_therapy_eligible);
        assert!(assessment.outcome.is_some());
        assert_eq!(assessment.chart.len(), 3);
        assert_eq!(assessment.report.risk, "5-year: 9.8%, 10-year: 18.6%, Lifetime: 40.2%");
        assert_eq!(assessment.report.bmi, "BMI: 26.0 kg/m²");
    }

    #[test]
    fn test_assess_is_repeatable() {
        let service = CvdRiskService::new(MockSessionRepository::new());
        let first = service.assess(&create_test_request()).unwrap();
        let second = service.assess(&create_test_request()).unwrap();

        assert_eq!(first.estimate, second.estimate);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.ldl, second.ldl);
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_assess_elderly_patient_has_no_outcome() {
        let mut request = create_test_request();
        request.profile.age = 86;

        let service = CvdRiskService::new(MockSessionRepository::new());
        let assessment = service.assess(&request).unwrap();

        assert_eq!(assessment.estimate.lifetime, None);
        assert_eq!(assessment.outcome, None);
        assert_eq!(assessment.chart.len(), 2);
        assert_eq!(assessment.report.outcome, report::OUTCOME_NOT_APPLICABLE);
    }

    #[test]
    fn test_validate_rejects_out_of_range_fields() {
        let mut request = create_test_request();
        request.profile.age = 25;
        request.labs.hdl = 4.0;

        let service = CvdRiskService::new(MockSessionRepository::new());
        let err = service.validate_request(&request).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("profile.age"), "unexpected message: {}", message);
        assert!(message.contains("labs.hdl"), "unexpected message: {}", message);
        assert!(message.contains("Age must be between 30 and 90"));
    }

    #[test]
    fn test_advanced_therapy_requires_high_projected_ldl() {
        let mut request = create_test_request();
        request.advanced_therapies = vec![AdvancedTherapy::Pcsk9Inhibitor];

        // Atorvastatin 40 mg takes 3.0 down to 1.5, below the 1.8 gate
        let service = CvdRiskService::new(MockSessionRepository::new());
        let err = service.assess(&request).unwrap_err();
        assert!(matches!(err, CvdRiskServiceError::ValidationError(_)));
        assert!(err.to_string().contains("PCSK9 inhibitor"));

        request.therapies = TherapySelection::new();
        let assessment = service.assess(&request).unwrap();
        assert!(assessment.advanced_therapy_eligible);
        assert_eq!(assessment.advanced_therapies, vec![AdvancedTherapy::Pcsk9Inhibitor]);
    }

    #[test]
    fn test_project_ldl_bounds() {
        let service = CvdRiskService::new(MockSessionRepository::new());
        let selection = TherapySelection::new().with_pre_admission(LipidDrug::AtorvastatinHigh);

        let projection = service.project_ldl(3.0, &selection).unwrap();
        assert!((projection.projected - 1.5).abs() < 1e-9);

        assert!(service.project_ldl(0.2, &selection).is_err());
        assert!(service.project_ldl(7.0, &selection).is_err());
    }

    #[test]
    fn test_validate_ldl_baseline_edges() {
        assert!(validate_ldl_baseline(MIN_BASELINE_LDL).is_ok());
        assert!(validate_ldl_baseline(MAX_BASELINE_LDL).is_ok());

        let err = validate_ldl_baseline(6.1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: ldl: LDL-C must be between 0.5 and 6.0 mmol/L"
        );
        assert!(validate_ldl_baseline(f64::NAN).is_err());
    }

    #[test]
    fn test_duplicate_advanced_therapies_are_rejected() {
        let mut request = create_test_request();
        request.therapies = TherapySelection::new();
        request.advanced_therapies = vec![AdvancedTherapy::Inclisiran, AdvancedTherapy::Inclisiran];

        let service = CvdRiskService::new(MockSessionRepository::new());
        let err = service.assess(&request).unwrap_err();
        assert!(matches!(err, CvdRiskServiceError::ValidationError(_)));
        assert!(err.to_string().contains("Inclisiran is listed more than once"));

        request.advanced_therapies = vec![AdvancedTherapy::Inclisiran, AdvancedTherapy::Pcsk9Inhibitor];
        let assessment = service.assess(&request).unwrap();
        assert_eq!(assessment.advanced_therapies.len(), 2);
    }

    #[tokio::test]
    async fn test_current_assessment_reads_existing_snapshot() {
        let request = create_test_request();
        let stored = evaluate(&request).unwrap();
        let save_request = conversions::convert_to_data_save_request(&request, &stored).unwrap();
        let snapshot = SessionSnapshot {
            id: "existing".to_string(),
            request: save_request.request,
            assessment: save_request.assessment,
            updated_at: stored.generated_at.to_rfc3339(),
        };

        let service = CvdRiskService::new(MockSessionRepository::with_snapshot(snapshot));
        let current = service.current_assessment().await.unwrap();
        assert_eq!(current.report, stored.report);
        assert_eq!(current.generated_at, stored.generated_at);

        let csv = service.export_current_csv().await.unwrap();
        assert_eq!(csv, "Metric,Value\n5yr,9.8\n10yr,18.6\nLifetime,40.2\n");
    }

    #[tokio::test]
    async fn test_submit_then_read_back() {
        let service = CvdRiskService::new(MockSessionRepository::new());

        let submitted = service.submit_assessment(create_test_request()).await.unwrap();
        let current = service.current_assessment().await.unwrap();
        assert_eq!(submitted.report, current.report);
        assert_eq!(submitted.advanced_therapies, current.advanced_therapies);
        assert_eq!(submitted.generated_at, current.generated_at);

        let csv = service.export_current_csv().await.unwrap();
        assert_eq!(csv, "Metric,Value\n5yr,9.8\n10yr,18.6\nLifetime,40.2\n");

        assert!(service.reset_session().await.unwrap());
        let err = service.current_assessment().await.unwrap_err();
        assert!(matches!(err, CvdRiskServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_stored() {
        let mut repo = MockRepo::new();
        repo.expect_save().never();

        let mut request = create_test_request();
        request.labs.crp = 50.0;

        let service = CvdRiskService::new(repo);
        let err = service.submit_assessment(request).await.unwrap_err();
        assert!(matches!(err, CvdRiskServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_repository_failure_is_mapped() {
        let mut repo = MockRepo::new();
        repo.expect_save()
            .times(1)
            .returning(|_| Err(RepositoryError::Lock("poisoned".to_string())));

        let service = CvdRiskService::new(repo);
        let err = service.submit_assessment(create_test_request()).await.unwrap_err();
        assert!(matches!(err, CvdRiskServiceError::RepositoryError(_)));
    }

    #[tokio::test]
    async fn test_export_without_session_is_not_found() {
        let mut repo = MockRepo::new();
        repo.expect_get_current().returning(|| Ok(None));

        let service = CvdRiskService::new(repo);
        let err = service.export_current_csv().await.unwrap_err();
        assert!(matches!(err, CvdRiskServiceError::NotFound(_)));
    }

    #[test]
    fn test_evaluate_rejects_out_of_domain_crp() {
        let mut request = create_test_request();
        request.labs.crp = -2.0;

        let result = evaluate(&request);
        assert!(matches!(result, Err(RiskCalculationError::InvalidLabValue(_))));
    }

    #[test]
    fn test_default_service_assesses() {
        let service = create_default_cvd_risk_service();
        let result = tokio_test::block_on(service.submit_assessment(create_test_request()));
        assert!(result.is_ok());
    }
}
