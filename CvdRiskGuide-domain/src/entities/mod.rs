// Domain entities and value objects
pub mod assessment;
pub mod conversions;
pub mod patient;
pub mod therapy;

// Re-export common types for easier imports
pub use assessment::{
    ChartPoint, OutcomeSummary, ReportLines, RiskAssessment, RiskAssessmentRequest, RiskEstimate,
};
pub use patient::{LabPanel, PatientProfile, RiskFactors, Sex, VascularTerritories};
pub use therapy::{AdvancedTherapy, LdlProjection, LipidDrug, TherapyFlags, TherapySelection};
