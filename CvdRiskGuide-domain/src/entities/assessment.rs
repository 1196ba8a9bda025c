use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::patient::{LabPanel, PatientProfile, RiskFactors};
use super::therapy::{AdvancedTherapy, LdlProjection, TherapySelection};

/// Snapshot of the calculator form for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskAssessmentRequest {
    /// Patient demographics
    #[validate]
    pub profile: PatientProfile,

    /// Laboratory results
    #[validate]
    pub labs: LabPanel,

    /// Clinical risk factors
    #[validate]
    pub risk_factors: RiskFactors,

    /// Oral lipid-lowering therapy
    #[serde(default)]
    pub therapies: TherapySelection,

    /// Injectable therapies requested on top of oral therapy
    #[serde(default)]
    pub advanced_therapies: Vec<AdvancedTherapy>,
}

/// Estimated cardiovascular risk, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskEstimate {
    /// 5-year risk
    pub five_year: f64,

    /// 10-year risk
    pub ten_year: f64,

    /// Risk up to age 85; absent when the patient is 85 or older.
    /// Never below `ten_year`: with fewer than ten years left before 85
    /// the compounded figure is raised to the 10-year risk.
    pub lifetime: Option<f64>,
}

/// Benefit metrics derived from the 10-year and lifetime estimates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct OutcomeSummary {
    /// Absolute risk reduction (percentage points)
    pub arr: f64,

    /// Relative risk reduction (%)
    pub rrr: f64,

    /// Number needed to treat; absent when there is no measurable benefit
    pub nnt: Option<f64>,
}

/// One bar of the risk chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Human-readable result lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ReportLines {
    /// e.g. "5-year: 9.8%, 10-year: 18.6%, Lifetime: 40.2%"
    pub risk: String,

    /// ARR/RRR/NNT line, or the not-applicable message
    pub outcome: String,

    /// Projected LDL-C and drop
    pub ldl: String,

    /// BMI line
    pub bmi: String,
}

/// Full result of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskAssessment {
    /// Risk estimates
    pub estimate: RiskEstimate,

    /// ARR/RRR/NNT; absent when lifetime risk is not applicable
    pub outcome: Option<OutcomeSummary>,

    /// LDL-C projection under the selected oral therapy
    pub ldl: LdlProjection,

    /// Body mass index (kg/m²)
    pub bmi: f64,

    /// Whether injectable therapies may be added
    pub advanced_therapy_eligible: bool,

    /// Injectable therapies included in the plan
    pub advanced_therapies: Vec<AdvancedTherapy>,

    /// Bars for the risk chart
    pub chart: Vec<ChartPoint>,

    /// Formatted result text
    pub report: ReportLines,

    /// When the assessment was computed
    pub generated_at: DateTime<Utc>,
}
