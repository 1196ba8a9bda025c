use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use utoipa::ToSchema;

use cvd_risk_guide_domain::entities::therapy::{AdvancedTherapy, LipidDrug};

/// Biological sex as submitted by the form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PublicSex {
    Male,
    Female,
}

/// Calculator form submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentRequest {
    /// Age in years (30-90)
    #[schema(example = 60)]
    pub age: u32,

    /// Biological sex
    pub sex: PublicSex,

    /// Weight in kg (40-200)
    #[schema(example = 75.0)]
    pub weight_kg: f64,

    /// Height in cm (140-210)
    #[schema(example = 170.0)]
    pub height_cm: f64,

    /// Total cholesterol in mmol/L (2.0-10.0)
    #[schema(example = 5.2)]
    pub total_cholesterol: f64,

    /// HDL-C in mmol/L (0.5-3.0)
    #[schema(example = 1.3)]
    pub hdl: f64,

    /// LDL-C in mmol/L (0.5-6.0)
    #[schema(example = 3.0)]
    pub ldl: f64,

    /// hs-CRP in mg/L (0.1-20.0)
    #[schema(example = 2.5)]
    pub crp: f64,

    /// HbA1c in % (4.0-14.0)
    #[schema(example = 5.8)]
    pub hba1c: f64,

    /// Triglycerides in mmol/L (0.3-5.0)
    #[schema(example = 1.2)]
    pub triglycerides: f64,

    /// Systolic blood pressure in mmHg (80-220)
    #[schema(example = 140)]
    pub systolic_bp: u32,

    /// eGFR in mL/min/1.73 m² (15-120)
    #[schema(example = 90)]
    pub egfr: u32,

    /// Current smoker
    #[serde(default)]
    pub smoker: bool,

    /// Diabetes
    #[serde(default)]
    pub diabetes: bool,

    /// Coronary artery disease
    #[serde(default)]
    pub coronary: bool,

    /// Cerebrovascular disease
    #[serde(default)]
    pub cerebrovascular: bool,

    /// Peripheral artery disease
    #[serde(default)]
    pub peripheral: bool,

    /// Drugs taken before admission
    #[serde(default)]
    pub pre_admission: Vec<LipidDrug>,

    /// Drugs started or intensified now
    #[serde(default)]
    pub newly_started: Vec<LipidDrug>,

    /// Injectable therapies requested on top of oral therapy
    #[serde(default)]
    pub advanced_therapies: Vec<AdvancedTherapy>,
}

/// One bar of the risk chart
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicChartPoint {
    /// "5-year", "10-year" or "Lifetime"
    pub label: String,
    /// Risk in percent
    pub value: f64,
}

/// Benefit metrics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicOutcome {
    /// Absolute risk reduction in percentage points
    pub arr: f64,
    /// Relative risk reduction in percent
    pub rrr: f64,
    /// Number needed to treat, absent when there is no measurable benefit
    pub nnt: Option<f64>,
}

/// Calculator result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentResponse {
    /// 5-year risk in percent
    pub five_year_risk: f64,

    /// 10-year risk in percent
    pub ten_year_risk: f64,

    /// Risk up to age 85 in percent, absent from age 85; never below the 10-year risk
    pub lifetime_risk: Option<f64>,

    /// ARR/RRR/NNT, absent from age 85
    pub outcome: Option<PublicOutcome>,

    /// LDL-C before therapy (mmol/L)
    pub baseline_ldl: f64,

    /// LDL-C after the selected oral therapy (mmol/L)
    pub projected_ldl: f64,

    /// Absolute LDL-C reduction (mmol/L)
    pub ldl_drop: f64,

    /// Body-mass index (kg/m²)
    pub bmi: f64,

    /// Whether injectable therapy may be added
    pub advanced_therapy_eligible: bool,

    /// Injectable therapies accepted for this assessment
    pub advanced_therapies: Vec<AdvancedTherapy>,

    /// Bars for the risk chart
    pub chart: Vec<PublicChartPoint>,

    /// Display lines: risk, outcome, LDL-C and BMI
    pub summary: Vec<String>,

    /// When the assessment was computed
    pub generated_at: DateTime<Utc>,
}

/// LDL-C projection request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LdlProjectionRequest {
    /// Baseline LDL-C in mmol/L (0.5-6.0)
    #[schema(example = 3.0)]
    pub ldl: f64,

    /// Drugs taken before admission
    #[serde(default)]
    pub pre_admission: Vec<LipidDrug>,

    /// Drugs started or intensified now
    #[serde(default)]
    pub newly_started: Vec<LipidDrug>,
}

/// LDL-C projection result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LdlProjectionResponse {
    /// LDL-C before therapy (mmol/L)
    pub baseline: f64,
    /// LDL-C after therapy (mmol/L)
    pub projected: f64,
    /// Absolute reduction (mmol/L)
    pub drop: f64,
    /// Whether injectable therapy may be added
    pub advanced_therapy_eligible: bool,
    /// e.g. "Projected LDL-C: 1.5 mmol/L (↓ 1.5 mmol/L)"
    pub statement: String,
}

/// One oral drug in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TherapyCatalogEntry {
    /// Identifier used in requests
    pub drug: LipidDrug,
    /// Display label with dose
    pub label: String,
    /// Fractional LDL-C reduction
    pub reduction: f64,
    /// Supporting evidence
    pub evidence: String,
}

/// One injectable therapy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdvancedTherapyEntry {
    /// Identifier used in requests
    pub therapy: AdvancedTherapy,
    /// Display label
    pub label: String,
}

/// Therapy catalog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TherapyCatalogResponse {
    /// Oral drugs in application order
    pub oral: Vec<TherapyCatalogEntry>,
    /// Injectable therapies
    pub advanced: Vec<AdvancedTherapyEntry>,
    /// Projected LDL-C above which injectable therapy is offered (mmol/L)
    pub advanced_threshold: f64,
    /// Lowest projected LDL-C reported (mmol/L)
    pub ldl_floor: f64,
}
