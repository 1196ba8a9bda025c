//! Cardiovascular risk estimation.
//!
//! Closed-form proportional-hazards model for 10-year risk, with 5-year and
//! lifetime risk derived from it under a constant-hazard assumption. The
//! coefficients are fixed model constants and must not be tuned.

use thiserror::Error;
use tracing::debug;

use crate::entities::assessment::{OutcomeSummary, RiskEstimate};
use crate::entities::patient::{LabPanel, PatientProfile, RiskFactors};

/// No risk figure is ever reported above this percentage
pub const RISK_CAP: f64 = 95.0;

/// Lifetime risk is projected up to this age
pub const LIFETIME_HORIZON_AGE: u32 = 85;

const BASELINE_SURVIVAL: f64 = 0.900;
const CENTERING: f64 = 5.8;

const COEF_AGE: f64 = 0.064;
const COEF_MALE: f64 = 0.34;
const COEF_SBP: f64 = 0.02;
const COEF_TOTAL_CHOLESTEROL: f64 = 0.25;
const COEF_HDL: f64 = -0.25;
const COEF_SMOKER: f64 = 0.44;
const COEF_DIABETES: f64 = 0.51;
const COEF_EGFR_PER_10: f64 = -0.2;
const COEF_LOG_CRP: f64 = 0.25;
const COEF_VASCULAR: f64 = 0.4;

/// Risk calculation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskCalculationError {
    /// A laboratory value is outside the domain of the model
    #[error("Invalid lab value: {0}")]
    InvalidLabValue(String),
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn cap(percentage: f64) -> f64 {
    percentage.min(RISK_CAP)
}

/// Linear predictor of the hazard model
fn linear_predictor(profile: &PatientProfile, labs: &LabPanel, risk_factors: &RiskFactors) -> f64 {
    COEF_AGE * f64::from(profile.age)
        + COEF_MALE * profile.sex.indicator()
        + COEF_SBP * f64::from(labs.systolic_bp)
        + COEF_TOTAL_CHOLESTEROL * labs.total_cholesterol
        + COEF_HDL * labs.hdl
        + COEF_SMOKER * indicator(risk_factors.smoker)
        + COEF_DIABETES * indicator(risk_factors.diabetes)
        + COEF_EGFR_PER_10 * (f64::from(risk_factors.egfr) / 10.0)
        + COEF_LOG_CRP * (labs.crp + 1.0).ln()
        + COEF_VASCULAR * f64::from(risk_factors.vascular_disease_count())
}

/// Estimate 10-year cardiovascular risk as a percentage capped at 95.
///
/// Inputs are expected to be range-validated already. A CRP of -1 mg/L or
/// less makes `ln(CRP + 1)` undefined and is reported as an invalid lab value.
pub fn estimate_ten_year_risk(
    profile: &PatientProfile,
    labs: &LabPanel,
    risk_factors: &RiskFactors,
) -> Result<f64, RiskCalculationError> {
    if labs.crp.is_nan() || labs.crp <= -1.0 {
        return Err(RiskCalculationError::InvalidLabValue(format!(
            "hs-CRP must be greater than -1 mg/L, got {}",
            labs.crp
        )));
    }

    let lp = linear_predictor(profile, labs, risk_factors);
    let risk = 1.0 - BASELINE_SURVIVAL.powf((lp - CENTERING).exp());
    if !risk.is_finite() {
        return Err(RiskCalculationError::InvalidLabValue(format!(
            "risk model produced a non-finite value for linear predictor {}",
            lp
        )));
    }

    debug!(linear_predictor = lp, risk, "10-year risk evaluated");
    Ok(cap(risk * 100.0))
}

/// Convert a 10-year risk percentage to a 5-year risk percentage
pub fn convert_to_five_year(ten_year: f64) -> f64 {
    let p10 = cap(ten_year) / 100.0;
    cap((1.0 - (1.0 - p10).powf(0.5)) * 100.0)
}

/// Estimate risk up to age 85.
///
/// Returns `None` for patients aged 85 or older, where lifetime risk is not
/// applicable. The result never falls below the 10-year risk, so patients
/// with fewer than ten remaining years get the 10-year figure.
pub fn estimate_lifetime_risk(age: u32, ten_year: f64) -> Option<f64> {
    if age >= LIFETIME_HORIZON_AGE {
        return None;
    }

    let years = LIFETIME_HORIZON_AGE - age;
    let p10 = cap(ten_year) / 100.0;
    let annual = 1.0 - (1.0 - p10).powf(1.0 / 10.0);
    let lifetime = (1.0 - (1.0 - annual).powf(f64::from(years))) * 100.0;

    Some(cap(lifetime.max(cap(ten_year))))
}

/// Absolute and relative risk reduction and number needed to treat.
///
/// Only defined when lifetime risk is. NNT is `None` when the absolute
/// reduction is zero.
pub fn summarize_outcome(ten_year: f64, lifetime: Option<f64>) -> Option<OutcomeSummary> {
    let lifetime = lifetime?;

    let arr = ten_year - lifetime;
    let rrr = if ten_year == 0.0 { 0.0 } else { arr / ten_year * 100.0 };
    let nnt = if arr == 0.0 { None } else { Some(100.0 / arr) };

    Some(OutcomeSummary { arr, rrr, nnt })
}

/// Run the 10-year, 5-year and lifetime estimates together
pub fn estimate_risk(
    profile: &PatientProfile,
    labs: &LabPanel,
    risk_factors: &RiskFactors,
) -> Result<RiskEstimate, RiskCalculationError> {
    let ten_year = estimate_ten_year_risk(profile, labs, risk_factors)?;

    Ok(RiskEstimate {
        five_year: convert_to_five_year(ten_year),
        ten_year,
        lifetime: estimate_lifetime_risk(profile.age, ten_year),
    })
}
