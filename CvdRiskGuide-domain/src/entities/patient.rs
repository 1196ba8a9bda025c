use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Biological sex as used by the risk model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Indicator used by the linear predictor (1 for male, 0 for female)
    pub fn indicator(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

/// Patient demographics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PatientProfile {
    /// Age in years
    #[validate(range(min = 30, max = 90, message = "Age must be between 30 and 90 years"))]
    pub age: u32,

    /// Biological sex
    pub sex: Sex,

    /// Weight in kilograms
    #[validate(range(min = 40.0, max = 200.0, message = "Weight must be between 40 and 200 kg"))]
    pub weight_kg: f64,

    /// Height in centimetres
    #[validate(range(min = 140.0, max = 210.0, message = "Height must be between 140 and 210 cm"))]
    pub height_cm: f64,
}

impl PatientProfile {
    /// Body mass index in kg/m²
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }
}

/// Laboratory results and current blood pressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LabPanel {
    /// Total cholesterol (mmol/L)
    #[validate(range(min = 2.0, max = 10.0, message = "Total cholesterol must be between 2.0 and 10.0 mmol/L"))]
    pub total_cholesterol: f64,

    /// HDL cholesterol (mmol/L)
    #[validate(range(min = 0.5, max = 3.0, message = "HDL-C must be between 0.5 and 3.0 mmol/L"))]
    pub hdl: f64,

    /// LDL cholesterol (mmol/L)
    #[validate(range(min = 0.5, max = 6.0, message = "LDL-C must be between 0.5 and 6.0 mmol/L"))]
    pub ldl: f64,

    /// High-sensitivity C-reactive protein (mg/L)
    #[validate(range(min = 0.1, max = 20.0, message = "hs-CRP must be between 0.1 and 20.0 mg/L"))]
    pub crp: f64,

    /// Glycated haemoglobin (%)
    #[validate(range(min = 4.0, max = 14.0, message = "HbA1c must be between 4.0 and 14.0 %"))]
    pub hba1c: f64,

    /// Triglycerides (mmol/L)
    #[validate(range(min = 0.3, max = 5.0, message = "Triglycerides must be between 0.3 and 5.0 mmol/L"))]
    pub triglycerides: f64,

    /// Current systolic blood pressure (mmHg)
    #[validate(range(min = 80, max = 220, message = "Systolic blood pressure must be between 80 and 220 mmHg"))]
    pub systolic_bp: u32,
}

/// Sites of known vascular disease
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct VascularTerritories {
    #[serde(default)]
    pub coronary: bool,
    #[serde(default)]
    pub cerebrovascular: bool,
    #[serde(default)]
    pub peripheral: bool,
}

impl VascularTerritories {
    /// Number of affected territories (0-3)
    pub fn count(&self) -> u32 {
        [self.coronary, self.cerebrovascular, self.peripheral]
            .iter()
            .filter(|&&affected| affected)
            .count() as u32
    }
}

/// Clinical risk factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskFactors {
    /// Current smoker
    #[serde(default)]
    pub smoker: bool,

    /// Diabetes diagnosis
    #[serde(default)]
    pub diabetes: bool,

    /// Territories with known vascular disease
    #[serde(default)]
    pub vascular: VascularTerritories,

    /// Estimated glomerular filtration rate (mL/min/1.73 m²)
    #[validate(range(min = 15, max = 120, message = "eGFR must be between 15 and 120 mL/min/1.73 m²"))]
    pub egfr: u32,
}

impl RiskFactors {
    /// Number of affected vascular territories
    pub fn vascular_disease_count(&self) -> u32 {
        self.vascular.count()
    }
}
