use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Oral lipid-lowering drugs in the fixed catalog.
///
/// Each dose tier is its own entry with one fractional LDL-C reduction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum LipidDrug {
    /// Simvastatin 20 mg
    SimvastatinLow,
    /// Simvastatin 40 mg
    SimvastatinHigh,
    /// Atorvastatin 20 mg
    AtorvastatinLow,
    /// Atorvastatin 40 mg
    AtorvastatinHigh,
    /// Rosuvastatin 10 mg
    RosuvastatinLow,
    /// Rosuvastatin 20 mg
    RosuvastatinHigh,
    /// Ezetimibe 10 mg
    Ezetimibe,
    /// Bempedoic acid
    BempedoicAcid,
}

impl LipidDrug {
    /// Catalog order, which is also the order reductions are applied in
    pub const CATALOG: [LipidDrug; 8] = [
        LipidDrug::SimvastatinLow,
        LipidDrug::SimvastatinHigh,
        LipidDrug::AtorvastatinLow,
        LipidDrug::AtorvastatinHigh,
        LipidDrug::RosuvastatinLow,
        LipidDrug::RosuvastatinHigh,
        LipidDrug::Ezetimibe,
        LipidDrug::BempedoicAcid,
    ];

    /// Expected fractional LDL-C reduction
    pub fn reduction_coefficient(self) -> f64 {
        match self {
            LipidDrug::SimvastatinLow => 0.30,
            LipidDrug::SimvastatinHigh => 0.35,
            LipidDrug::AtorvastatinLow => 0.45,
            LipidDrug::AtorvastatinHigh => 0.50,
            LipidDrug::RosuvastatinLow => 0.45,
            LipidDrug::RosuvastatinHigh => 0.55,
            LipidDrug::Ezetimibe => 0.20,
            LipidDrug::BempedoicAcid => 0.18,
        }
    }

    /// Display label with dose
    pub fn label(self) -> &'static str {
        match self {
            LipidDrug::SimvastatinLow => "Simvastatin 20 mg",
            LipidDrug::SimvastatinHigh => "Simvastatin 40 mg",
            LipidDrug::AtorvastatinLow => "Atorvastatin 20 mg",
            LipidDrug::AtorvastatinHigh => "Atorvastatin 40 mg",
            LipidDrug::RosuvastatinLow => "Rosuvastatin 10 mg",
            LipidDrug::RosuvastatinHigh => "Rosuvastatin 20 mg",
            LipidDrug::Ezetimibe => "Ezetimibe 10 mg",
            LipidDrug::BempedoicAcid => "Bempedoic acid",
        }
    }

    /// Supporting evidence shown next to the drug
    pub fn evidence(self) -> &'static str {
        match self {
            LipidDrug::SimvastatinLow => "~30% LDL-C reduction",
            LipidDrug::SimvastatinHigh => "~35% LDL-C reduction",
            LipidDrug::AtorvastatinLow => "~45% LDL-C reduction",
            LipidDrug::AtorvastatinHigh => "~50% LDL-C reduction",
            LipidDrug::RosuvastatinLow => "~45% LDL-C reduction",
            LipidDrug::RosuvastatinHigh => "~55% LDL-C reduction",
            LipidDrug::Ezetimibe => "IMPROVE-IT trial",
            LipidDrug::BempedoicAcid => "CLEAR Outcomes trial",
        }
    }
}

/// Injectable therapies offered only when oral therapy leaves LDL-C above target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AdvancedTherapy {
    /// PCSK9 inhibitor (FOURIER trial)
    Pcsk9Inhibitor,
    /// Inclisiran (ORION-10 trial)
    Inclisiran,
}

impl AdvancedTherapy {
    pub fn label(self) -> &'static str {
        match self {
            AdvancedTherapy::Pcsk9Inhibitor => "PCSK9 inhibitor",
            AdvancedTherapy::Inclisiran => "Inclisiran",
        }
    }
}

/// Flags recorded for one catalog drug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TherapyFlags {
    /// Taken before admission
    pub pre_admission: bool,
    /// Started or intensified now
    pub newly_started: bool,
}

impl TherapyFlags {
    /// Whether the drug counts toward the LDL-C projection
    pub fn is_active(&self) -> bool {
        self.pre_admission || self.newly_started
    }
}

/// Lipid-lowering therapy selections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TherapySelection {
    /// Drugs taken before admission
    #[serde(default)]
    pub pre_admission: Vec<LipidDrug>,

    /// Drugs started or intensified now
    #[serde(default)]
    pub newly_started: Vec<LipidDrug>,
}

impl TherapySelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a drug as taken before admission
    pub fn with_pre_admission(mut self, drug: LipidDrug) -> Self {
        self.pre_admission.push(drug);
        self
    }

    /// Mark a drug as newly started
    pub fn with_newly_started(mut self, drug: LipidDrug) -> Self {
        self.newly_started.push(drug);
        self
    }

    /// Flags for one drug
    pub fn flags(&self, drug: LipidDrug) -> TherapyFlags {
        TherapyFlags {
            pre_admission: self.pre_admission.contains(&drug),
            newly_started: self.newly_started.contains(&drug),
        }
    }

    /// Active drugs in catalog order, each listed once
    pub fn active_drugs(&self) -> Vec<LipidDrug> {
        LipidDrug::CATALOG
            .into_iter()
            .filter(|&drug| self.flags(drug).is_active())
            .collect()
    }
}

/// Projected LDL-C after oral therapy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LdlProjection {
    /// LDL-C before therapy (mmol/L)
    pub baseline: f64,
    /// LDL-C after therapy (mmol/L)
    pub projected: f64,
    /// Absolute reduction (mmol/L)
    pub drop: f64,
}
