use cvd_risk_guide_domain::entities::{
    AdvancedTherapy, LabPanel, LdlProjection, LipidDrug, PatientProfile, RiskAssessment,
    RiskAssessmentRequest, RiskFactors, Sex, TherapySelection, VascularTerritories,
};
use cvd_risk_guide_domain::services::{report, therapy};

use super::assessment::{
    AdvancedTherapyEntry, AssessmentRequest, AssessmentResponse, LdlProjectionRequest,
    LdlProjectionResponse, PublicChartPoint, PublicOutcome, PublicSex, TherapyCatalogEntry,
    TherapyCatalogResponse,
};

/// Conversion functions between public and domain entities
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert a flat form submission into the domain form snapshot
pub fn convert_to_domain_request(request: AssessmentRequest) -> RiskAssessmentRequest {
    RiskAssessmentRequest {
        profile: PatientProfile {
            age: request.age,
            sex: match request.sex {
                PublicSex::Male => Sex::Male,
                PublicSex::Female => Sex::Female,
            },
            weight_kg: request.weight_kg,
            height_cm: request.height_cm,
        },
        labs: LabPanel {
            total_cholesterol: request.total_cholesterol,
            hdl: request.hdl,
            ldl: request.ldl,
            crp: request.crp,
            hba1c: request.hba1c,
            triglycerides: request.triglycerides,
            systolic_bp: request.systolic_bp,
        },
        risk_factors: RiskFactors {
            smoker: request.smoker,
            diabetes: request.diabetes,
            vascular: VascularTerritories {
                coronary: request.coronary,
                cerebrovascular: request.cerebrovascular,
                peripheral: request.peripheral,
            },
            egfr: request.egfr,
        },
        therapies: TherapySelection {
            pre_admission: request.pre_admission,
            newly_started: request.newly_started,
        },
        advanced_therapies: request.advanced_therapies,
    }
}

/// Convert a projection request into a domain therapy selection
pub fn convert_to_domain_selection(request: &LdlProjectionRequest) -> TherapySelection {
    TherapySelection {
        pre_admission: request.pre_admission.clone(),
        newly_started: request.newly_started.clone(),
    }
}

/// Convert a domain assessment into the public response
pub fn convert_to_public_assessment(assessment: RiskAssessment) -> AssessmentResponse {
    AssessmentResponse {
        five_year_risk: assessment.estimate.five_year,
        ten_year_risk: assessment.estimate.ten_year,
        lifetime_risk: assessment.estimate.lifetime,
        outcome: assessment.outcome.map(|o| PublicOutcome {
            arr: o.arr,
            rrr: o.rrr,
            nnt: o.nnt,
        }),
        baseline_ldl: assessment.ldl.baseline,
        projected_ldl: assessment.ldl.projected,
        ldl_drop: assessment.ldl.drop,
        bmi: assessment.bmi,
        advanced_therapy_eligible: assessment.advanced_therapy_eligible,
        advanced_therapies: assessment.advanced_therapies,
        chart: assessment
            .chart
            .into_iter()
            .map(|p| PublicChartPoint {
                label: p.label,
                value: p.value,
            })
            .collect(),
        summary: vec![
            assessment.report.risk,
            assessment.report.outcome,
            assessment.report.ldl,
            assessment.report.bmi,
        ],
        generated_at: assessment.generated_at,
    }
}

/// Convert a domain LDL-C projection into the public response
pub fn convert_to_public_projection(projection: LdlProjection) -> LdlProjectionResponse {
    LdlProjectionResponse {
        baseline: projection.baseline,
        projected: projection.projected,
        drop: projection.drop,
        advanced_therapy_eligible: therapy::advanced_therapy_eligible(projection.projected),
        statement: report::ldl_statement(&projection),
    }
}

/// Public view of the therapy catalog
pub fn public_therapy_catalog() -> TherapyCatalogResponse {
    TherapyCatalogResponse {
        oral: therapy::therapy_catalog()
            .into_iter()
            .map(|(drug, reduction): (LipidDrug, f64)| TherapyCatalogEntry {
                drug,
                label: drug.label().to_string(),
                reduction,
                evidence: drug.evidence().to_string(),
            })
            .collect(),
        advanced: [AdvancedTherapy::Pcsk9Inhibitor, AdvancedTherapy::Inclisiran]
            .into_iter()
            .map(|t| AdvancedTherapyEntry {
                therapy: t,
                label: t.label().to_string(),
            })
            .collect(),
        advanced_threshold: therapy::ADVANCED_THERAPY_THRESHOLD,
        ldl_floor: therapy::LDL_FLOOR,
    }
}
