use tracing::debug;

use crate::entities::therapy::{LdlProjection, LipidDrug, TherapySelection};

/// Projected LDL-C never drops below this value (mmol/L)
pub const LDL_FLOOR: f64 = 0.5;

/// Injectable therapy is only offered above this projected LDL-C (mmol/L)
pub const ADVANCED_THERAPY_THRESHOLD: f64 = 1.8;

/// Project LDL-C after the selected oral therapy.
///
/// Each active catalog drug multiplies the running value by
/// `1 - coefficient` exactly once, even when it is flagged both as
/// pre-admission and newly started.
pub fn project_post_therapy_ldl(baseline: f64, selections: &TherapySelection) -> LdlProjection {
    let active = selections.active_drugs();

    let reduced = active
        .iter()
        .fold(baseline, |ldl, drug| ldl * (1.0 - drug.reduction_coefficient()));
    let projected = reduced.max(LDL_FLOOR);

    debug!(baseline, projected, drugs = active.len(), "LDL-C projection");

    LdlProjection {
        baseline,
        projected,
        drop: baseline - projected,
    }
}

/// Whether PCSK9 inhibitors or inclisiran may be added on top of oral therapy
pub fn advanced_therapy_eligible(projected_ldl: f64) -> bool {
    projected_ldl > ADVANCED_THERAPY_THRESHOLD
}

/// Catalog entries with their coefficients, in application order
pub fn therapy_catalog() -> Vec<(LipidDrug, f64)> {
    LipidDrug::CATALOG
        .into_iter()
        .map(|drug| (drug, drug.reduction_coefficient()))
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn selection() -> impl Strategy<Value = TherapySelection> {
        (
            proptest::sample::subsequence(LipidDrug::CATALOG.to_vec(), 0..=8),
            proptest::sample::subsequence(LipidDrug::CATALOG.to_vec(), 0..=8),
        )
            .prop_map(|(pre_admission, newly_started)| TherapySelection {
                pre_admission,
                newly_started,
            })
    }

    proptest! {
        /// Projection never falls below the clinical floor
        #[test]
        fn projection_respects_floor(baseline in 0.5..6.0f64, selection in selection()) {
            let projection = project_post_therapy_ldl(baseline, &selection);
            prop_assert!(projection.projected >= LDL_FLOOR);
            prop_assert!(projection.projected <= baseline);
        }

        /// Same selection, same answer
        #[test]
        fn projection_is_idempotent(baseline in 0.5..6.0f64, selection in selection()) {
            prop_assert_eq!(
                project_post_therapy_ldl(baseline, &selection),
                project_post_therapy_ldl(baseline, &selection)
            );
        }

        /// Adding a drug never raises the projection
        #[test]
        fn projection_non_increasing_in_drugs(
            baseline in 0.5..6.0f64,
            selection in selection(),
            extra in proptest::sample::select(LipidDrug::CATALOG.to_vec()),
        ) {
            let before = project_post_therapy_ldl(baseline, &selection);
            let after = project_post_therapy_ldl(baseline, &selection.clone().with_newly_started(extra));
            prop_assert!(after.projected <= before.projected);
        }
    }
}
