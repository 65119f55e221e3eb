//! Result aggregation - service layer
//!
//! Fills the modes the plan copied and stamps the row.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{ModeResult, PricingMode, RowResult, StandardizedRow};
use crate::services::mode_resolver::{Disposition, ResolvedPlan};

/// Merge dispatch results into the row's final result
///
/// A dispatched mode missing from `dispatch_results` counts as failed.
pub fn aggregate(
    row: &StandardizedRow,
    plan: &ResolvedPlan,
    dispatch_results: &BTreeMap<PricingMode, ModeResult>,
) -> RowResult {
    let lookup = |mode: PricingMode| {
        dispatch_results
            .get(&mode)
            .cloned()
            .unwrap_or_else(ModeResult::failed)
    };

    let results: BTreeMap<PricingMode, ModeResult> = PricingMode::ALL
        .into_iter()
        .map(|mode| {
            let result = match plan.disposition(mode) {
                Disposition::Dispatch => lookup(mode),
                Disposition::CopyFrom(source) => {
                    debug!("[Sl {}] {} copied from {}", row.sl_number, mode, source);
                    lookup(source)
                }
            };
            (mode, result)
        })
        .collect();

    RowResult::completed(row.sl_number, results)
}
