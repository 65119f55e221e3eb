//! Pricing mode resolver - service layer
//!
//! Decides, per row, which pricing modes need their own compute run and
//! which can reuse another mode's result. Some discounts are equivalent to
//! on-demand pricing for certain classes / series / usage, and each avoided
//! run is one browser session less.

use std::fmt;

use crate::models::{MachineClass, PricingMode, StandardizedRow};

/// Series whose sustained-use price equals on-demand
const SUD_EQUALS_ONDEMAND_SERIES: [&str; 2] = ["E2", "C2D"];
/// Series with no partial-month sustained-use discount at all
const NO_PARTIAL_MONTH_SUD_SERIES: &str = "C2D";

/// What happens to one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Independent compute call
    Dispatch,
    /// Reuse the result of another, dispatched mode
    CopyFrom(PricingMode),
}

/// Which rule produced the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRule {
    Preemptible,
    PartialMonth,
    PartialMonthNoSud,
    SudEqualsOnDemand,
    AllModes,
}

impl fmt::Display for PlanRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PlanRule::Preemptible => "preemptible: on-demand only",
            PlanRule::PartialMonth => "partial month: on-demand + sud",
            PlanRule::PartialMonthNoSud => "partial month, no sud discount: on-demand only",
            PlanRule::SudEqualsOnDemand => "sud equals on-demand: on-demand + commitments",
            PlanRule::AllModes => "all modes",
        };
        f.write_str(text)
    }
}

/// Disposition of all four modes for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    rule: PlanRule,
    // indexed like `PricingMode::ALL`
    dispositions: [Disposition; 4],
}

impl ResolvedPlan {
    fn new(rule: PlanRule) -> Self {
        Self {
            rule,
            dispositions: [Disposition::Dispatch; 4],
        }
    }

    fn copy(mut self, target: PricingMode, source: PricingMode) -> Self {
        self.dispositions[index(target)] = Disposition::CopyFrom(source);
        self
    }

    pub fn rule(&self) -> PlanRule {
        self.rule
    }

    pub fn disposition(&self, mode: PricingMode) -> Disposition {
        self.dispositions[index(mode)]
    }

    /// Modes that get their own compute call, in `PricingMode::ALL` order
    pub fn dispatched(&self) -> Vec<PricingMode> {
        PricingMode::ALL
            .into_iter()
            .filter(|m| self.disposition(*m) == Disposition::Dispatch)
            .collect()
    }

    pub fn copies(&self) -> Vec<(PricingMode, PricingMode)> {
        PricingMode::ALL
            .into_iter()
            .filter_map(|m| match self.disposition(m) {
                Disposition::CopyFrom(source) => Some((m, source)),
                Disposition::Dispatch => None,
            })
            .collect()
    }
}

fn index(mode: PricingMode) -> usize {
    match mode {
        PricingMode::Sud => 0,
        PricingMode::OnDemand => 1,
        PricingMode::OneYear => 2,
        PricingMode::ThreeYear => 3,
    }
}

/// Resolve the plan for a standardized row
///
/// Rules are checked in order, first match wins:
/// 1. preemptible: on-demand only, copied everywhere
/// 2. regular, partial month: on-demand + sud, commitments copy sud
///    (C2D has no partial-month discount, everything copies on-demand)
/// 3. E2 / C2D: sud copies on-demand, commitments run on their own
/// 4. everything runs
pub fn plan_modes(row: &StandardizedRow) -> ResolvedPlan {
    use PricingMode::*;

    if row.machine_class == MachineClass::Preemptible {
        return ResolvedPlan::new(PlanRule::Preemptible)
            .copy(Sud, OnDemand)
            .copy(OneYear, OnDemand)
            .copy(ThreeYear, OnDemand);
    }

    if !row.is_full_month() {
        if row.series == NO_PARTIAL_MONTH_SUD_SERIES {
            return ResolvedPlan::new(PlanRule::PartialMonthNoSud)
                .copy(Sud, OnDemand)
                .copy(OneYear, OnDemand)
                .copy(ThreeYear, OnDemand);
        }
        return ResolvedPlan::new(PlanRule::PartialMonth)
            .copy(OneYear, Sud)
            .copy(ThreeYear, Sud);
    }

    if SUD_EQUALS_ONDEMAND_SERIES.contains(&row.series.as_str()) {
        return ResolvedPlan::new(PlanRule::SudEqualsOnDemand).copy(Sud, OnDemand);
    }

    ResolvedPlan::new(PlanRule::AllModes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;
    use crate::services::standardizer::standardize;
    use proptest::prelude::*;
    use PricingMode::*;

    fn row(class: MachineClass, hours: f64, series: &str) -> StandardizedRow {
        let mut row = standardize(&RawRow::new(), 1);
        row.machine_class = class;
        row.avg_hours_per_month = hours;
        row.series = series.to_string();
        row
    }

    #[test]
    fn preemptible_dispatches_ondemand_only() {
        let plan = plan_modes(&row(MachineClass::Preemptible, 730.0, "N2"));
        assert_eq!(plan.rule(), PlanRule::Preemptible);
        assert_eq!(plan.dispatched(), vec![OnDemand]);
        for mode in [Sud, OneYear, ThreeYear] {
            assert_eq!(plan.disposition(mode), Disposition::CopyFrom(OnDemand));
        }
    }

    #[test]
    fn preemptible_wins_over_partial_month() {
        let plan = plan_modes(&row(MachineClass::Preemptible, 100.0, "E2"));
        assert_eq!(plan.rule(), PlanRule::Preemptible);
    }

    #[test]
    fn partial_month_dispatches_sud_and_copies_commitments() {
        let plan = plan_modes(&row(MachineClass::Regular, 200.0, "N2"));
        assert_eq!(plan.rule(), PlanRule::PartialMonth);
        assert_eq!(plan.dispatched(), vec![Sud, OnDemand]);
        assert_eq!(plan.disposition(OneYear), Disposition::CopyFrom(Sud));
        assert_eq!(plan.disposition(ThreeYear), Disposition::CopyFrom(Sud));
    }

    #[test]
    fn partial_month_c2d_copies_ondemand_everywhere() {
        let plan = plan_modes(&row(MachineClass::Regular, 200.0, "C2D"));
        assert_eq!(plan.rule(), PlanRule::PartialMonthNoSud);
        assert_eq!(plan.dispatched(), vec![OnDemand]);
        assert_eq!(plan.copies().len(), 3);
    }

    #[test]
    fn e2_full_month_copies_sud_from_ondemand() {
        for series in ["E2", "C2D"] {
            let plan = plan_modes(&row(MachineClass::Regular, 730.0, series));
            assert_eq!(plan.rule(), PlanRule::SudEqualsOnDemand);
            assert_eq!(plan.dispatched(), vec![OnDemand, OneYear, ThreeYear]);
            assert_eq!(plan.copies(), vec![(Sud, OnDemand)]);
        }
    }

    #[test]
    fn other_series_dispatch_everything() {
        let plan = plan_modes(&row(MachineClass::Regular, 730.0, "N2D"));
        assert_eq!(plan.rule(), PlanRule::AllModes);
        assert_eq!(plan.dispatched(), PricingMode::ALL.to_vec());
        assert!(plan.copies().is_empty());
    }

    fn class_strategy() -> impl Strategy<Value = MachineClass> {
        prop_oneof![Just(MachineClass::Regular), Just(MachineClass::Preemptible)]
    }

    fn series_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("E2".to_string()),
            Just("C2D".to_string()),
            Just("N1".to_string()),
            Just("N2".to_string()),
            Just("C2".to_string()),
            "[A-Z][0-9A-Z]{0,3}",
        ]
    }

    proptest! {
        #[test]
        fn every_plan_is_complete_and_acyclic(
            class in class_strategy(),
            hours in 0.0f64..1000.0,
            series in series_strategy(),
        ) {
            let plan = plan_modes(&row(class, hours, &series));

            prop_assert!(plan.dispatched().contains(&OnDemand));
            prop_assert_eq!(plan.dispatched().len() + plan.copies().len(), 4);
            for (_, source) in plan.copies() {
                prop_assert_eq!(plan.disposition(source), Disposition::Dispatch);
            }
        }
    }
}
