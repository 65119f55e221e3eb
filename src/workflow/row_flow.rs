//! Row pricing flow - workflow layer
//!
//! Defines the full life of one row:
//! 1. validate required fields (reject → error row, no dispatch)
//! 2. standardize
//! 3. plan modes
//! 4. fan out the dispatched modes, join them
//! 5. aggregate into the row result

use tracing::{info, warn};

use crate::models::{RawRow, RowResult, StandardizedRow};
use crate::services::{aggregate, plan_modes, standardize, ComputeDispatcher};
use crate::workflow::row_ctx::RowCtx;

/// Row pricing flow
///
/// - owns no worker resources itself, only the dispatcher capability
/// - one row in, one `RowResult` out, never an error
pub struct RowFlow {
    dispatcher: ComputeDispatcher,
}

impl RowFlow {
    pub fn new(dispatcher: ComputeDispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn run(&self, raw: &RawRow, ctx: &RowCtx) -> RowResult {
        if let Err(e) = raw.validate_required(ctx.sl_number) {
            warn!("{} ⚠️ Skipping row: {}", ctx, e);
            return RowResult::rejected(ctx.sl_number, e.to_string());
        }

        let row = standardize(raw, ctx.sl_number);
        info!("{} ✅ Standardized: {}", ctx, row.summary());

        self.price(&row, ctx).await
    }

    /// Plan, dispatch and aggregate an already standardized row
    pub async fn price(&self, row: &StandardizedRow, ctx: &RowCtx) -> RowResult {
        let plan = plan_modes(row);
        let dispatched = plan.dispatched();
        info!(
            "{} 🚀 Plan '{}': dispatching {}",
            ctx,
            plan.rule(),
            dispatched
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let results = self.dispatcher.dispatch_plan(&plan, row, ctx.position).await;
        let result = aggregate(row, &plan, &results);

        let failed = result.failed_modes();
        if failed == 0 {
            info!("{} ✓ Completed, all modes priced", ctx);
        } else {
            warn!("{} ⚠️ Completed with {} of 4 modes missing", ctx, failed);
        }

        result
    }
}
