//! Row processing context
//!
//! Wraps "which row of the batch am I pricing"

use std::fmt::Display;

use crate::clients::BatchPosition;

#[derive(Debug, Clone, Copy)]
pub struct RowCtx {
    /// 1-based position in the input sheet
    pub sl_number: u32,

    /// Rows in the batch, rejected ones included
    pub total_rows: usize,

    /// First / last flags forwarded to the workers
    pub position: BatchPosition,
}

impl RowCtx {
    /// Context for the row at `index` (0-based)
    ///
    /// Sl saturates at `u32::MAX` instead of wrapping.
    pub fn new(index: usize, total_rows: usize) -> Self {
        Self {
            sl_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
            total_rows,
            position: BatchPosition::of(index, total_rows),
        }
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Sl {}/{}]", self.sl_number, self.total_rows)
    }
}
