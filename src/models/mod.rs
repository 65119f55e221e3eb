pub mod loaders;
pub mod machine;
pub mod pricing;
pub mod raw_row;

pub use loaders::load_rows;
pub use machine::{MachineClass, StandardizedRow};
pub use pricing::{ModeResult, PricingMode, RowResult};
pub use raw_row::RawRow;
