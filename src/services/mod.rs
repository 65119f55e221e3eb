pub mod aggregator;
pub mod dispatcher;
pub mod mode_resolver;
pub mod notifier;
pub mod report_writer;
pub mod standardizer;

pub use aggregator::aggregate;
pub use dispatcher::ComputeDispatcher;
pub use mode_resolver::{plan_modes, Disposition, PlanRule, ResolvedPlan};
pub use notifier::{parse_recipients, Notifier, NotifyOutcome};
pub use report_writer::{Report, ReportRecord, ReportWriter};
pub use standardizer::{map_os, standardize};
