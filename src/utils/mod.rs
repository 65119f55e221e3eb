pub mod log_stream;
pub mod logging;

pub use log_stream::{pipe_to_file, LogEvent, LogStream};
pub use logging::{init_log_file, truncate_text};
