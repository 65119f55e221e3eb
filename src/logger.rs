use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::LogStream;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `verbose`. Returns the stream layer so callers can
/// subscribe to live events, or `None` when a global subscriber was already
/// installed and the stream would never see an event.
pub fn init(verbose: bool) -> Option<LogStream> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stream = LogStream::default();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(stream.clone())
        .try_init()
        .ok()
        .map(|_| stream)
}
