//! Live log stream
//!
//! A `tracing` layer that republishes every event on a broadcast channel.
//! Components keep logging through `tracing`; whoever wants the live feed
//! (the run log file, a web console) subscribes. Nothing in the pricing
//! workflow reads from it.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, oneshot};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// One structured log event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEvent {
    pub fn line(&self) -> String {
        format!(
            "{} {:>5} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }

    /// Server-sent-event frame
    pub fn to_sse(&self) -> String {
        format!("data: {}\n\n", self.line())
    }
}

/// Broadcast fan-out of log events
#[derive(Debug, Clone)]
pub struct LogStream {
    sender: broadcast::Sender<LogEvent>,
}

impl LogStream {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Dropped silently when nobody listens
    pub fn publish(&self, event: LogEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for LogStream {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogStream {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.subscriber_count() == 0 {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut message = visitor.message;
        if !visitor.fields.is_empty() {
            message = format!("{} {}", message, visitor.fields.join(" "));
        }

        let metadata = event.metadata();
        self.publish(LogEvent {
            timestamp: Utc::now(),
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message: message.trim().to_string(),
        });
    }
}

/// Append streamed events to `path` as SSE frames until `shutdown` fires
///
/// Events still buffered at shutdown are drained first. Must not log through
/// `tracing` itself, that would feed back into the stream.
pub async fn pipe_to_file(
    mut events: broadcast::Receiver<LogEvent>,
    path: impl AsRef<Path>,
    mut shutdown: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .await?;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => file.write_all(event.to_sse().as_bytes()).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    let note = format!("data: [{} log events dropped]\n\n", skipped);
                    file.write_all(note.as_bytes()).await?;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                while let Ok(event) = events.try_recv() {
                    file.write_all(event.to_sse().as_bytes()).await?;
                }
                break;
            }
        }
    }

    file.flush().await
}
