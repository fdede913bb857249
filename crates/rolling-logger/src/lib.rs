//! Rolling Logger
//!
//! A `tracing` layer that writes every event to the console (browser devtools on
//! wasm32, stderr elsewhere) and keeps the most recent entries in a bounded
//! in-memory ring.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Default number of entries retained by [`LogBuffer`]
pub const DEFAULT_CAPACITY: usize = 200;

/// One captured event
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>5} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Shared circular buffer of recent entries
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Ring>>,
}

struct Ring {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Ring {
                capacity,
                entries: VecDeque::with_capacity(capacity),
            })),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        // A poisoned lock only means a panic mid-push; the ring is still usable.
        let mut ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if ring.entries.len() == ring.capacity {
            ring.entries.pop_front();
        }
        ring.entries.push_back(entry);
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        let ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        ring.entries.iter().cloned().collect()
    }

    pub fn count_at(&self, level: Level) -> usize {
        let ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        ring.entries.iter().filter(|e| e.level == level).count()
    }

    pub fn len(&self) -> usize {
        let ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        ring.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        ring.entries.clear();
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

/// The layer itself
pub struct RollingLayer {
    buffer: LogBuffer,
    max_level: Level,
    console: bool,
}

impl RollingLayer {
    pub fn new(buffer: LogBuffer, max_level: Level) -> Self {
        Self { buffer, max_level, console: true }
    }

    /// Capture only, without console output (tests)
    pub fn silent(buffer: LogBuffer, max_level: Level) -> Self {
        Self { buffer, max_level, console: false }
    }
}

impl<S: Subscriber> Layer<S> for RollingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // tracing orders levels by verbosity: TRACE is the greatest.
        if *meta.level() > self.max_level {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            timestamp: Utc::now(),
            level: *meta.level(),
            target: meta.target().to_string(),
            message: visitor.finish(),
        };
        if self.console {
            write_console(&entry);
        }
        self.buffer.push(entry);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn write_console(entry: &LogEntry) {
    let line = wasm_bindgen::JsValue::from_str(&entry.to_string());
    match entry.level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(entry: &LogEntry) {
    eprintln!("{}", entry);
}

/// Install a global subscriber made of a [`RollingLayer`] and return its buffer
///
/// Fails if a global subscriber was already set.
pub fn init(
    capacity: usize,
    max_level: Level,
) -> Result<LogBuffer, tracing::subscriber::SetGlobalDefaultError> {
    let buffer = LogBuffer::with_capacity(capacity);
    let subscriber =
        tracing_subscriber::registry().with(RollingLayer::new(buffer.clone(), max_level));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(buffer: &LogBuffer, max_level: Level, f: impl FnOnce()) {
        let subscriber =
            tracing_subscriber::registry().with(RollingLayer::silent(buffer.clone(), max_level));
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_captures_message_and_fields() {
        let buffer = LogBuffer::with_capacity(8);
        capture(&buffer, Level::DEBUG, || {
            tracing::info!(count = 3, "loaded products");
        });

        let entries = buffer.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::INFO);
        assert_eq!(entries[0].message, "loaded products count=3");
    }

    #[test]
    fn test_drops_events_above_max_level() {
        let buffer = LogBuffer::with_capacity(8);
        capture(&buffer, Level::INFO, || {
            tracing::debug!("noisy");
            tracing::trace!("noisier");
            tracing::error!("kept");
        });

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.count_at(Level::ERROR), 1);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let buffer = LogBuffer::with_capacity(2);
        capture(&buffer, Level::TRACE, || {
            tracing::warn!("first");
            tracing::warn!("second");
            tracing::warn!("third");
        });

        let messages: Vec<_> = buffer.snapshot().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn test_clear() {
        let buffer = LogBuffer::with_capacity(4);
        capture(&buffer, Level::TRACE, || tracing::error!("boom"));
        assert!(!buffer.is_empty());
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
