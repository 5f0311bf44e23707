use std::{collections::VecDeque, sync::Arc};

use tokio::sync::broadcast;

/// Log lines kept for replay to new `/api/logs` subscribers.
pub const LOG_RING_CAPACITY: usize = 500;

pub type LogRing = Arc<std::sync::Mutex<VecDeque<String>>>;

/// Mirrors every event as a JSON line onto a broadcast channel and a
/// bounded replay ring.
pub struct BroadcastLayer {
    pub tx: broadcast::Sender<String>,
    pub ring: LogRing,
}

impl BroadcastLayer {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self {
            tx,
            ring: Arc::new(std::sync::Mutex::new(VecDeque::with_capacity(LOG_RING_CAPACITY))),
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    category: Option<String>,
}

impl tracing::field::Visit for EventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "category" => self.category = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message.clear();
            use std::fmt::Write;
            let _ = write!(self.message, "{value:?}");
            // Strip surrounding quotes added by Debug on &str
            if self.message.starts_with('"') && self.message.ends_with('"') && self.message.len() >= 2 {
                self.message = self.message[1..self.message.len() - 1].to_string();
            }
        }
    }
}

/// Explicit `category` field first, else guessed from the target.
fn category_for(target: &str, explicit: Option<String>) -> String {
    if let Some(c) = explicit {
        return c;
    }
    if target.contains("agent") || target.contains("relay") || target.contains("routes") {
        "relay".into()
    } else if target.contains("core") {
        "analysis".into()
    } else {
        "system".into()
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for BroadcastLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = match *event.metadata().level() {
            tracing::Level::ERROR => "err",
            tracing::Level::WARN => "warn",
            tracing::Level::INFO => "info",
            tracing::Level::DEBUG => "debug",
            tracing::Level::TRACE => return,
        };

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        let category = category_for(event.metadata().target(), visitor.category);

        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let json = serde_json::json!({
            "ts": ts,
            "level": level,
            "message": visitor.message,
            "category": category,
        })
        .to_string();

        let _ = self.tx.send(json.clone());
        if let Ok(mut ring) = self.ring.lock() {
            ring.push_back(json);
            if ring.len() > LOG_RING_CAPACITY {
                ring.pop_front();
            }
        }
    }
}
