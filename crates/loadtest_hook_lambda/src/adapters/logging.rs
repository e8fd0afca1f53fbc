use serde_json::{json, Value};

/// Structured log port handed to the handler so every workflow checkpoint is
/// observable in tests as well as in CloudWatch.
pub trait EventLog {
    fn info(&self, event: &str, details: Value);
    fn error(&self, event: &str, details: Value);
}

/// Production implementation: one JSON object per line on stderr.
pub struct StderrEventLog {
    component: &'static str,
}

impl StderrEventLog {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl EventLog for StderrEventLog {
    fn info(&self, event: &str, details: Value) {
        eprintln!(
            "{}",
            json!({
                "component": self.component,
                "event": event,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "details": details,
            })
        );
    }

    fn error(&self, event: &str, details: Value) {
        eprintln!(
            "{}",
            json!({
                "component": self.component,
                "level": "error",
                "event": event,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "details": details,
            })
        );
    }
}
