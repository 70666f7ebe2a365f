//! Audit sink implementations.

use std::sync::Arc;

use parking_lot::Mutex;
use ssolink_traits::{AuditAction, AuditEvent, AuditResult, AuditSink};
use tracing::{info, warn};

/// Writes every audit event to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        let scopes = event.sso.as_ref().map(|sso| sso.scopes.as_str());
        let region = event.sso.as_ref().map(|sso| sso.sso_region.as_str());
        match event.result {
            AuditResult::Succeeded => info!(
                target: "ssolink::audit",
                action = %event.action,
                id = %event.id,
                scopes,
                region,
                "Profile operation succeeded"
            ),
            AuditResult::Failed => warn!(
                target: "ssolink::audit",
                action = %event.action,
                id = %event.id,
                reason = event.reason.as_deref().unwrap_or("unknown"),
                "Profile operation failed"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: AuditEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Recorded events for one action, in emission order.
    pub fn events_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.action == action)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards each event to several sinks.
#[derive(Default, Clone)]
pub struct FanoutAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl AuditSink for FanoutAuditSink {
    fn record(&self, event: AuditEvent) {
        for sink in &self.sinks {
            sink.record(event.clone());
        }
    }
}
