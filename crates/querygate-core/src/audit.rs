//! Audit observer interface.
//!
//! Audit handlers record per-request allow/deny decisions. They are
//! observers only: nothing in the decision path consults them.

use parking_lot::Mutex;
use querygate_proto::{AccessRequest, AccessResult, AccessType};

/// A recorded authorization decision.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// User the decision applies to.
    pub user: String,
    /// String form of the checked resource.
    pub resource: String,
    /// Privilege that was checked.
    pub access_type: AccessType,
    /// The verdict.
    pub allowed: bool,
    /// Matched policy id, when the service reported one.
    pub policy_id: Option<i64>,
}

impl AuditEvent {
    /// Build an event from a request and its verdict.
    pub fn decision(request: &AccessRequest, result: &AccessResult) -> Self {
        Self {
            user: request.user.clone(),
            resource: request.resource.as_string(),
            access_type: request.access_type,
            allowed: result.allowed,
            policy_id: result.policy_id,
        }
    }

    /// Build an event for a request the service produced no verdict for.
    /// Missing verdicts are treated as denials.
    pub fn missing_verdict(request: &AccessRequest) -> Self {
        Self {
            user: request.user.clone(),
            resource: request.resource.as_string(),
            access_type: request.access_type,
            allowed: false,
            policy_id: None,
        }
    }
}

/// Observer of authorization decisions.
///
/// Client implementations invoke the handler once per request as verdicts
/// arrive. Implementations must be cheap or hand off to their own sink;
/// they run inline on query-compilation threads.
pub trait AuditHandler: Send + Sync {
    /// Record one decision.
    fn record(&self, event: AuditEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditHandler;

impl AuditHandler for NullAuditHandler {
    fn record(&self, _event: AuditEvent) {}
}

/// Captures events in memory. Test support and small deployments.
#[derive(Debug, Default)]
pub struct MemoryAuditHandler {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events were recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditHandler for MemoryAuditHandler {
    fn record(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querygate_proto::{AccessResource, OperationType};

    fn request() -> AccessRequest {
        AccessRequest::new(
            "bob",
            AccessResource::table("sales", "orders"),
            AccessType::Select,
            OperationType::Query,
        )
    }

    #[test]
    fn test_decision_event_fields() {
        let req = request();
        let result = AccessResult::deny(AccessType::Select, "sales/orders").with_policy_id(7);
        let event = AuditEvent::decision(&req, &result);

        assert_eq!(event.user, "bob");
        assert_eq!(event.resource, "sales/orders");
        assert!(!event.allowed);
        assert_eq!(event.policy_id, Some(7));
    }

    #[test]
    fn test_missing_verdict_is_denied() {
        let event = AuditEvent::missing_verdict(&request());
        assert!(!event.allowed);
        assert_eq!(event.policy_id, None);
    }

    #[test]
    fn test_memory_handler_captures() {
        let handler = MemoryAuditHandler::new();
        assert!(handler.is_empty());

        let req = request();
        handler.record(AuditEvent::decision(
            &req,
            &AccessResult::allow(AccessType::Select, "sales/orders"),
        ));

        assert_eq!(handler.len(), 1);
        assert!(handler.events()[0].allowed);

        handler.clear();
        assert!(handler.is_empty());
    }
}
