//! Scriptable in-memory policy service used by unit tests.

use crate::audit::{AuditEvent, AuditHandler};
use crate::client::{ClientConstructor, PolicyServiceClient, select_factory};
use crate::config::AuthzConfig;
use crate::error::{AuthzError, AuthzResult};
use crate::registry::CatalogHandleRegistry;
use parking_lot::Mutex;
use querygate_proto::{AccessRequest, AccessResult, MaskResult, RowFilterResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct FakeState {
    denied: Mutex<HashSet<String>>,
    missing: Mutex<HashSet<String>>,
    row_filters: Mutex<HashMap<String, RowFilterResult>>,
    masks: Mutex<HashMap<String, MaskResult>>,
    fail_init: bool,
    init_delay: Option<Duration>,
    named_constructions: AtomicUsize,
    legacy_constructions: AtomicUsize,
    init_calls: AtomicUsize,
}

/// Constructor producing fake clients that all share one scripted state.
#[derive(Default)]
pub(crate) struct FakeConstructor {
    state: Arc<FakeState>,
}

impl FakeConstructor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every client's `init()` fail.
    pub(crate) fn failing_init(mut self) -> Self {
        Arc::get_mut(&mut self.state)
            .expect("configure before constructing clients")
            .fail_init = true;
        self
    }

    /// Sleep inside `init()` to widen construction races.
    pub(crate) fn with_init_delay(mut self, delay: Duration) -> Self {
        Arc::get_mut(&mut self.state)
            .expect("configure before constructing clients")
            .init_delay = Some(delay);
        self
    }

    /// Deny requests on the given resource string.
    pub(crate) fn deny(&self, resource: impl Into<String>) {
        self.state.denied.lock().insert(resource.into());
    }

    /// Produce no verdict for requests on the given resource string.
    pub(crate) fn drop_verdict(&self, resource: impl Into<String>) {
        self.state.missing.lock().insert(resource.into());
    }

    /// Script a row-filter result for a resource string.
    pub(crate) fn set_row_filter(&self, resource: impl Into<String>, result: RowFilterResult) {
        self.state.row_filters.lock().insert(resource.into(), result);
    }

    /// Script a mask result for a resource string.
    pub(crate) fn set_mask(&self, resource: impl Into<String>, result: MaskResult) {
        self.state.masks.lock().insert(resource.into(), result);
    }

    pub(crate) fn named_constructions(&self) -> usize {
        self.state.named_constructions.load(Ordering::SeqCst)
    }

    pub(crate) fn legacy_constructions(&self) -> usize {
        self.state.legacy_constructions.load(Ordering::SeqCst)
    }

    pub(crate) fn constructions(&self) -> usize {
        self.named_constructions() + self.legacy_constructions()
    }

    pub(crate) fn init_calls(&self) -> usize {
        self.state.init_calls.load(Ordering::SeqCst)
    }
}

impl ClientConstructor for FakeConstructor {
    fn with_service_name(
        &self,
        _service_type: &str,
        service_name: &str,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>> {
        self.state.named_constructions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeClient {
            state: self.state.clone(),
            service_name: Some(service_name.to_string()),
            app_id: app_id.to_string(),
        }))
    }

    fn legacy(
        &self,
        _service_type: &str,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>> {
        self.state.legacy_constructions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeClient {
            state: self.state.clone(),
            service_name: None,
            app_id: app_id.to_string(),
        }))
    }
}

struct FakeClient {
    state: Arc<FakeState>,
    #[allow(dead_code)]
    service_name: Option<String>,
    #[allow(dead_code)]
    app_id: String,
}

impl PolicyServiceClient for FakeClient {
    fn init(&self) -> AuthzResult<()> {
        if let Some(delay) = self.state.init_delay {
            std::thread::sleep(delay);
        }
        if self.state.fail_init {
            return Err(AuthzError::PolicyService("connection refused".into()));
        }
        self.state.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_batch(
        &self,
        requests: &[AccessRequest],
        audit: &dyn AuditHandler,
    ) -> AuthzResult<Vec<Option<AccessResult>>> {
        let denied = self.state.denied.lock();
        let missing = self.state.missing.lock();
        let results = requests
            .iter()
            .map(|request| {
                let resource = request.resource.as_string();
                if missing.contains(&resource) {
                    audit.record(AuditEvent::missing_verdict(request));
                    return None;
                }
                let result = if denied.contains(&resource) {
                    AccessResult::deny(request.access_type, &resource).with_policy_id(1)
                } else {
                    AccessResult::allow(request.access_type, &resource).with_policy_id(1)
                };
                audit.record(AuditEvent::decision(request, &result));
                Some(result)
            })
            .collect();
        Ok(results)
    }

    fn eval_row_filter(&self, request: &AccessRequest) -> AuthzResult<Option<RowFilterResult>> {
        Ok(self
            .state
            .row_filters
            .lock()
            .get(&request.resource.as_string())
            .cloned())
    }

    fn eval_data_mask(&self, request: &AccessRequest) -> AuthzResult<Option<MaskResult>> {
        Ok(self
            .state
            .masks
            .lock()
            .get(&request.resource.as_string())
            .cloned())
    }
}

/// Build a registry over a fake constructor with the factory selected from
/// the config, the way hosts wire the real thing.
pub(crate) fn registry_with(
    config: AuthzConfig,
    constructor: Arc<FakeConstructor>,
) -> CatalogHandleRegistry {
    let factory = select_factory(&config, constructor);
    CatalogHandleRegistry::new(config, factory)
}
