//! Policy-service client contract and factory selection.
//!
//! The decision engine never talks to the policy service directly; it goes
//! through [`PolicyServiceClient`], implemented by the host for its
//! concrete policy-service library. Client construction differs between
//! library generations: newer libraries accept a per-catalog service name,
//! older ones only (service_type, app_id). The two [`PolicyClientFactory`]
//! implementations encode that difference; [`select_factory`] picks one at
//! configuration time.

use crate::audit::AuditHandler;
use crate::config::AuthzConfig;
use crate::error::AuthzResult;
use querygate_proto::{AccessRequest, AccessResult, MaskResult, RowFilterResult};
use std::sync::Arc;
use tracing::debug;

/// Service type under which this engine registers with the policy service.
pub const SERVICE_TYPE: &str = "spark";

/// One session to the external policy decision service.
///
/// All methods are synchronous and may block on network I/O; timeouts, if
/// any, belong to the implementation. Batch results must be returned in
/// request order.
pub trait PolicyServiceClient: Send + Sync {
    /// One-time blocking initialization (policy download, session setup).
    /// Called exactly once, before the client is published to any caller.
    fn init(&self) -> AuthzResult<()>;

    /// Evaluate a batch of access requests.
    ///
    /// The returned vector is index-aligned with `requests`; a `None` entry
    /// means the service produced no verdict for that request. The audit
    /// handler observes each decision as it is produced.
    fn check_batch(
        &self,
        requests: &[AccessRequest],
        audit: &dyn AuditHandler,
    ) -> AuthzResult<Vec<Option<AccessResult>>>;

    /// Evaluate row-filter policies for one request.
    fn eval_row_filter(&self, request: &AccessRequest) -> AuthzResult<Option<RowFilterResult>>;

    /// Evaluate data-mask policies for one request.
    fn eval_data_mask(&self, request: &AccessRequest) -> AuthzResult<Option<MaskResult>>;
}

/// Raw constructor seam for the host's concrete client library.
///
/// Both constructor forms return an uninitialized client; the handle layer
/// runs [`PolicyServiceClient::init`] before publishing it.
pub trait ClientConstructor: Send + Sync {
    /// Construct with an explicit service name (client library 2.1+).
    fn with_service_name(
        &self,
        service_type: &str,
        service_name: &str,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>>;

    /// Construct with the legacy two-argument form. The service identity is
    /// derived from the app id by the client library.
    fn legacy(
        &self,
        service_type: &str,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>>;
}

/// Builds policy-service clients for a given service identity.
pub trait PolicyClientFactory: Send + Sync {
    /// Construct a client for `(service_name, app_id)`.
    fn create(
        &self,
        service_name: Option<&str>,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>>;
}

/// Factory for client libraries that accept a per-catalog service name.
pub struct MultiServiceFactory {
    constructor: Arc<dyn ClientConstructor>,
}

impl MultiServiceFactory {
    /// Wrap a constructor.
    pub fn new(constructor: Arc<dyn ClientConstructor>) -> Self {
        Self { constructor }
    }
}

impl PolicyClientFactory for MultiServiceFactory {
    fn create(
        &self,
        service_name: Option<&str>,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>> {
        match service_name {
            Some(name) => self
                .constructor
                .with_service_name(SERVICE_TYPE, name, app_id),
            None => self.constructor.legacy(SERVICE_TYPE, app_id),
        }
    }
}

/// Factory for legacy client libraries without service-name construction.
///
/// Per-catalog service names are ignored: every catalog collapses onto the
/// service the client library derives from the app id.
pub struct LegacyFactory {
    constructor: Arc<dyn ClientConstructor>,
}

impl LegacyFactory {
    /// Wrap a constructor.
    pub fn new(constructor: Arc<dyn ClientConstructor>) -> Self {
        Self { constructor }
    }
}

impl PolicyClientFactory for LegacyFactory {
    fn create(
        &self,
        service_name: Option<&str>,
        app_id: &str,
    ) -> AuthzResult<Box<dyn PolicyServiceClient>> {
        if let Some(name) = service_name {
            debug!(
                service_name = name,
                "legacy client library ignores service name; using app id"
            );
        }
        self.constructor.legacy(SERVICE_TYPE, app_id)
    }
}

/// Select the factory matching the configured client capability.
pub fn select_factory(
    config: &AuthzConfig,
    constructor: Arc<dyn ClientConstructor>,
) -> Arc<dyn PolicyClientFactory> {
    if config.multi_service_client {
        Arc::new(MultiServiceFactory::new(constructor))
    } else {
        Arc::new(LegacyFactory::new(constructor))
    }
}
