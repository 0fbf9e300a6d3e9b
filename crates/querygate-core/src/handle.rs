//! Initialized policy-service sessions.

use crate::audit::AuditHandler;
use crate::client::{PolicyClientFactory, PolicyServiceClient};
use crate::error::{AuthzError, AuthzResult};
use querygate_proto::{AccessRequest, AccessResult, MaskResult, RowFilterResult};
use std::fmt;
use tracing::info;

/// One configured session to the policy service, scoped to a
/// `(service_name, app_id)` identity.
///
/// A handle is only ever constructed through [`PolicyServiceHandle::connect`],
/// which runs the client's blocking `init()` before returning; callers never
/// observe an uninitialized handle. Handles live for the process lifetime
/// and are never evicted or refreshed.
pub struct PolicyServiceHandle {
    service_name: Option<String>,
    app_id: String,
    client: Box<dyn PolicyServiceClient>,
}

impl PolicyServiceHandle {
    /// Construct and initialize a handle.
    pub(crate) fn connect(
        factory: &dyn PolicyClientFactory,
        service_name: Option<&str>,
        app_id: &str,
    ) -> AuthzResult<Self> {
        let client = factory.create(service_name, app_id)?;
        client
            .init()
            .map_err(|e| AuthzError::Initialization(e.to_string()))?;
        info!(
            service_name = service_name.unwrap_or("<default>"),
            app_id, "policy service handle initialized"
        );
        Ok(Self {
            service_name: service_name.map(str::to_string),
            app_id: app_id.to_string(),
            client,
        })
    }

    /// Service-name component of this handle's identity. `None` means the
    /// default service derived from the app id.
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Application id component of this handle's identity.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Evaluate a batch of access requests; results are index-aligned.
    pub fn check_batch(
        &self,
        requests: &[AccessRequest],
        audit: &dyn AuditHandler,
    ) -> AuthzResult<Vec<Option<AccessResult>>> {
        self.client.check_batch(requests, audit)
    }

    /// Evaluate row-filter policies for one request.
    pub fn eval_row_filter(&self, request: &AccessRequest) -> AuthzResult<Option<RowFilterResult>> {
        self.client.eval_row_filter(request)
    }

    /// Evaluate data-mask policies for one request.
    pub fn eval_data_mask(&self, request: &AccessRequest) -> AuthzResult<Option<MaskResult>> {
        self.client.eval_data_mask(request)
    }
}

impl fmt::Debug for PolicyServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyServiceHandle")
            .field("service_name", &self.service_name)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}
