//! Batch privilege verification.

use crate::audit::AuditHandler;
use crate::error::{AuthzError, AuthzResult};
use crate::registry::CatalogHandleRegistry;
use querygate_proto::{AccessRequest, AccessType};
use std::sync::Arc;
use tracing::debug;

/// Verifies batches of access requests against the policy service.
pub struct BatchAuthorizer {
    registry: Arc<CatalogHandleRegistry>,
}

impl BatchAuthorizer {
    /// Create an authorizer over a handle registry.
    pub fn new(registry: Arc<CatalogHandleRegistry>) -> Self {
        Self { registry }
    }

    /// Verify a batch of access requests.
    ///
    /// The whole batch is submitted in one call and every request is
    /// checked against the default service; per-resource catalog routing is
    /// not wired for verification. Returns `Ok(())` when every request is
    /// allowed. On any denial (including a missing per-request verdict),
    /// fails with a single [`AuthzError::AccessDenied`] enumerating every
    /// denied `(access type, resource)` pair; the calling query must abort.
    ///
    /// The audit handler observes each decision as the client produces it;
    /// it never influences the outcome.
    pub fn verify(&self, requests: &[AccessRequest], audit: &dyn AuditHandler) -> AuthzResult<()> {
        if requests.is_empty() {
            return Ok(());
        }

        let handle = self.registry.get_or_create(None)?;
        let results = handle.check_batch(requests, audit)?;

        let denied: Vec<usize> = requests
            .iter()
            .enumerate()
            .filter_map(|(idx, _)| {
                let allowed = results
                    .get(idx)
                    .and_then(|r| r.as_ref())
                    .is_some_and(|r| r.allowed);
                (!allowed).then_some(idx)
            })
            .collect();

        if denied.is_empty() {
            debug!(batch = requests.len(), "all requests allowed");
            return Ok(());
        }

        // Group denied resources under their access type, preserving
        // first-seen order on both levels.
        let mut groups: Vec<(AccessType, Vec<String>)> = Vec::new();
        for &idx in &denied {
            let request = &requests[idx];
            let resource = request.resource.as_string();
            match groups.iter_mut().find(|(t, _)| *t == request.access_type) {
                Some((_, resources)) => resources.push(resource),
                None => groups.push((request.access_type, vec![resource])),
            }
        }

        let privileges = groups
            .iter()
            .map(|(access_type, resources)| {
                format!("[{}] privilege on [{}]", access_type, resources.join(","))
            })
            .collect::<Vec<_>>()
            .join(", ");

        Err(AuthzError::AccessDenied {
            user: requests[0].user.clone(),
            privileges,
        })
    }

    /// Verify a single request.
    pub fn verify_one(&self, request: &AccessRequest, audit: &dyn AuditHandler) -> AuthzResult<()> {
        self.verify(std::slice::from_ref(request), audit)
    }
}
