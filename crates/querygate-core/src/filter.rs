//! Row-filter predicate lookup.

use crate::error::AuthzResult;
use crate::registry::CatalogHandleRegistry;
use querygate_proto::AccessRequest;
use std::sync::Arc;
use tracing::debug;

/// Resolves the row-filter predicate a read must inject, if any.
pub struct FilterExpressionResolver {
    registry: Arc<CatalogHandleRegistry>,
}

impl FilterExpressionResolver {
    /// Create a resolver over a handle registry.
    pub fn new(registry: Arc<CatalogHandleRegistry>) -> Self {
        Self { registry }
    }

    /// Look up the filter predicate for one request.
    ///
    /// Returns `Some(predicate)` only when a row-filter policy matched and
    /// carries a non-empty expression; `None` means the query reads rows
    /// unfiltered.
    pub fn filter_expr(&self, request: &AccessRequest) -> AuthzResult<Option<String>> {
        let handle = self
            .registry
            .get_or_create(request.resource.catalog.as_deref())?;
        let result = handle.eval_row_filter(request)?;

        let expr = result
            .filter(|r| r.filter_enabled)
            .and_then(|r| r.filter_expr)
            .filter(|e| !e.is_empty());

        if let Some(expr) = &expr {
            debug!(
                resource = %request.resource,
                filter = %expr,
                "row filter applies"
            );
        }
        Ok(expr)
    }
}
