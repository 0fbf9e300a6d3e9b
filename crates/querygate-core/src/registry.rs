//! Catalog-scoped policy-service handle cache.

use crate::client::PolicyClientFactory;
use crate::config::AuthzConfig;
use crate::error::AuthzResult;
use crate::handle::PolicyServiceHandle;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reserved name the host engine uses for its built-in catalog; requests
/// against it route to the default service like catalog-less requests.
pub const DEFAULT_CATALOG: &str = "spark_catalog";

/// Process-wide mapping from catalog name to policy-service handle.
///
/// The registry is an injectable service object: hosts construct one per
/// process and share it across query-compilation threads. Handles are
/// created lazily, at most once per distinct `(service_name, app_id)`
/// identity, and are never evicted or refreshed once created.
pub struct CatalogHandleRegistry {
    config: AuthzConfig,
    factory: Arc<dyn PolicyClientFactory>,
    default_handle: OnceCell<Arc<PolicyServiceHandle>>,
    by_catalog: DashMap<String, Arc<PolicyServiceHandle>>,
}

impl CatalogHandleRegistry {
    /// Create a registry over the given configuration and client factory.
    pub fn new(config: AuthzConfig, factory: Arc<dyn PolicyClientFactory>) -> Self {
        Self {
            config,
            factory,
            default_handle: OnceCell::new(),
            by_catalog: DashMap::new(),
        }
    }

    /// The configuration this registry routes with.
    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    /// Resolve the handle owning `catalog`.
    ///
    /// `None` and the reserved [`DEFAULT_CATALOG`] name route to the
    /// default handle. A catalog without a (non-blank) service-name
    /// override logs a warning and also falls back to the default handle.
    /// Otherwise the catalog's handle is created on first access; racing
    /// first callers block on one construction and share the result.
    ///
    /// Construction failures (including the blocking `init()` call) are
    /// propagated and nothing is cached, so a later call retries.
    pub fn get_or_create(&self, catalog: Option<&str>) -> AuthzResult<Arc<PolicyServiceHandle>> {
        let catalog = match catalog {
            None => return self.default_handle(),
            Some(DEFAULT_CATALOG) => return self.default_handle(),
            Some(name) => name,
        };

        let service_name = match self.config.catalog_service_name(catalog) {
            Some(name) => name,
            None => {
                warn!(
                    catalog,
                    "no policy service configured for catalog, using default service"
                );
                return self.default_handle();
            }
        };

        if let Some(handle) = self.by_catalog.get(catalog) {
            return Ok(handle.value().clone());
        }

        debug!(catalog, service_name, "creating policy service handle");
        let handle = self
            .by_catalog
            .entry(catalog.to_string())
            .or_try_insert_with(|| {
                PolicyServiceHandle::connect(
                    self.factory.as_ref(),
                    Some(service_name),
                    &self.config.app_id,
                )
                .map(Arc::new)
            })?;
        Ok(handle.value().clone())
    }

    fn default_handle(&self) -> AuthzResult<Arc<PolicyServiceHandle>> {
        self.default_handle
            .get_or_try_init(|| {
                PolicyServiceHandle::connect(self.factory.as_ref(), None, &self.config.app_id)
                    .map(Arc::new)
            })
            .map(|handle| handle.clone())
    }

    /// Drop every cached handle. Test hook; production registries live for
    /// the process lifetime.
    pub fn reset(&mut self) {
        self.default_handle.take();
        self.by_catalog.clear();
    }
}
