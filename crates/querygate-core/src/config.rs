//! Configuration surface for the decision engine.
//!
//! These values are read-only inputs owned by the host engine's
//! configuration layer; the engine never writes them back.

use crate::error::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default application id reported to the policy service.
pub const DEFAULT_APP_ID: &str = "sparkSql";

/// Default host engine version.
pub const DEFAULT_ENGINE_VERSION: &str = "3.2.0";

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn default_engine_version() -> String {
    DEFAULT_ENGINE_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

/// Decision-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzConfig {
    /// Application id identifying this engine instance to the policy service.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Per-catalog policy-service-name overrides. Catalogs without an entry
    /// (or with a blank entry) fall back to the default service.
    #[serde(default)]
    pub catalog_service_names: HashMap<String, String>,

    /// Whether verification submits the whole batch in one call.
    /// Informational only: this engine always batches in one call.
    #[serde(default = "default_true")]
    pub single_call_verification: bool,

    /// Whether the policy service re-resolves group membership from its own
    /// user store instead of trusting the groups on each request. Forwarded
    /// to client implementations, never interpreted here.
    #[serde(default)]
    pub user_group_override: bool,

    /// Version of the hosting SQL engine, `major.minor[.patch]`.
    #[serde(default = "default_engine_version")]
    pub engine_version: String,

    /// Whether the policy-service client library supports per-catalog
    /// service names. When false the legacy two-argument construction is
    /// used and every catalog collapses onto the default service.
    #[serde(default = "default_true")]
    pub multi_service_client: bool,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            catalog_service_names: HashMap::new(),
            single_call_verification: true,
            user_group_override: false,
            engine_version: default_engine_version(),
            multi_service_client: true,
        }
    }
}

impl AuthzConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AuthzResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AuthzError::Config(format!("failed to read config file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AuthzError::Config(format!("failed to parse config: {}", e)))
    }

    /// Set the application id.
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    /// Register a per-catalog service-name override.
    pub fn with_catalog_service(
        mut self,
        catalog: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        self.catalog_service_names
            .insert(catalog.into(), service_name.into());
        self
    }

    /// Set the host engine version.
    pub fn with_engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }

    /// Use the legacy two-argument client construction.
    pub fn with_legacy_client(mut self) -> Self {
        self.multi_service_client = false;
        self
    }

    /// Look up the service-name override for a catalog, treating blank
    /// entries as absent.
    pub fn catalog_service_name(&self, catalog: &str) -> Option<&str> {
        self.catalog_service_names
            .get(catalog)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}
