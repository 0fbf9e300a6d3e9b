//! Querygate Core - Authorization and data-masking decisions for SQL plans.
//!
//! This crate sits between a SQL query planner and a centralized policy
//! service. The host engine submits one [`AccessRequest`](proto::AccessRequest)
//! per plan node; the engine decides whether each is allowed and, for
//! allowed reads, which row-filter predicate or column-masking expression
//! the rewritten plan must carry.
//!
//! # Components
//!
//! - [`CatalogHandleRegistry`] - catalog-scoped policy-service handle cache
//! - [`BatchAuthorizer`] - batch verification with one aggregated denial error
//! - [`FilterExpressionResolver`] - row-filter predicate lookup
//! - [`MaskExpressionCompiler`] - mask-policy to SQL-expression compilation
//!
//! # Example
//!
//! ```ignore
//! use querygate_core::{
//!     AuthzConfig, BatchAuthorizer, CatalogHandleRegistry, NullAuditHandler, select_factory,
//! };
//! use std::sync::Arc;
//!
//! let config = AuthzConfig::from_file("querygate.json")?;
//! let factory = select_factory(&config, my_client_constructor);
//! let registry = Arc::new(CatalogHandleRegistry::new(config, factory));
//!
//! let authorizer = BatchAuthorizer::new(registry.clone());
//! authorizer.verify(&requests, &NullAuditHandler)?;
//! ```
//!
//! All calls are synchronous and may block on policy-service I/O; the
//! registry is safe to share across query-compilation threads.

pub mod audit;
pub mod authorizer;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod handle;
pub mod masking;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{AuditEvent, AuditHandler, MemoryAuditHandler, NullAuditHandler};
pub use authorizer::BatchAuthorizer;
pub use client::{
    select_factory, ClientConstructor, LegacyFactory, MultiServiceFactory, PolicyClientFactory,
    PolicyServiceClient, SERVICE_TYPE,
};
pub use config::AuthzConfig;
pub use error::{AuthzError, AuthzResult};
pub use filter::FilterExpressionResolver;
pub use handle::PolicyServiceHandle;
pub use masking::{EngineCompat, MaskExpressionCompiler};
pub use registry::{CatalogHandleRegistry, DEFAULT_CATALOG};

/// Re-export protocol types.
pub use querygate_proto as proto;
