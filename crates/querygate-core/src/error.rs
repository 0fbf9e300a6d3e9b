//! Error types for the decision engine.

use thiserror::Error;

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Errors surfaced by the decision engine.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// One or more requests in a batch were denied.
    ///
    /// `privileges` enumerates every denied privilege as
    /// `[type] privilege on [res1,res2]` groups. This is the only error the
    /// host treats as a query-fatal authorization failure.
    #[error("Permission denied: user [{user}] does not have {privileges}")]
    AccessDenied {
        /// User of the first request in the batch.
        user: String,
        /// Denied privilege groups, first-seen order.
        privileges: String,
    },

    /// Policy-service handle construction or initialization failed.
    #[error("policy service initialization failed: {0}")]
    Initialization(String),

    /// The policy-service client failed while evaluating a request.
    #[error("policy service error: {0}")]
    PolicyService(String),

    /// Malformed configuration input.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AuthzError {
    /// Whether this error is an authorization denial (as opposed to an
    /// operational failure).
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AuthzError::AccessDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_display() {
        let err = AuthzError::AccessDenied {
            user: "bob".into(),
            privileges: "[select] privilege on [sales/orders]".into(),
        };
        assert_eq!(
            err.to_string(),
            "Permission denied: user [bob] does not have [select] privilege on [sales/orders]"
        );
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_operational_errors_are_not_denials() {
        assert!(!AuthzError::Initialization("unreachable".into()).is_access_denied());
        assert!(!AuthzError::Config("bad version".into()).is_access_denied());
    }
}
