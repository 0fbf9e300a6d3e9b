//! Results returned by the policy service.
//!
//! Batch verdicts are index-aligned with the submitted requests; the
//! order-preservation contract is what lets the engine aggregate denials
//! by position.

use crate::request::AccessType;
use serde::{Deserialize, Serialize};

/// Well-known mask type identifiers assigned by policies.
pub mod mask_types {
    /// Replace the column with a literal NULL.
    pub const MASK_NULL: &str = "MASK_NULL";
    /// Policy supplies its own expression with a `{col}` token.
    pub const CUSTOM: &str = "CUSTOM";
    /// Obfuscate every character by class.
    pub const MASK: &str = "MASK";
    /// Show the first four characters, obfuscate the rest.
    pub const MASK_SHOW_FIRST_4: &str = "MASK_SHOW_FIRST_4";
    /// Show the last four characters, obfuscate the rest.
    pub const MASK_SHOW_LAST_4: &str = "MASK_SHOW_LAST_4";
    /// Replace the column with a hash of its value.
    pub const MASK_HASH: &str = "MASK_HASH";
    /// Truncate dates to year granularity.
    pub const MASK_DATE_SHOW_YEAR: &str = "MASK_DATE_SHOW_YEAR";
}

/// Per-request verdict from a batch authorization call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResult {
    /// Whether the request is allowed.
    pub allowed: bool,
    /// Privilege the verdict covers.
    pub access_type: AccessType,
    /// String form of the checked resource.
    pub resource: String,
    /// Identifier of the matched policy, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<i64>,
}

impl AccessResult {
    /// An allowing verdict.
    pub fn allow(access_type: AccessType, resource: impl Into<String>) -> Self {
        Self {
            allowed: true,
            access_type,
            resource: resource.into(),
            policy_id: None,
        }
    }

    /// A denying verdict.
    pub fn deny(access_type: AccessType, resource: impl Into<String>) -> Self {
        Self {
            allowed: false,
            access_type,
            resource: resource.into(),
            policy_id: None,
        }
    }

    /// Attach the matched policy id.
    pub fn with_policy_id(mut self, policy_id: i64) -> Self {
        self.policy_id = Some(policy_id);
        self
    }
}

/// Row-filter policy evaluation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilterResult {
    /// Whether a row-filter policy matched the request.
    pub filter_enabled: bool,
    /// Predicate to inject into the query, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_expr: Option<String>,
    /// Identifier of the matched policy, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<i64>,
}

impl RowFilterResult {
    /// A result with no matching filter policy.
    pub fn disabled() -> Self {
        Self {
            filter_enabled: false,
            filter_expr: None,
            policy_id: None,
        }
    }

    /// A result carrying a filter predicate.
    pub fn enabled(filter_expr: impl Into<String>) -> Self {
        Self {
            filter_enabled: true,
            filter_expr: Some(filter_expr.into()),
            policy_id: None,
        }
    }
}

/// Masker definition attached to non-builtin mask types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskTypeDef {
    /// Mask definition name (e.g. `MASK_SHOW_LAST_4`).
    pub name: String,
    /// Expression template with a `{col}` token, for service-defined masks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<String>,
}

impl MaskTypeDef {
    /// A builtin mask definition with no transformer.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transformer: None,
        }
    }

    /// A service-defined mask with an expression template.
    pub fn with_transformer(name: impl Into<String>, transformer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transformer: Some(transformer.into()),
        }
    }
}

/// Data-mask policy evaluation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskResult {
    /// Whether a mask policy matched the request.
    pub mask_enabled: bool,
    /// Mask type assigned by the policy.
    pub mask_type: String,
    /// Expression template for `CUSTOM` masks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_value: Option<String>,
    /// Definition for mask types dispatched by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_type_def: Option<MaskTypeDef>,
    /// Identifier of the matched policy, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<i64>,
}

impl MaskResult {
    /// A result with no matching mask policy.
    pub fn disabled() -> Self {
        Self {
            mask_enabled: false,
            mask_type: String::new(),
            masked_value: None,
            mask_type_def: None,
            policy_id: None,
        }
    }

    /// An enabled mask of the given type.
    pub fn enabled(mask_type: impl Into<String>) -> Self {
        Self {
            mask_enabled: true,
            mask_type: mask_type.into(),
            masked_value: None,
            mask_type_def: None,
            policy_id: None,
        }
    }

    /// Set the `CUSTOM` expression template.
    pub fn with_masked_value(mut self, masked_value: impl Into<String>) -> Self {
        self.masked_value = Some(masked_value.into());
        self
    }

    /// Set the mask definition.
    pub fn with_def(mut self, def: MaskTypeDef) -> Self {
        self.mask_type_def = Some(def);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_result_constructors() {
        let allow = AccessResult::allow(AccessType::Select, "db/t");
        assert!(allow.allowed);
        assert_eq!(allow.resource, "db/t");

        let deny = AccessResult::deny(AccessType::Update, "db/t").with_policy_id(42);
        assert!(!deny.allowed);
        assert_eq!(deny.policy_id, Some(42));
    }

    #[test]
    fn test_row_filter_result_states() {
        assert!(!RowFilterResult::disabled().filter_enabled);

        let enabled = RowFilterResult::enabled("region = 'EU'");
        assert!(enabled.filter_enabled);
        assert_eq!(enabled.filter_expr.as_deref(), Some("region = 'EU'"));
    }

    #[test]
    fn test_mask_result_builder() {
        let result = MaskResult::enabled(mask_types::MASK_SHOW_LAST_4)
            .with_def(MaskTypeDef::named(mask_types::MASK_SHOW_LAST_4));
        assert!(result.mask_enabled);
        assert_eq!(result.mask_type, "MASK_SHOW_LAST_4");
        assert!(result.mask_type_def.is_some());
    }

    #[test]
    fn test_mask_result_optional_fields_omitted_in_json() {
        let json = serde_json::to_string(&MaskResult::disabled()).unwrap();
        assert!(!json.contains("masked_value"));
        assert!(!json.contains("policy_id"));
    }
}
