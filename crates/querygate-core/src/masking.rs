//! Mask-policy compilation into SQL expression fragments.
//!
//! The compiler maps an abstract mask-policy result onto a concrete SQL
//! expression over the target column. Character obfuscation is expressed
//! as chained `regexp_replace` calls so the host engine evaluates it; this
//! core never touches row data.

use crate::error::{AuthzError, AuthzResult};
use crate::registry::CatalogHandleRegistry;
use querygate_proto::{mask_types, AccessRequest, MaskResult, MaskTypeDef};
use std::sync::Arc;
use tracing::debug;

/// Token mask policies use to reference the target column in templates.
const COLUMN_TOKEN: &str = "{col}";

/// Minimum engine version whose `regexp_replace` accepts a start position.
const POSITIONAL_REPLACE_MIN: (u32, u32) = (3, 1);

/// Capabilities of the hosting SQL engine, resolved once from its version
/// string and carried as plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCompat {
    /// Whether `regexp_replace` accepts a fourth start-position argument.
    pub positional_replace: bool,
}

impl EngineCompat {
    /// Resolve capabilities from a `major.minor[.patch]` version string.
    pub fn from_version(version: &str) -> AuthzResult<Self> {
        let unparseable =
            || AuthzError::Config(format!("unparseable engine version '{}'", version));
        let mut parts = version.trim().split('.');
        let major: u32 = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(unparseable)?
            .parse()
            .map_err(|_| unparseable())?;
        let minor: u32 = match parts.next() {
            Some(p) => p.parse().map_err(|_| unparseable())?,
            None => 0,
        };
        Ok(Self {
            positional_replace: (major, minor) >= POSITIONAL_REPLACE_MIN,
        })
    }
}

/// Compiles mask-policy results into SQL expressions for masked
/// projections.
pub struct MaskExpressionCompiler {
    registry: Arc<CatalogHandleRegistry>,
    compat: EngineCompat,
}

impl MaskExpressionCompiler {
    /// Create a compiler, resolving engine capabilities from the registry's
    /// configured engine version.
    pub fn new(registry: Arc<CatalogHandleRegistry>) -> AuthzResult<Self> {
        let compat = EngineCompat::from_version(&registry.config().engine_version)?;
        Ok(Self::with_compat(registry, compat))
    }

    /// Create a compiler with explicitly resolved engine capabilities.
    pub fn with_compat(registry: Arc<CatalogHandleRegistry>, compat: EngineCompat) -> Self {
        Self { registry, compat }
    }

    /// Compile the masking expression for one column-level request.
    ///
    /// Returns `None` when the column passes through unmasked: no matching
    /// policy, masking disabled, or an unrecognized mask type without a
    /// transformer. Callers must splice nothing in that case; `None` is
    /// never an empty string.
    pub fn masking_expr(&self, request: &AccessRequest) -> AuthzResult<Option<String>> {
        let Some(column) = request.resource.column.as_deref() else {
            debug!(resource = %request.resource, "masking request without column");
            return Ok(None);
        };

        let handle = self
            .registry
            .get_or_create(request.resource.catalog.as_deref())?;
        let Some(result) = handle.eval_data_mask(request)? else {
            return Ok(None);
        };
        if !result.mask_enabled {
            return Ok(None);
        }

        let expr = self.compile(&result, column);
        if let Some(expr) = &expr {
            debug!(resource = %request.resource, mask = %expr, "mask applies");
        }
        Ok(expr)
    }

    fn compile(&self, result: &MaskResult, column: &str) -> Option<String> {
        match result.mask_type.as_str() {
            mask_types::MASK_NULL => Some("NULL".to_string()),
            mask_types::CUSTOM => Some(
                result
                    .masked_value
                    .as_deref()
                    .map(|template| template.replace(COLUMN_TOKEN, column))
                    .unwrap_or_else(|| "NULL".to_string()),
            ),
            _ => result
                .mask_type_def
                .as_ref()
                .and_then(|def| self.compile_def(def, column)),
        }
    }

    fn compile_def(&self, def: &MaskTypeDef, column: &str) -> Option<String> {
        match def.name.as_str() {
            mask_types::MASK => Some(self.obfuscate(column, false)),
            mask_types::MASK_SHOW_FIRST_4 if self.compat.positional_replace => {
                Some(self.obfuscate(column, true))
            }
            mask_types::MASK_SHOW_FIRST_4 => {
                // Engine's regexp_replace has no start position; splice the
                // raw prefix and obfuscate the remainder.
                let rest = format!("substr({}, 5)", column);
                Some(format!(
                    "concat(substr({}, 0, 4), {})",
                    column,
                    self.obfuscate(&rest, false)
                ))
            }
            mask_types::MASK_SHOW_LAST_4 => {
                let head = format!("left({}, length({}) - 4)", column, column);
                Some(format!(
                    "concat({}, right({}, 4))",
                    self.obfuscate(&head, false),
                    column
                ))
            }
            mask_types::MASK_HASH => Some(format!("md5(cast({} as string))", column)),
            mask_types::MASK_DATE_SHOW_YEAR => Some(format!("trunc({}, 'YEAR')", column)),
            other => match def.transformer.as_deref() {
                Some(transformer) if !transformer.is_empty() => {
                    Some(transformer.replace(COLUMN_TOKEN, column))
                }
                _ => {
                    debug!(
                        mask_type = other,
                        "unrecognized mask type without transformer, column passes unmasked"
                    );
                    None
                }
            },
        }
    }

    /// Chained character-class substitution: uppercase to `X`, lowercase to
    /// `x`, digits to `n`. With `short_form` each replace starts at
    /// position 5, leaving the first four characters untouched.
    fn obfuscate(&self, expr: &str, short_form: bool) -> String {
        let pos = if short_form { ", 5" } else { "" };
        format!(
            "regexp_replace(regexp_replace(regexp_replace({expr}, '[A-Z]', 'X'{pos}), \
             '[a-z]', 'x'{pos}), '[0-9]', 'n'{pos})"
        )
    }
}
