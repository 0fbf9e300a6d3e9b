//! Access requests submitted for authorization decisions.
//!
//! The host engine builds one [`AccessRequest`] per query-plan node that
//! requires a privilege check. Requests are immutable once constructed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Privilege class a query-plan node requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Read rows from a table or column.
    Select,
    /// Modify existing rows.
    Update,
    /// Create a database object.
    Create,
    /// Drop a database object.
    Drop,
    /// Alter a database object.
    Alter,
    /// Read object metadata.
    Read,
    /// Write object metadata.
    Write,
    /// Use a database or catalog.
    Use,
    /// Administrative operations.
    Admin,
    /// All privileges.
    All,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessType::Select => "select",
            AccessType::Update => "update",
            AccessType::Create => "create",
            AccessType::Drop => "drop",
            AccessType::Alter => "alter",
            AccessType::Read => "read",
            AccessType::Write => "write",
            AccessType::Use => "use",
            AccessType::Admin => "admin",
            AccessType::All => "all",
        };
        write!(f, "{}", name)
    }
}

/// Kind of SQL operation the request originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Read-only query plans.
    Query,
    /// DDL/DML commands.
    Command,
}

/// The database object an access request targets.
///
/// `catalog` is absent for the host engine's built-in catalog; `column` is
/// present only for column-level checks (masked projections).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResource {
    /// Owning catalog, if the object lives outside the default catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Database (schema) name.
    pub database: String,
    /// Table name.
    pub table: String,
    /// Column name for column-level requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl AccessResource {
    /// Create a table-level resource.
    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            database: database.into(),
            table: table.into(),
            column: None,
        }
    }

    /// Create a column-level resource.
    pub fn column(
        database: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            catalog: None,
            database: database.into(),
            table: table.into(),
            column: Some(column.into()),
        }
    }

    /// Set the owning catalog.
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Render the `database/table[/column]` form used in denial messages
    /// and audit records.
    pub fn as_string(&self) -> String {
        match &self.column {
            Some(column) => format!("{}/{}/{}", self.database, self.table, column),
            None => format!("{}/{}", self.database, self.table),
        }
    }
}

impl fmt::Display for AccessResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// One resource-access request, produced per query-plan node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// User the query runs as.
    pub user: String,
    /// Group memberships forwarded to the policy service. The service may
    /// re-resolve these from its own user store when configured to.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Target object.
    pub resource: AccessResource,
    /// Required privilege.
    pub access_type: AccessType,
    /// Originating operation kind.
    pub operation: OperationType,
}

impl AccessRequest {
    /// Create a new access request.
    pub fn new(
        user: impl Into<String>,
        resource: AccessResource,
        access_type: AccessType,
        operation: OperationType,
    ) -> Self {
        Self {
            user: user.into(),
            groups: Vec::new(),
            resource,
            access_type,
            operation,
        }
    }

    /// Set the user's group memberships.
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }
}
