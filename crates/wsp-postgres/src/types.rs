//! Enumerations and pagination types shared by the model and query modules.

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Tiered capability-key permission. Ordered: `Write` ⊇ `Append` ⊇ `Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::CapabilityPermission"]
pub enum CapabilityPermission {
    /// May read resources within scope.
    #[db_rename = "read"]
    #[serde(rename = "read")]
    Read,
    /// May read and append within scope.
    #[db_rename = "append"]
    #[serde(rename = "append")]
    Append,
    /// May read, append, and write within scope.
    #[db_rename = "write"]
    #[serde(rename = "write")]
    Write,
}

impl CapabilityPermission {
    /// Returns whether this permission satisfies a route's minimum required tier.
    ///
    /// `Write` satisfies `Append` and `Read` routes; `Append` satisfies only
    /// `Append` and `Read`; `Read` satisfies only `Read`.
    pub fn satisfies(self, required: CapabilityPermission) -> bool {
        self >= required
    }
}

/// The scope a capability key or webhook applies to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::CapabilityScopeType"]
pub enum CapabilityScopeType {
    /// The entire workspace.
    #[db_rename = "workspace"]
    #[serde(rename = "workspace")]
    #[default]
    Workspace,
    /// A folder subtree, optionally recursive.
    #[db_rename = "folder"]
    #[serde(rename = "folder")]
    Folder,
    /// A single file.
    #[db_rename = "file"]
    #[serde(rename = "file")]
    File,
}

/// The category of an append-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::AppendType"]
pub enum AppendType {
    #[db_rename = "task"]
    #[serde(rename = "task")]
    Task,
    #[db_rename = "claim"]
    #[serde(rename = "claim")]
    Claim,
    #[db_rename = "response"]
    #[serde(rename = "response")]
    Response,
    #[db_rename = "comment"]
    #[serde(rename = "comment")]
    Comment,
    #[db_rename = "blocked"]
    #[serde(rename = "blocked")]
    Blocked,
    #[db_rename = "answer"]
    #[serde(rename = "answer")]
    Answer,
    #[db_rename = "renew"]
    #[serde(rename = "renew")]
    Renew,
    #[db_rename = "cancel"]
    #[serde(rename = "cancel")]
    Cancel,
    #[db_rename = "vote"]
    #[serde(rename = "vote")]
    Vote,
}

/// The lifecycle state of a task or claim append. `None` for entry types that
/// carry no state machine (response, comment, answer, renew, cancel, vote).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::AppendStatus"]
pub enum AppendStatus {
    #[db_rename = "pending"]
    #[serde(rename = "pending")]
    Pending,
    #[db_rename = "claimed"]
    #[serde(rename = "claimed")]
    Claimed,
    #[db_rename = "completed"]
    #[serde(rename = "completed")]
    Completed,
    #[db_rename = "blocked"]
    #[serde(rename = "blocked")]
    Blocked,
    #[db_rename = "expired"]
    #[serde(rename = "expired")]
    Expired,
    #[db_rename = "active"]
    #[serde(rename = "active")]
    Active,
    #[db_rename = "released"]
    #[serde(rename = "released")]
    Released,
    #[db_rename = "cancelled"]
    #[serde(rename = "cancelled")]
    Cancelled,
}

/// The outcome of a single webhook delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::DeliveryStatus"]
pub enum DeliveryStatus {
    #[db_rename = "ok"]
    #[serde(rename = "ok")]
    Ok,
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    Failed,
    #[db_rename = "timeout"]
    #[serde(rename = "timeout")]
    Timeout,
    #[db_rename = "error"]
    #[serde(rename = "error")]
    Error,
}

impl DeliveryStatus {
    /// Returns whether this outcome counts toward the consecutive-failure breaker.
    pub fn is_failure(self) -> bool {
        !matches!(self, DeliveryStatus::Ok)
    }
}

/// A scope granted to a server-to-server API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::ApiKeyScope"]
pub enum ApiKeyScope {
    #[db_rename = "read"]
    #[serde(rename = "read")]
    Read,
    #[db_rename = "append"]
    #[serde(rename = "append")]
    Append,
    #[db_rename = "write"]
    #[serde(rename = "write")]
    Write,
    #[db_rename = "export"]
    #[serde(rename = "export")]
    Export,
}

/// Offset-based pagination parameters for database queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
}

impl Pagination {
    /// Creates a new pagination, clamping `limit` to `[1, 1000]` and `offset` to `>= 0`.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, 1000),
            offset: offset.max(0),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(50, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_satisfies_every_lower_tier() {
        assert!(CapabilityPermission::Write.satisfies(CapabilityPermission::Read));
        assert!(CapabilityPermission::Write.satisfies(CapabilityPermission::Append));
        assert!(CapabilityPermission::Write.satisfies(CapabilityPermission::Write));
    }

    #[test]
    fn read_does_not_satisfy_higher_tiers() {
        assert!(!CapabilityPermission::Read.satisfies(CapabilityPermission::Append));
        assert!(!CapabilityPermission::Read.satisfies(CapabilityPermission::Write));
    }

    #[test]
    fn append_satisfies_read_and_append_only() {
        assert!(CapabilityPermission::Append.satisfies(CapabilityPermission::Read));
        assert!(CapabilityPermission::Append.satisfies(CapabilityPermission::Append));
        assert!(!CapabilityPermission::Append.satisfies(CapabilityPermission::Write));
    }

    #[test]
    fn delivery_status_failure_classification() {
        assert!(!DeliveryStatus::Ok.is_failure());
        assert!(DeliveryStatus::Failed.is_failure());
        assert!(DeliveryStatus::Timeout.is_failure());
        assert!(DeliveryStatus::Error.is_failure());
    }

    #[test]
    fn pagination_clamps_bounds() {
        let p = Pagination::new(0, -5);
        assert_eq!(p.limit, 1);
        assert_eq!(p.offset, 0);

        let p = Pagination::new(5000, 10);
        assert_eq!(p.limit, 1000);
    }
}
