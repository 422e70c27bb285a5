use super::{datetime_column, enum_column, optional_datetime_column};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use strum_macros::{Display, EnumString};

/// Lifecycle of a change request. Only `Pending` has outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Deleted,
}

impl ApprovalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

/// Kind of record a change request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString)]
pub enum ApprovalKind {
    Flight,
    SeatClass,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    pub service_provider: String,
    /// `Flight` or `SeatClass`
    pub name: String,
    pub updating_id: String,
    #[serde(rename = "approval")]
    pub status: ApprovalStatus,
    pub requested_on: DateTime<Utc>,
    pub approved_on: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, AnyRow> for Approval {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Approval {
            id: row.try_get("id")?,
            service_provider: row.try_get("service_provider")?,
            name: row.try_get("name")?,
            updating_id: row.try_get("updating_id")?,
            status: enum_column(row, "status")?,
            requested_on: datetime_column(row, "requested_on")?,
            approved_on: optional_datetime_column(row, "approved_on")?,
        })
    }
}

#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct GroupedApprovals {
    pub pending: Vec<Approval>,
    pub approved: Vec<Approval>,
    pub rejected: Vec<Approval>,
    pub deleted: Vec<Approval>,
}

impl GroupedApprovals {
    pub fn from_approvals(approvals: Vec<Approval>) -> Self {
        let mut grouped = GroupedApprovals::default();
        for approval in approvals {
            let bucket = match approval.status {
                ApprovalStatus::Pending => &mut grouped.pending,
                ApprovalStatus::Approved => &mut grouped.approved,
                ApprovalStatus::Rejected => &mut grouped.rejected,
                ApprovalStatus::Deleted => &mut grouped.deleted,
            };
            bucket.push(approval);
        }
        grouped
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ApprovalListResponse {
    pub approvals: Vec<Approval>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GroupedApprovalsResponse {
    pub approvals: GroupedApprovals,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ApprovalDecisionResponse {
    pub message: String,
    pub approval: Approval,
}
