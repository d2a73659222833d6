//! Issue registry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::IssueStatus;

/// A copy lent to a reader
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Issue {
    pub issue_id: i64,
    pub isbn: String,
    pub reader_id: i64,
    /// Request that produced this issue
    pub req_id: Option<i64>,
    pub issue_approver_id: i64,
    pub issue_status: IssueStatus,
    pub issue_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    /// Set if and only if `issue_status` is `returned`
    pub return_date: Option<DateTime<Utc>>,
    pub return_approver_id: Option<i64>,
}

/// Values for a new issue row
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub isbn: String,
    pub reader_id: i64,
    pub req_id: Option<i64>,
    pub issue_approver_id: i64,
    pub issue_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
}

/// Update issue request; only the due date of an open loan can change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateIssue {
    pub expected_return_date: DateTime<Utc>,
}

/// Outcome of an overdue sweep
#[derive(Debug, Serialize, ToSchema)]
pub struct OverdueSweep {
    pub marked_overdue: u64,
}
