//! Borrow/return request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{RequestStatus, RequestType};

/// A reader's ask to borrow or return a book
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RequestEvent {
    pub req_id: i64,
    /// ISBN of the requested book
    pub book_id: String,
    pub reader_id: i64,
    /// Issue being returned, for return requests
    pub issue_id: Option<i64>,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
    /// Set once an admin approves or rejects
    pub approval_date: Option<DateTime<Utc>>,
    pub approver_id: Option<i64>,
}

/// Create request payload (reader side)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "book_id is required"))]
    pub book_id: String,
    /// Must match the authenticated reader when present
    pub reader_id: Option<i64>,
    #[serde(default)]
    pub request_type: RequestType,
    pub issue_id: Option<i64>,
}

/// Admin decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProcessRequest {
    pub action: RequestAction,
}

/// Request list filters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
}

/// Result of approving or rejecting a request
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessOutcome {
    pub request: RequestEvent,
    /// Issue opened (borrow) or closed (return) by the approval
    pub issue: Option<super::issue::Issue>,
}
