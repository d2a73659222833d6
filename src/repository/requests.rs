//! Request events repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};

use super::returned_row;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{RequestStatus, RequestType},
        request::RequestEvent,
    },
};

const REQUEST_COLUMNS: &str =
    "req_id, book_id, reader_id, issue_id, request_type, status, request_date, approval_date, approver_id";

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Sqlite>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, req_id: i64) -> AppResult<RequestEvent> {
        sqlx::query_as::<_, RequestEvent>(&format!(
            "SELECT {} FROM request_events WHERE req_id = ?",
            REQUEST_COLUMNS
        ))
        .bind(req_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", req_id)))
    }

    /// List requests, oldest first, optionally restricted to one status
    pub async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<RequestEvent>> {
        let requests = sqlx::query_as::<_, RequestEvent>(&format!(
            "SELECT {} FROM request_events WHERE (? IS NULL OR status = ?) ORDER BY req_id",
            REQUEST_COLUMNS
        ))
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_by_reader(&self, reader_id: i64) -> AppResult<Vec<RequestEvent>> {
        let requests = sqlx::query_as::<_, RequestEvent>(&format!(
            "SELECT {} FROM request_events WHERE reader_id = ? ORDER BY req_id",
            REQUEST_COLUMNS
        ))
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Pending requests filed by `reader_id`
    pub async fn count_pending_for_reader(&self, reader_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM request_events WHERE reader_id = ? AND status = 'pending'",
        )
        .bind(reader_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Record a new pending request
    pub async fn create(
        &self,
        book_id: &str,
        reader_id: i64,
        request_type: RequestType,
        issue_id: Option<i64>,
        request_date: DateTime<Utc>,
    ) -> AppResult<RequestEvent> {
        let request = sqlx::query_as::<_, RequestEvent>(&format!(
            r#"
            INSERT INTO request_events (book_id, reader_id, issue_id, request_type, status, request_date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(book_id)
        .bind(reader_id)
        .bind(issue_id)
        .bind(request_type)
        .bind(RequestStatus::Pending)
        .bind(request_date)
        .fetch_all(&self.pool)
        .await?;
        returned_row(request)
    }

    pub async fn delete(&self, req_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM request_events WHERE req_id = ?")
            .bind(req_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request with id {} not found", req_id)));
        }
        Ok(())
    }

    /// Move a pending request to `status`, stamping the approver.
    /// Returns `None` if the request was no longer pending.
    pub async fn mark_processed(
        conn: &mut SqliteConnection,
        req_id: i64,
        status: RequestStatus,
        approver_id: i64,
        approval_date: DateTime<Utc>,
        issue_id: Option<i64>,
    ) -> AppResult<Option<RequestEvent>> {
        let request = sqlx::query_as::<_, RequestEvent>(&format!(
            r#"
            UPDATE request_events SET
                status = ?, approver_id = ?, approval_date = ?, issue_id = COALESCE(?, issue_id)
            WHERE req_id = ? AND status = 'pending'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(status)
        .bind(approver_id)
        .bind(approval_date)
        .bind(issue_id)
        .bind(req_id)
        .fetch_all(conn)
        .await?;
        Ok(request.into_iter().next())
    }

    /// Link a processed borrow request to the issue it produced
    pub async fn attach_issue(conn: &mut SqliteConnection, req_id: i64, issue_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE request_events SET issue_id = ? WHERE req_id = ?")
            .bind(issue_id)
            .bind(req_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
