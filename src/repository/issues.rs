//! Issue registry repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};

use super::returned_row;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::IssueStatus,
        issue::{Issue, NewIssue},
    },
};

const ISSUE_COLUMNS: &str = "issue_id, isbn, reader_id, req_id, issue_approver_id, issue_status, \
     issue_date, expected_return_date, return_date, return_approver_id";

#[derive(Clone)]
pub struct IssuesRepository {
    pool: Pool<Sqlite>,
}

impl IssuesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, issue_id: i64) -> AppResult<Issue> {
        sqlx::query_as::<_, Issue>(&format!(
            "SELECT {} FROM issue_registry WHERE issue_id = ?",
            ISSUE_COLUMNS
        ))
        .bind(issue_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue with id {} not found", issue_id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(&format!(
            "SELECT {} FROM issue_registry ORDER BY issue_id",
            ISSUE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(issues)
    }

    pub async fn list_by_reader(&self, reader_id: i64) -> AppResult<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(&format!(
            "SELECT {} FROM issue_registry WHERE reader_id = ? ORDER BY issue_id",
            ISSUE_COLUMNS
        ))
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(issues)
    }

    /// Oldest open loan of `isbn` held by `reader_id`
    pub async fn find_on_loan(&self, isbn: &str, reader_id: i64) -> AppResult<Option<Issue>> {
        let issue = sqlx::query_as::<_, Issue>(&format!(
            r#"
            SELECT {} FROM issue_registry
            WHERE isbn = ? AND reader_id = ? AND issue_status IN ('issued', 'overdue')
            ORDER BY issue_id
            LIMIT 1
            "#,
            ISSUE_COLUMNS
        ))
        .bind(isbn)
        .bind(reader_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(issue)
    }

    pub async fn count_on_loan_for_book(&self, isbn: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issue_registry WHERE isbn = ? AND issue_status IN ('issued', 'overdue')",
        )
        .bind(isbn)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_on_loan_for_reader(&self, reader_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issue_registry WHERE reader_id = ? AND issue_status IN ('issued', 'overdue')",
        )
        .bind(reader_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Move the due date of an open loan
    pub async fn update_due_date(&self, issue_id: i64, expected_return_date: DateTime<Utc>) -> AppResult<Option<Issue>> {
        let issue = sqlx::query_as::<_, Issue>(&format!(
            r#"
            UPDATE issue_registry SET
                expected_return_date = ?,
                issue_status = CASE WHEN ? > ? THEN 'issued' ELSE issue_status END
            WHERE issue_id = ? AND issue_status IN ('issued', 'overdue')
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(expected_return_date)
        .bind(expected_return_date)
        .bind(Utc::now())
        .bind(issue_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(issue.into_iter().next())
    }

    /// Delete a closed loan. Returns false if the issue is still on loan.
    pub async fn delete_returned(&self, issue_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM issue_registry WHERE issue_id = ? AND issue_status = 'returned'")
            .bind(issue_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Flag every issued loan past its due date as overdue
    pub async fn mark_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE issue_registry SET issue_status = 'overdue' WHERE issue_status = 'issued' AND expected_return_date < ?",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert(conn: &mut SqliteConnection, issue: &NewIssue) -> AppResult<Issue> {
        let created = sqlx::query_as::<_, Issue>(&format!(
            r#"
            INSERT INTO issue_registry (isbn, reader_id, req_id, issue_approver_id, issue_status, issue_date, expected_return_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(&issue.isbn)
        .bind(issue.reader_id)
        .bind(issue.req_id)
        .bind(issue.issue_approver_id)
        .bind(IssueStatus::Issued)
        .bind(issue.issue_date)
        .bind(issue.expected_return_date)
        .fetch_all(conn)
        .await?;
        returned_row(created)
    }

    /// Close an open loan. Returns `None` if the issue is not on loan.
    pub async fn mark_returned(
        conn: &mut SqliteConnection,
        issue_id: i64,
        return_approver_id: i64,
        return_date: DateTime<Utc>,
    ) -> AppResult<Option<Issue>> {
        let issue = sqlx::query_as::<_, Issue>(&format!(
            r#"
            UPDATE issue_registry SET
                issue_status = 'returned', return_date = ?, return_approver_id = ?
            WHERE issue_id = ? AND issue_status IN ('issued', 'overdue')
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(return_date)
        .bind(return_approver_id)
        .bind(issue_id)
        .fetch_all(conn)
        .await?;
        Ok(issue.into_iter().next())
    }
}
