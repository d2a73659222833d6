//! Lending lifecycle: request → approval → issue → return
//!
//! Every transition that touches more than one row runs in a single
//! transaction whose first statement is a conditional write, so concurrent
//! approvals serialise on the database and can never overdraw a title.

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        enums::{RequestStatus, RequestType, Role},
        issue::{Issue, NewIssue, UpdateIssue},
        request::{CreateRequest, ProcessOutcome, RequestAction, RequestEvent},
        user::User,
    },
    repository::{
        books::BooksRepository, issues::IssuesRepository, requests::RequestsRepository,
        users::UsersRepository, Repository,
    },
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    loan_period: Duration,
}

impl LendingService {
    pub fn new(repository: Repository, config: &LendingConfig) -> AppResult<Self> {
        let loan_period = config
            .loan_period()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self { repository, loan_period })
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// File a borrow or return request on behalf of `reader`
    pub async fn create_request(&self, reader: &User, data: CreateRequest) -> AppResult<RequestEvent> {
        if let Some(reader_id) = data.reader_id {
            if reader_id != reader.id {
                return Err(AppError::Authorization(
                    "Readers can only file requests for themselves".to_string(),
                ));
            }
        }

        self.repository.books.get_by_isbn(&data.book_id).await?;

        let issue_id = match data.request_type {
            RequestType::Borrow => {
                if data.issue_id.is_some() {
                    return Err(AppError::Validation(
                        "issue_id only applies to return requests".to_string(),
                    ));
                }
                None
            }
            RequestType::Return => {
                let issue = self.open_issue(reader.id, &data.book_id, data.issue_id).await?;
                Some(issue.issue_id)
            }
        };

        let request = self
            .repository
            .requests
            .create(&data.book_id, reader.id, data.request_type, issue_id, Utc::now())
            .await?;

        tracing::info!(
            req_id = request.req_id,
            reader_id = reader.id,
            isbn = %request.book_id,
            request_type = %request.request_type,
            "request filed"
        );
        Ok(request)
    }

    pub async fn list_requests(&self, status: Option<RequestStatus>) -> AppResult<Vec<RequestEvent>> {
        self.repository.requests.list(status).await
    }

    pub async fn reader_requests(&self, reader_id: i64) -> AppResult<Vec<RequestEvent>> {
        self.repository.requests.list_by_reader(reader_id).await
    }

    pub async fn get_request(&self, req_id: i64) -> AppResult<RequestEvent> {
        self.repository.requests.get_by_id(req_id).await
    }

    pub async fn delete_request(&self, req_id: i64) -> AppResult<()> {
        self.repository.requests.delete(req_id).await
    }

    /// Apply an admin decision to a pending request
    pub async fn process_request(&self, req_id: i64, action: RequestAction, admin: &User) -> AppResult<ProcessOutcome> {
        match action {
            RequestAction::Approve => self.approve(req_id, admin.id).await,
            RequestAction::Reject => {
                let request = self.reject(req_id, admin.id).await?;
                Ok(ProcessOutcome { request, issue: None })
            }
        }
    }

    /// Approve a pending request. Borrowing takes a copy and opens an issue;
    /// returning closes the referenced issue and puts the copy back.
    pub async fn approve(&self, req_id: i64, admin_id: i64) -> AppResult<ProcessOutcome> {
        let request = self.repository.requests.get_by_id(req_id).await?;
        ensure_pending(&request)?;

        let now = Utc::now();
        match request.request_type {
            RequestType::Borrow => self.approve_borrow(request, admin_id, now).await,
            RequestType::Return => self.approve_return(request, admin_id, now).await,
        }
    }

    async fn approve_borrow(&self, request: RequestEvent, admin_id: i64, now: DateTime<Utc>) -> AppResult<ProcessOutcome> {
        let mut tx = self.repository.pool.begin().await?;

        let approved = RequestsRepository::mark_processed(
            &mut tx,
            request.req_id,
            RequestStatus::Approved,
            admin_id,
            now,
            None,
        )
        .await?
        .ok_or_else(|| already_processed(request.req_id))?;

        if UsersRepository::role_of(&mut tx, request.reader_id).await? != Some(Role::Reader) {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "Reader with id {} not found",
                request.reader_id
            )));
        }

        if !BooksRepository::take_copy(&mut tx, &request.book_id).await? {
            tx.rollback().await?;
            // Distinguish a vanished title from an empty shelf
            self.repository.books.get_by_isbn(&request.book_id).await?;
            tracing::info!(req_id = request.req_id, isbn = %request.book_id, "approval refused, no copies left");
            return Err(AppError::Capacity(format!(
                "No copies of {} are available",
                request.book_id
            )));
        }

        let issue = IssuesRepository::insert(
            &mut tx,
            &NewIssue {
                isbn: request.book_id.clone(),
                reader_id: request.reader_id,
                req_id: Some(request.req_id),
                issue_approver_id: admin_id,
                issue_date: now,
                expected_return_date: now + self.loan_period,
            },
        )
        .await?;
        RequestsRepository::attach_issue(&mut tx, request.req_id, issue.issue_id).await?;

        tx.commit().await?;

        tracing::info!(
            req_id = request.req_id,
            issue_id = issue.issue_id,
            isbn = %issue.isbn,
            approver_id = admin_id,
            "book issued"
        );

        Ok(ProcessOutcome {
            request: RequestEvent {
                issue_id: Some(issue.issue_id),
                ..approved
            },
            issue: Some(issue),
        })
    }

    async fn approve_return(&self, request: RequestEvent, admin_id: i64, now: DateTime<Utc>) -> AppResult<ProcessOutcome> {
        let issue_id = match request.issue_id {
            Some(id) => id,
            None => self.open_issue(request.reader_id, &request.book_id, None).await?.issue_id,
        };

        let mut tx = self.repository.pool.begin().await?;

        let approved = RequestsRepository::mark_processed(
            &mut tx,
            request.req_id,
            RequestStatus::Approved,
            admin_id,
            now,
            Some(issue_id),
        )
        .await?
        .ok_or_else(|| already_processed(request.req_id))?;

        let Some(issue) = IssuesRepository::mark_returned(&mut tx, issue_id, admin_id, now).await? else {
            tx.rollback().await?;
            return Err(AppError::BusinessRule(format!("Issue {} is not on loan", issue_id)));
        };
        restore_copy(&mut tx, &issue.isbn).await?;

        tx.commit().await?;

        tracing::info!(req_id = request.req_id, issue_id, approver_id = admin_id, "book returned");
        Ok(ProcessOutcome {
            request: approved,
            issue: Some(issue),
        })
    }

    /// Reject a pending request; inventory is untouched
    pub async fn reject(&self, req_id: i64, admin_id: i64) -> AppResult<RequestEvent> {
        let request = self.repository.requests.get_by_id(req_id).await?;
        ensure_pending(&request)?;

        let mut conn = self.repository.pool.acquire().await?;
        let rejected = RequestsRepository::mark_processed(
            &mut conn,
            req_id,
            RequestStatus::Rejected,
            admin_id,
            Utc::now(),
            None,
        )
        .await?
        .ok_or_else(|| already_processed(req_id))?;

        tracing::info!(req_id, approver_id = admin_id, "request rejected");
        Ok(rejected)
    }

    // -----------------------------------------------------------------------
    // Issues
    // -----------------------------------------------------------------------

    /// Close an issue directly, without a return request
    pub async fn return_issue(&self, issue_id: i64, admin_id: i64) -> AppResult<Issue> {
        let mut tx = self.repository.pool.begin().await?;

        let Some(issue) = IssuesRepository::mark_returned(&mut tx, issue_id, admin_id, Utc::now()).await? else {
            tx.rollback().await?;
            self.repository.issues.get_by_id(issue_id).await?;
            return Err(AppError::BusinessRule(format!(
                "Issue {} has already been returned",
                issue_id
            )));
        };
        restore_copy(&mut tx, &issue.isbn).await?;

        tx.commit().await?;

        tracing::info!(issue_id, approver_id = admin_id, isbn = %issue.isbn, "book returned");
        Ok(issue)
    }

    pub async fn list_issues(&self) -> AppResult<Vec<Issue>> {
        self.repository.issues.list().await
    }

    pub async fn reader_issues(&self, reader_id: i64) -> AppResult<Vec<Issue>> {
        self.repository.issues.list_by_reader(reader_id).await
    }

    pub async fn get_issue(&self, issue_id: i64) -> AppResult<Issue> {
        self.repository.issues.get_by_id(issue_id).await
    }

    /// Move the due date of an open loan
    pub async fn update_issue(&self, issue_id: i64, data: UpdateIssue) -> AppResult<Issue> {
        let issue = self.repository.issues.get_by_id(issue_id).await?;
        if data.expected_return_date <= issue.issue_date {
            return Err(AppError::Validation(
                "expected_return_date must be after issue_date".to_string(),
            ));
        }

        self.repository
            .issues
            .update_due_date(issue_id, data.expected_return_date)
            .await?
            .ok_or_else(|| AppError::BusinessRule(format!("Issue {} has already been returned", issue_id)))
    }

    /// Delete a returned issue
    pub async fn delete_issue(&self, issue_id: i64) -> AppResult<()> {
        if self.repository.issues.delete_returned(issue_id).await? {
            return Ok(());
        }

        self.repository.issues.get_by_id(issue_id).await?;
        Err(AppError::Conflict(format!(
            "Issue {} is still on loan and cannot be deleted",
            issue_id
        )))
    }

    /// Flag issued loans past their due date as overdue
    pub async fn mark_overdue(&self) -> AppResult<u64> {
        let marked = self.repository.issues.mark_overdue(Utc::now()).await?;
        if marked > 0 {
            tracing::info!(marked, "issues marked overdue");
        }
        Ok(marked)
    }

    /// Resolve the open loan a return request refers to
    async fn open_issue(&self, reader_id: i64, isbn: &str, issue_id: Option<i64>) -> AppResult<Issue> {
        let issue = match issue_id {
            Some(id) => self.repository.issues.get_by_id(id).await?,
            None => self
                .repository
                .issues
                .find_on_loan(isbn, reader_id)
                .await?
                .ok_or_else(|| {
                    AppError::BusinessRule(format!(
                        "Reader {} has no copy of {} on loan",
                        reader_id, isbn
                    ))
                })?,
        };

        if issue.reader_id != reader_id || issue.isbn != isbn {
            return Err(AppError::BusinessRule(format!(
                "Issue {} does not match reader {} and book {}",
                issue.issue_id, reader_id, isbn
            )));
        }
        if !issue.issue_status.is_on_loan() {
            return Err(AppError::BusinessRule(format!(
                "Issue {} has already been returned",
                issue.issue_id
            )));
        }

        Ok(issue)
    }
}

fn ensure_pending(request: &RequestEvent) -> AppResult<()> {
    if request.status != RequestStatus::Pending {
        return Err(already_processed(request.req_id));
    }
    Ok(())
}

fn already_processed(req_id: i64) -> AppError {
    AppError::BusinessRule(format!("Request {} has already been processed", req_id))
}

async fn restore_copy(conn: &mut sqlx::SqliteConnection, isbn: &str) -> AppResult<()> {
    if !BooksRepository::restore_copy(conn, isbn).await? {
        tracing::warn!(isbn = %isbn, "returned copy belongs to a book no longer in inventory");
    }
    Ok(())
}
