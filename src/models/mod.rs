//! Data models for Bibliotheca

pub mod book;
pub mod enums;
pub mod issue;
pub mod library;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use enums::{IssueStatus, RequestStatus, RequestType, Role};
pub use issue::Issue;
pub use library::Library;
pub use request::RequestEvent;
pub use user::User;
