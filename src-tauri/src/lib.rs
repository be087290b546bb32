//! Employee activity logger.
//!
//! Employees record recurring work activities into a shared CSV file; an
//! administrator reviews and filters every submission; employees look up
//! their own history by employee code. [`ActivityApp`] routes page actions
//! against a caller-owned [`SessionState`] and returns a serialisable
//! [`PageView`].

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod pages;
pub mod record;
pub mod session;
pub mod store;
pub mod table;

pub use app::{Action, ActivityApp};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use pages::{Notice, NoticeLevel, PageBody, PageView};
pub use record::ActivityRecord;
pub use session::{Page, SessionState};
pub use store::{filter_by_employee_code, CodeMatch, SubmissionRepository, SubmissionStore};
pub use table::SubmissionTable;
