//! Page views and the handlers that build them.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::FormConfig;
use crate::error::{AppError, Result};
use crate::form::ActivityForm;
use crate::record::{
    ACTIVITY_COLUMNS, COL_FULL_NAME, COL_SAP_USERNAME, NOT_APPLICABLE,
};
use crate::session::Page;
use crate::store::{filter_by_employee_code, CodeMatch, SubmissionRepository};
use crate::table::SubmissionTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// An inline message shown on the rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            field: None,
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        match err {
            AppError::Validation { field, message } => Self {
                level: NoticeLevel::Warning,
                message: message.clone(),
                field: Some(field.clone()),
            },
            AppError::StoreWrite { .. } => Self::error(format!("Failed to save data: {err}")),
            AppError::StoreRead { .. } | AppError::MalformedStore { .. } => {
                Self::error(format!("Could not load data: {err}"))
            }
            _ => Self::error(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub page: Page,
    pub title: String,
    pub can_go_back: bool,
    pub notices: Vec<Notice>,
    pub body: PageBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageBody {
    MainForm(MainFormView),
    AdminLogin,
    AdminDashboard(AdminDashboardView),
    UserLogin,
    UserDashboard(UserDashboardView),
}

#[derive(Debug, Clone, Serialize)]
pub struct MainFormView {
    pub form: ActivityForm,
    pub rows_visible: bool,
    pub sap_username_visible: bool,
    pub min_activities: usize,
    pub max_activities: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboardView {
    pub filter: String,
    pub total: usize,
    pub submissions: SubmissionTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    pub full_name: String,
    pub employee_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sap_username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDashboardView {
    pub employee_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<EmployeeSummary>,
    pub activities: SubmissionTable,
}

pub fn main_form(draft: &ActivityForm, limits: &FormConfig) -> MainFormView {
    MainFormView {
        form: draft.clone(),
        rows_visible: draft.rows_visible(),
        sap_username_visible: draft.sap_username_visible(),
        min_activities: limits.min_activities,
        max_activities: limits.max_activities,
    }
}

/// Validate the draft and append its non-blank rows as one batch.
///
/// Returns the number of rows written; zero means nothing was appended.
pub fn submit_activities(
    repository: &dyn SubmissionRepository,
    draft: &ActivityForm,
    notices: &mut Vec<Notice>,
) -> Result<usize> {
    let submission = draft.assemble()?;
    if submission.records.is_empty() {
        notices.push(Notice::warning(
            "Please fill in at least one Activity Name before submitting.",
        ));
        return Ok(0);
    }
    let written = repository.append(&submission.records)?;
    info!(
        rows = written,
        discarded = submission.discarded_rows,
        "activity submission stored"
    );
    notices.push(Notice::success(format!(
        "Successfully submitted {written} activities for {}!",
        draft.full_name.trim()
    )));
    Ok(written)
}

pub fn admin_dashboard(
    repository: &dyn SubmissionRepository,
    filter: &str,
    notices: &mut Vec<Notice>,
) -> AdminDashboardView {
    let mut view = AdminDashboardView {
        filter: filter.to_string(),
        total: 0,
        submissions: SubmissionTable::empty(),
    };
    let table = match repository.load_all() {
        Ok(table) => table,
        Err(err) => {
            warn!(error = %err, label = err.label(), "admin dashboard could not load submissions");
            notices.push(Notice::from_error(&err));
            return view;
        }
    };
    if table.is_empty() {
        notices.push(Notice::info("No submissions have been made yet."));
        return view;
    }
    view.total = table.len();
    view.submissions = filtered_for_admin(&table, filter);
    notices.push(Notice::success(format!(
        "Displaying {} entries.",
        view.submissions.len()
    )));
    view
}

/// The admin's current view of the table. A blank filter shows everything.
pub fn filtered_for_admin(table: &SubmissionTable, filter: &str) -> SubmissionTable {
    let filter = filter.trim();
    if filter.is_empty() {
        table.clone()
    } else {
        filter_by_employee_code(table, filter, CodeMatch::Contains)
    }
}

pub fn user_dashboard(
    repository: &dyn SubmissionRepository,
    employee_code: &str,
    notices: &mut Vec<Notice>,
) -> UserDashboardView {
    let mut view = UserDashboardView {
        employee_code: employee_code.to_string(),
        summary: None,
        activities: SubmissionTable::empty().select(&ACTIVITY_COLUMNS),
    };
    let table = match repository.load_all() {
        Ok(table) => table,
        Err(err) => {
            warn!(error = %err, label = err.label(), "user dashboard could not load submissions");
            notices.push(Notice::from_error(&err));
            return view;
        }
    };
    if table.is_empty() {
        notices.push(Notice::info("No submissions have been made yet."));
        return view;
    }
    let mine = filter_by_employee_code(&table, employee_code, CodeMatch::Exact);
    if mine.is_empty() {
        notices.push(Notice::info("No submissions found for this Employee Code."));
        return view;
    }
    let sap_username = mine
        .cell(0, COL_SAP_USERNAME)
        .filter(|name| !name.is_empty() && *name != NOT_APPLICABLE)
        .map(String::from);
    view.summary = Some(EmployeeSummary {
        full_name: mine.cell(0, COL_FULL_NAME).unwrap_or_default().to_string(),
        employee_code: employee_code.to_string(),
        sap_username,
    });
    view.activities = mine.select(&ACTIVITY_COLUMNS);
    view
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::record::{
        ActivityRecord, Automatable, CoreActivity, Frequency, SapUsage, SUBMISSION_COLUMNS,
    };

    #[derive(Default)]
    struct MemoryRepository {
        rows: Mutex<Vec<ActivityRecord>>,
        appends: Mutex<usize>,
        fail_reads: bool,
    }

    impl SubmissionRepository for MemoryRepository {
        fn append(&self, records: &[ActivityRecord]) -> Result<usize> {
            *self.appends.lock().unwrap() += 1;
            self.rows.lock().unwrap().extend_from_slice(records);
            Ok(records.len())
        }

        fn load_all(&self) -> Result<SubmissionTable> {
            if self.fail_reads {
                return Err(AppError::MalformedStore {
                    line: 3,
                    reason: "unterminated quoted field".to_string(),
                });
            }
            let rows = self.rows.lock().unwrap().iter().map(ActivityRecord::to_row).collect();
            Ok(SubmissionTable::new(
                SUBMISSION_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows,
            ))
        }
    }

    fn record(code: &str, sap: SapUsage, sap_username: &str) -> ActivityRecord {
        ActivityRecord {
            employee_code: code.to_string(),
            full_name: "Jane Doe".to_string(),
            sap_usage: sap,
            sap_username: sap_username.to_string(),
            activity_name: "Stock Count".to_string(),
            description: "Weekly count".to_string(),
            frequency: Frequency::Weekly,
            avg_minutes: 60,
            is_core: CoreActivity::Yes,
            automatable: Automatable::Maybe,
        }
    }

    #[test]
    fn all_blank_rows_never_append() {
        let repo = MemoryRepository::default();
        let mut draft = ActivityForm::default();
        draft.employee_code = "EMP001".to_string();
        draft.full_name = "Jane Doe".to_string();
        let mut notices = Vec::new();
        let written = submit_activities(&repo, &draft, &mut notices).unwrap();
        assert_eq!(written, 0);
        assert_eq!(*repo.appends.lock().unwrap(), 0);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
    }

    #[test]
    fn surviving_rows_are_appended_in_one_call() {
        let repo = MemoryRepository::default();
        let limits = FormConfig::default();
        let mut draft = ActivityForm::default();
        draft.employee_code = "EMP001".to_string();
        draft.full_name = "Jane Doe".to_string();
        draft.set_activity_count(4, &limits);
        draft.rows[0].activity_name = "Stock Count".to_string();
        draft.rows[2].activity_name = "Goods Receipt".to_string();

        let mut notices = Vec::new();
        let written = submit_activities(&repo, &draft, &mut notices).unwrap();
        assert_eq!(written, 2);
        assert_eq!(*repo.appends.lock().unwrap(), 1);
        let names: Vec<String> = repo
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.activity_name.clone())
            .collect();
        assert_eq!(names, ["Stock Count", "Goods Receipt"]);
        assert_eq!(
            notices,
            vec![Notice::success("Successfully submitted 2 activities for Jane Doe!")]
        );
    }

    #[test]
    fn admin_dashboard_reports_empty_store() {
        let repo = MemoryRepository::default();
        let mut notices = Vec::new();
        let view = admin_dashboard(&repo, "", &mut notices);
        assert_eq!(view.total, 0);
        assert_eq!(notices, vec![Notice::info("No submissions have been made yet.")]);
    }

    #[test]
    fn admin_dashboard_filters_by_substring() {
        let repo = MemoryRepository::default();
        repo.append(&[
            record("EMP123", SapUsage::None, "N/A"),
            record("emp1", SapUsage::None, "N/A"),
            record("EMP2", SapUsage::None, "N/A"),
        ])
        .unwrap();
        let mut notices = Vec::new();
        let view = admin_dashboard(&repo, "EMP1", &mut notices);
        assert_eq!(view.total, 3);
        assert_eq!(view.submissions.len(), 2);
        assert_eq!(notices, vec![Notice::success("Displaying 2 entries.")]);
    }

    #[test]
    fn read_failures_render_an_error_and_no_rows() {
        let repo = MemoryRepository {
            fail_reads: true,
            ..MemoryRepository::default()
        };
        let mut notices = Vec::new();
        let view = admin_dashboard(&repo, "", &mut notices);
        assert!(view.submissions.is_empty());
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.starts_with("Could not load data:"));
    }

    #[test]
    fn user_dashboard_hides_na_sap_username() {
        let repo = MemoryRepository::default();
        repo.append(&[record("EMP001", SapUsage::None, "N/A")]).unwrap();
        let mut notices = Vec::new();
        let view = user_dashboard(&repo, "emp001", &mut notices);
        let summary = view.summary.unwrap();
        assert_eq!(summary.full_name, "Jane Doe");
        assert_eq!(summary.sap_username, None);
        assert_eq!(view.activities.columns().len(), ACTIVITY_COLUMNS.len());
        assert!(notices.is_empty());
    }

    #[test]
    fn user_dashboard_shows_sap_username_from_first_match() {
        let repo = MemoryRepository::default();
        repo.append(&[
            record("EMP001", SapUsage::Ecc, "JDOE01"),
            record("EMP001", SapUsage::Ecc, "JDOE02"),
        ])
        .unwrap();
        let mut notices = Vec::new();
        let view = user_dashboard(&repo, "EMP001", &mut notices);
        assert_eq!(
            view.summary.and_then(|s| s.sap_username),
            Some("JDOE01".to_string())
        );
        assert_eq!(view.activities.len(), 2);
    }

    #[test]
    fn user_dashboard_without_matches_says_so() {
        let repo = MemoryRepository::default();
        repo.append(&[record("EMP0011", SapUsage::None, "N/A")]).unwrap();
        let mut notices = Vec::new();
        let view = user_dashboard(&repo, "EMP001", &mut notices);
        assert!(view.summary.is_none());
        assert!(view.activities.is_empty());
        assert_eq!(
            notices,
            vec![Notice::info("No submissions found for this Employee Code.")]
        );
    }

    #[test]
    fn user_dashboard_on_empty_store_says_nothing_was_submitted() {
        let repo = MemoryRepository::default();
        let mut notices = Vec::new();
        let view = user_dashboard(&repo, "EMP001", &mut notices);
        assert!(view.summary.is_none());
        assert!(view.activities.is_empty());
        assert_eq!(
            notices,
            vec![Notice::info("No submissions have been made yet.")]
        );
    }
}
