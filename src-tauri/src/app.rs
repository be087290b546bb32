//! Page router: applies an action to a session and renders the page that
//! results.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::AuthRecord;
use crate::config::{AppConfig, FormConfig};
use crate::error::{AppError, Result};
use crate::export::{export_table, ExportFile};
use crate::form::{ActivityForm, RowId, RowUpdate};
use crate::pages::{self, Notice, PageBody, PageView};
use crate::record::SapUsage;
use crate::session::{Page, SessionState};
use crate::store::{SubmissionRepository, SubmissionStore};

/// Everything a user can do on a page.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Re-render the current page.
    Refresh,
    OpenAdminLogin,
    OpenMyActivities,
    BackToMainForm,
    UpdateDetails {
        #[serde(default)]
        employee_code: Option<String>,
        #[serde(default)]
        full_name: Option<String>,
        #[serde(default)]
        sap_usage: Option<SapUsage>,
        #[serde(default)]
        sap_username: Option<String>,
    },
    SetActivityCount {
        count: usize,
    },
    UpdateRow {
        row: RowId,
        #[serde(default)]
        update: RowUpdate,
    },
    /// Submit the draft, or `form` when the client sends the whole form.
    SubmitActivities {
        #[serde(default)]
        form: Option<ActivityForm>,
    },
    AdminLogin {
        password: String,
    },
    Logout,
    FilterSubmissions {
        code: String,
    },
    ViewMyActivities {
        employee_code: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::OpenAdminLogin => "open_admin_login",
            Self::OpenMyActivities => "open_my_activities",
            Self::BackToMainForm => "back_to_main_form",
            Self::UpdateDetails { .. } => "update_details",
            Self::SetActivityCount { .. } => "set_activity_count",
            Self::UpdateRow { .. } => "update_row",
            Self::SubmitActivities { .. } => "submit_activities",
            Self::AdminLogin { .. } => "admin_login",
            Self::Logout => "logout",
            Self::FilterSubmissions { .. } => "filter_submissions",
            Self::ViewMyActivities { .. } => "view_my_activities",
        }
    }

    pub fn allowed_on(&self, page: Page) -> bool {
        match self {
            Self::Refresh => true,
            Self::BackToMainForm => page != Page::MainForm,
            Self::OpenAdminLogin
            | Self::OpenMyActivities
            | Self::UpdateDetails { .. }
            | Self::SetActivityCount { .. }
            | Self::UpdateRow { .. }
            | Self::SubmitActivities { .. } => page == Page::MainForm,
            Self::AdminLogin { .. } => page == Page::AdminLogin,
            Self::Logout | Self::FilterSubmissions { .. } => page == Page::AdminDashboard,
            Self::ViewMyActivities { .. } => page == Page::UserLogin,
        }
    }
}

/// Shared application context. Sessions are passed in per call and never
/// stored here.
pub struct ActivityApp {
    repository: Arc<dyn SubmissionRepository>,
    credential: AuthRecord,
    limits: FormConfig,
}

impl ActivityApp {
    pub fn new(
        repository: Arc<dyn SubmissionRepository>,
        credential: AuthRecord,
        limits: FormConfig,
    ) -> Self {
        Self {
            repository,
            credential,
            limits,
        }
    }

    /// Open the configured store and resolve the admin credential.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let store = SubmissionStore::open(config.store.path.clone())?;
        let credential = config.admin.credential()?;
        Ok(Self::new(Arc::new(store), credential, config.form))
    }

    pub fn limits(&self) -> &FormConfig {
        &self.limits
    }

    /// Start a session with a draft sized to the minimum activity count.
    pub fn new_session(&self) -> SessionState {
        let mut session = SessionState::new();
        session
            .draft
            .set_activity_count(self.limits.min_activities, &self.limits);
        session
    }

    /// Apply `action` and render the resulting page. Errors never escape:
    /// they become notices on the rendered page.
    pub fn handle(&self, session: &mut SessionState, action: Action) -> PageView {
        let mut notices = Vec::new();
        let current = session.page();
        let outcome = if action.allowed_on(current) {
            self.apply(session, action, &mut notices)
        } else {
            Err(AppError::InvalidAction {
                action: action.name(),
                page: current.as_str(),
            })
        };
        if let Err(err) = outcome {
            warn!(error = %err, label = err.label(), page = current.as_str(), "page action failed");
            notices.push(Notice::from_error(&err));
        }
        self.render(session, notices)
    }

    /// Render the current page without changing anything.
    pub fn render(&self, session: &SessionState, mut notices: Vec<Notice>) -> PageView {
        let page = session.page();
        let (title, body) = match page {
            Page::MainForm => (
                "Employee Activity Log".to_string(),
                PageBody::MainForm(pages::main_form(&session.draft, &self.limits)),
            ),
            Page::AdminLogin => ("Admin Login".to_string(), PageBody::AdminLogin),
            Page::AdminDashboard => (
                "Admin Dashboard".to_string(),
                PageBody::AdminDashboard(pages::admin_dashboard(
                    self.repository.as_ref(),
                    session.admin_filter(),
                    &mut notices,
                )),
            ),
            Page::UserLogin => ("My Activities Dashboard".to_string(), PageBody::UserLogin),
            Page::UserDashboard => {
                let code = session.viewed_employee_code().unwrap_or_default();
                (
                    format!("Dashboard for {code}"),
                    PageBody::UserDashboard(pages::user_dashboard(
                        self.repository.as_ref(),
                        code,
                        &mut notices,
                    )),
                )
            }
        };
        PageView {
            page,
            title,
            can_go_back: page != Page::MainForm,
            notices,
            body,
        }
    }

    /// CSV of the admin's current filtered view.
    pub fn export_submissions(&self, session: &SessionState, filename: &str) -> Result<ExportFile> {
        if session.page() != Page::AdminDashboard {
            return Err(AppError::InvalidAction {
                action: "export_submissions",
                page: session.page().as_str(),
            });
        }
        let table = self.repository.load_all()?;
        let view = pages::filtered_for_admin(&table, session.admin_filter());
        let file = export_table(&view, filename);
        info!(rows = file.rows, filename = %file.filename, "submissions exported");
        Ok(file)
    }

    fn apply(
        &self,
        session: &mut SessionState,
        action: Action,
        notices: &mut Vec<Notice>,
    ) -> Result<()> {
        match action {
            Action::Refresh => {}
            Action::OpenAdminLogin => {
                let target = if session.is_admin_authenticated() {
                    Page::AdminDashboard
                } else {
                    Page::AdminLogin
                };
                session.navigate_to(target);
            }
            Action::OpenMyActivities => {
                session.navigate_to(Page::UserLogin);
            }
            Action::BackToMainForm => {
                session.navigate_to(Page::MainForm);
            }
            Action::UpdateDetails {
                employee_code,
                full_name,
                sap_usage,
                sap_username,
            } => {
                let draft = &mut session.draft;
                if let Some(value) = employee_code {
                    draft.employee_code = value;
                }
                if let Some(value) = full_name {
                    draft.full_name = value;
                }
                if let Some(value) = sap_usage {
                    draft.sap_usage = value;
                }
                if let Some(value) = sap_username {
                    draft.sap_username = value;
                }
            }
            Action::SetActivityCount { count } => {
                session.draft.set_activity_count(count, &self.limits);
            }
            Action::UpdateRow { row, update } => {
                session.draft.update_row(row, update)?;
            }
            Action::SubmitActivities { form } => {
                if let Some(form) = form {
                    session.draft.replace_with(form, &self.limits);
                }
                pages::submit_activities(self.repository.as_ref(), &session.draft, notices)?;
            }
            Action::AdminLogin { password } => {
                if !self.credential.verify(password.as_str()) {
                    return Err(AppError::Auth);
                }
                session.grant_admin();
                info!("admin login succeeded");
                notices.push(Notice::success("Login successful!"));
            }
            Action::Logout => {
                session.logout_admin();
                info!("admin logged out");
            }
            Action::FilterSubmissions { code } => {
                session.set_admin_filter(code.trim());
            }
            Action::ViewMyActivities { employee_code } => {
                let code = employee_code.trim();
                if code.is_empty() {
                    return Err(AppError::validation(
                        "employee_code",
                        "Please enter an Employee Code.",
                    ));
                }
                session.view_employee(code);
            }
        }
        Ok(())
    }
}
