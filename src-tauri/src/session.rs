//! Per-session navigation state.

use serde::{Deserialize, Serialize};

use crate::form::ActivityForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    MainForm,
    AdminLogin,
    AdminDashboard,
    UserLogin,
    UserDashboard,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MainForm => "main form",
            Self::AdminLogin => "admin login",
            Self::AdminDashboard => "admin dashboard",
            Self::UserLogin => "user login",
            Self::UserDashboard => "user dashboard",
        }
    }
}

/// State for one interactive session. Never shared between sessions and
/// never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    page: Page,
    admin_authenticated: bool,
    viewed_employee_code: Option<String>,
    admin_filter: String,
    pub draft: ActivityForm,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page to render. Guards are re-applied so an inconsistent state can
    /// never render a protected page.
    pub fn page(&self) -> Page {
        self.guard(self.page)
    }

    pub fn is_admin_authenticated(&self) -> bool {
        self.admin_authenticated
    }

    pub fn viewed_employee_code(&self) -> Option<&str> {
        self.viewed_employee_code.as_deref()
    }

    pub fn admin_filter(&self) -> &str {
        &self.admin_filter
    }

    pub fn set_admin_filter(&mut self, filter: impl Into<String>) {
        self.admin_filter = filter.into();
    }

    /// Move to `target`, redirecting protected pages to their login page when
    /// the session does not qualify. Returns the page actually entered.
    pub fn navigate_to(&mut self, target: Page) -> Page {
        let page = self.guard(target);
        if page != target {
            tracing::debug!(
                target_page = target.as_str(),
                redirected_to = page.as_str(),
                "navigation redirected"
            );
        }
        self.page = page;
        page
    }

    pub fn grant_admin(&mut self) -> Page {
        self.admin_authenticated = true;
        self.navigate_to(Page::AdminDashboard)
    }

    /// Clear the admin flag and the admin filter, then return to the main form.
    pub fn logout_admin(&mut self) -> Page {
        self.admin_authenticated = false;
        self.admin_filter.clear();
        self.navigate_to(Page::MainForm)
    }

    pub fn view_employee(&mut self, code: impl Into<String>) -> Page {
        self.viewed_employee_code = Some(code.into());
        self.navigate_to(Page::UserDashboard)
    }

    fn guard(&self, target: Page) -> Page {
        match target {
            Page::AdminDashboard if !self.admin_authenticated => Page::AdminLogin,
            Page::UserDashboard if self.viewed_employee_code.is_none() => Page::UserLogin,
            other => other,
        }
    }
}
