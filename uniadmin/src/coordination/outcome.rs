use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::context::RequestContext;
use super::errors::CoordinationError;
use crate::authz::GateError;
use crate::credential::CredentialError;
use crate::session::{Flash, FlashKind, Principal, SessionError};
use crate::university::{University, UniversityError};
use crate::userdb::{User, UserError};

/// What the transport should do once a handler is finished.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Redirect to a path relative to the application root, e.g. `university/detail/3`
    Redirect(String),
    Render(View),
    NotFound,
}

/// A page plus the chrome around it.
#[derive(Debug, Clone)]
pub struct View {
    pub title: String,
    pub page: Page,
    /// Whether the page is wrapped in the navigation layout
    pub with_layout: bool,
    /// Filled in after the handler returns
    pub flash: Option<Flash>,
    /// Filled in after the handler returns
    pub principal: Option<Principal>,
}

impl View {
    pub fn new(title: impl Into<String>, page: Page) -> Self {
        Self {
            title: title.into(),
            page,
            with_layout: true,
            flash: None,
            principal: None,
        }
    }

    pub fn without_layout(mut self) -> Self {
        self.with_layout = false;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_universities: i64,
    pub admin_count: i64,
    pub user_count: i64,
}

/// Page-specific data for each template.
#[derive(Debug, Clone)]
pub enum Page {
    Login {
        csrf_token: String,
    },
    Register {
        csrf_token: String,
        errors: Vec<String>,
        data: BTreeMap<String, String>,
    },
    Dashboard {
        stats: DashboardStats,
        recent: Vec<University>,
        login_time: Option<DateTime<Utc>>,
    },
    UserList {
        users: Vec<User>,
        csrf_token: String,
        current_user_id: i64,
    },
    UserCreate {
        csrf_token: String,
        errors: Vec<String>,
        data: BTreeMap<String, String>,
    },
    UserEdit {
        user: User,
        csrf_token: String,
        errors: Vec<String>,
    },
    UniversityList {
        universities: Vec<University>,
        search: String,
        current_page: i64,
        total_pages: i64,
        total: i64,
        csrf_token: String,
        is_admin: bool,
    },
    UniversityDetail {
        university: University,
        csrf_token: String,
        is_admin: bool,
    },
    UniversityCreate {
        csrf_token: String,
        errors: Vec<String>,
        data: BTreeMap<String, String>,
    },
    UniversityEdit {
        university: University,
        csrf_token: String,
        errors: Vec<String>,
    },
}

/// Why a handler stopped before producing its normal outcome.
#[derive(Debug)]
pub enum ActionError {
    /// Stop here and respond with this outcome. The session is still committed.
    Halt(Outcome),
    /// Infrastructure failure. Nothing is committed.
    Fatal(CoordinationError),
}

pub type ActionResult = Result<Outcome, ActionError>;

impl From<GateError> for ActionError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Denied(denial) => Self::Halt(Outcome::Redirect(denial.redirect_to().to_string())),
            GateError::Session(e) => Self::Fatal(e.into()),
        }
    }
}

impl From<CoordinationError> for ActionError {
    fn from(err: CoordinationError) -> Self {
        Self::Fatal(err)
    }
}

impl From<SessionError> for ActionError {
    fn from(err: SessionError) -> Self {
        Self::Fatal(err.into())
    }
}

impl From<UserError> for ActionError {
    fn from(err: UserError) -> Self {
        Self::Fatal(err.into())
    }
}

impl From<UniversityError> for ActionError {
    fn from(err: UniversityError) -> Self {
        Self::Fatal(err.into())
    }
}

impl From<CredentialError> for ActionError {
    fn from(err: CredentialError) -> Self {
        Self::Fatal(err.into())
    }
}

pub(super) fn redirect(path: impl Into<String>) -> ActionResult {
    Ok(Outcome::Redirect(path.into()))
}

pub(super) fn flash_and_redirect(
    ctx: &mut RequestContext,
    kind: FlashKind,
    message: &str,
    path: impl Into<String>,
) -> ActionResult {
    ctx.session.flash(kind, message)?;
    redirect(path)
}

/// Parses the first positional parameter as a record id.
pub(super) fn id_param(params: &[String]) -> Option<i64> {
    params
        .first()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id > 0)
}
