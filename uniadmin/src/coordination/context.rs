use std::collections::HashMap;

use http::Method;

use crate::session::{ClientInfo, Session, validate_csrf_token};
use crate::university::UploadedFile;

/// Transport-independent view of one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub method: Method,
    /// Path relative to the application's mount point, e.g. `/university/edit/3`
    pub path: String,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
    pub client: ClientInfo,
}

impl RequestInput {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            form: HashMap::new(),
            files: HashMap::new(),
            client: ClientInfo::default(),
        }
    }
}

/// Everything a handler may read or change for the current request.
#[derive(Debug)]
pub struct RequestContext {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
    pub client: ClientInfo,
    pub session: Session,
}

impl RequestContext {
    pub fn new(input: RequestInput, session: Session) -> Self {
        Self {
            method: input.method,
            query: input.query,
            form: input.form,
            files: input.files,
            client: input.client,
            session,
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// A submitted form field, or `""` when absent.
    pub fn form_value(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The uploaded file for `field`, ignoring empty parts from untouched file inputs.
    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.get(field).filter(|file| !file.is_empty())
    }

    /// Checks the submitted `csrf_token` field against the session token.
    pub fn csrf_valid(&self) -> bool {
        validate_csrf_token(&self.session, self.form.get("csrf_token").map(String::as_str))
    }
}
