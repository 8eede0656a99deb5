//! Shared fixtures for unit tests: an in-memory database, seeded rows and a cookie-keeping client.

use std::collections::HashMap;

use http::header::{COOKIE, HeaderMap, SET_COOKIE};
use http::{HeaderValue, Method};
use sqlx::sqlite::SqlitePoolOptions;

use crate::coordination::{App, AppResponse, Outcome, Page, RequestInput, View};
use crate::credential::CredentialVerifier;
use crate::dispatch::FallbackPolicy;
use crate::session::SESSION_COOKIE_NAME;
use crate::storage::{DataStore, InMemorySessionStore, SqliteDataStore};
use crate::university::{
    DB_TABLE_UNIVERSITIES, ImageStore, UniversityInput, UniversityStore, UploadedFile,
};
use crate::userdb::{DB_TABLE_USERS, NewUser, Role, User, UserStore};

pub(crate) const TEST_PASSWORD: &str = "password123";

/// A single-connection in-memory SQLite database with every table created.
pub(crate) async fn memory_data_store() -> Box<dyn DataStore> {
    // One connection that never idles out, otherwise the in-memory database disappears.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();

    let store: Box<dyn DataStore> = Box::new(SqliteDataStore::new(pool));
    UserStore::init(store.as_ref()).await.unwrap();
    UniversityStore::init(store.as_ref()).await.unwrap();
    store
}

/// Argon2id with minimal cost so tests stay fast.
pub(crate) fn test_verifier() -> CredentialVerifier {
    CredentialVerifier::new(8, 1, 1).unwrap()
}

/// Inserts `<name>` / `<name>@example.com` with [`TEST_PASSWORD`].
pub(crate) async fn seed_user(store: &dyn DataStore, name: &str, role: Role) -> User {
    UserStore::create_user(
        store,
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: test_verifier().hash(TEST_PASSWORD).unwrap(),
            role,
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn seed_university(store: &dyn DataStore, name: &str, created_by: i64) -> i64 {
    let input = UniversityInput {
        name: name.to_string(),
        address: format!("{name} campus"),
        ..Default::default()
    };
    UniversityStore::create(store, &input, created_by)
        .await
        .unwrap()
}

pub(crate) fn png_upload(file_name: &str) -> UploadedFile {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    UploadedFile {
        file_name: file_name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes,
    }
}

pub(crate) fn jpeg_upload(file_name: &str) -> UploadedFile {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(&[0u8; 64]);
    UploadedFile {
        file_name: file_name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes,
    }
}

/// Makes every INSERT and UPDATE on `table` abort while reads keep working.
async fn refuse_writes(store: &dyn DataStore, table: &str) {
    let pool = store.as_sqlite().unwrap();
    for event in ["INSERT", "UPDATE"] {
        sqlx::query(&format!(
            "CREATE TRIGGER refuse_{}_{table} BEFORE {event} ON {table} \
             BEGIN SELECT RAISE(ABORT, 'write refused'); END",
            event.to_lowercase()
        ))
        .execute(pool)
        .await
        .unwrap();
    }
}

pub(crate) async fn refuse_user_writes(store: &dyn DataStore) {
    refuse_writes(store, DB_TABLE_USERS.as_str()).await;
}

pub(crate) async fn refuse_university_writes(store: &dyn DataStore) {
    refuse_writes(store, DB_TABLE_UNIVERSITIES.as_str()).await;
}

/// Names of the files currently in the app's upload directory.
pub(crate) fn stored_images(app: &App) -> Vec<String> {
    match std::fs::read_dir(app.images().dir()) {
        Ok(entries) => entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// An [`App`] over a fresh in-memory database and a private upload directory.
pub(crate) async fn test_app() -> App {
    let upload_dir = std::env::temp_dir().join(format!(
        "uniadmin-test-{}",
        uuid::Uuid::new_v4().simple()
    ));
    App::new(
        memory_data_store().await,
        Box::new(InMemorySessionStore::default()),
        test_verifier(),
        ImageStore::new(upload_dir),
        FallbackPolicy::Silent,
    )
    .await
    .unwrap()
}

impl AppResponse {
    /// The rendered view. Panics on any other outcome.
    pub(crate) fn view(&self) -> &View {
        match &self.outcome {
            Outcome::Render(view) => view,
            other => panic!("expected a rendered view, got {other:?}"),
        }
    }
}

fn page_csrf_token(page: &Page) -> Option<&str> {
    match page {
        Page::Login { csrf_token }
        | Page::Register { csrf_token, .. }
        | Page::UserList { csrf_token, .. }
        | Page::UserCreate { csrf_token, .. }
        | Page::UserEdit { csrf_token, .. }
        | Page::UniversityList { csrf_token, .. }
        | Page::UniversityDetail { csrf_token, .. }
        | Page::UniversityCreate { csrf_token, .. }
        | Page::UniversityEdit { csrf_token, .. } => Some(csrf_token),
        Page::Dashboard { .. } => None,
    }
}

/// Plays the browser: keeps the session cookie and the last CSRF token it was shown.
pub(crate) struct TestClient<'a> {
    app: &'a App,
    cookie: Option<String>,
    csrf_token: Option<String>,
}

impl<'a> TestClient<'a> {
    pub(crate) fn new(app: &'a App) -> Self {
        Self {
            app,
            cookie: None,
            csrf_token: None,
        }
    }

    /// A second client presenting the given session id.
    pub(crate) fn clone_with_session(&self, session_id: &str) -> Self {
        Self {
            app: self.app,
            cookie: Some(format!("{}={session_id}", SESSION_COOKIE_NAME.as_str())),
            csrf_token: None,
        }
    }

    pub(crate) fn session_id(&self) -> Option<String> {
        self.cookie
            .as_deref()
            .and_then(|c| c.split_once('='))
            .map(|(_, value)| value.to_string())
    }

    pub(crate) async fn get(&mut self, path: &str) -> AppResponse {
        self.send(RequestInput::new(Method::GET, path)).await
    }

    pub(crate) async fn get_query(&mut self, path: &str, query: &[(&str, &str)]) -> AppResponse {
        let mut input = RequestInput::new(Method::GET, path);
        input.query = to_map(query);
        self.send(input).await
    }

    /// Posts a form, adding the current CSRF token.
    pub(crate) async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> AppResponse {
        let mut input = RequestInput::new(Method::POST, path);
        input.form = to_map(fields);
        if let Some(token) = &self.csrf_token {
            input.form.insert("csrf_token".to_string(), token.clone());
        }
        self.send(input).await
    }

    /// Sends the fields exactly as given.
    pub(crate) async fn post_raw(
        &mut self,
        method: Method,
        path: &str,
        fields: &[(&str, &str)],
    ) -> AppResponse {
        let mut input = RequestInput::new(method, path);
        input.form = to_map(fields);
        self.send(input).await
    }

    pub(crate) async fn post_multipart(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, UploadedFile)>,
    ) -> AppResponse {
        let mut input = RequestInput::new(Method::POST, path);
        input.form = to_map(fields);
        if let Some(token) = &self.csrf_token {
            input.form.insert("csrf_token".to_string(), token.clone());
        }
        if let Some((field, upload)) = file {
            input.files.insert(field.to_string(), upload);
        }
        self.send(input).await
    }

    /// Logs in with [`TEST_PASSWORD`] and asserts it worked.
    ///
    /// Afterwards the client holds the signed-in session's CSRF token, as if it had
    /// loaded a form, while the welcome flash stays pending.
    pub(crate) async fn login(&mut self, username: &str) {
        self.get("/auth/login").await;
        let response = self
            .post(
                "/auth/processLogin",
                &[("identifier", username), ("password", TEST_PASSWORD)],
            )
            .await;
        assert!(
            matches!(response.outcome, Outcome::Redirect(ref p) if p == "dashboard"),
            "login as {username} failed: {:?}",
            response.outcome
        );
        let session_id = self.session_id().unwrap();
        self.csrf_token = Some(self.app.csrf_token_for_session(&session_id).await);
    }

    pub(crate) fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Replaces the token that `post` and `post_multipart` attach. The next rendered
    /// form sets it again.
    pub(crate) fn set_csrf_token(&mut self, token: Option<&str>) {
        self.csrf_token = token.map(str::to_string);
    }

    async fn send(&mut self, input: RequestInput) -> AppResponse {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }

        let response = self.app.handle(&headers, input).await.unwrap();

        for value in response.headers.get_all(SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap().trim().to_string();
            if value.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                self.cookie = Some(pair);
            }
        }
        if let Outcome::Render(view) = &response.outcome {
            if let Some(token) = page_csrf_token(&view.page) {
                self.csrf_token = Some(token.to_string());
            }
        }
        response
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
