use std::future::Future;
use std::pin::Pin;

use http::header::HeaderMap;
use tokio::sync::Mutex;

use super::context::{RequestContext, RequestInput};
use super::errors::CoordinationError;
use super::outcome::{ActionError, ActionResult, Outcome};
use super::{auth, dashboard, university, user};
use crate::config::{DEFAULT_HANDLER, DEFAULT_METHOD, DISPATCH_FALLBACK};
use crate::credential::CredentialVerifier;
use crate::dispatch::{DispatchError, FallbackPolicy, RouteTable};
use crate::session::{commit_session, load_session, session_id_from_headers};
use crate::storage::{DataStore, InMemorySessionStore, SessionStore, data_store_from_env};
use crate::university::{ImageStore, UniversityStore};
use crate::userdb::{NewUser, Role, User, UserStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A registered handler method. Receives the positional params left over after routing.
pub type Action =
    for<'a> fn(&'a App, &'a mut RequestContext, Vec<String>) -> BoxFuture<'a, ActionResult>;

/// Wraps an `async fn(&App, &mut RequestContext, Vec<String>) -> ActionResult` as an [`Action`].
macro_rules! action {
    ($handler:path) => {{
        fn boxed<'a>(
            app: &'a App,
            ctx: &'a mut RequestContext,
            params: Vec<String>,
        ) -> BoxFuture<'a, ActionResult> {
            Box::pin($handler(app, ctx, params))
        }
        boxed as Action
    }};
}

/// Builds the table of every controller and its URL-visible methods.
pub fn default_route_table(fallback: FallbackPolicy) -> RouteTable<Action> {
    let mut table = RouteTable::new(DEFAULT_HANDLER, DEFAULT_METHOD).with_fallback(fallback);
    table
        .register("AuthController", "login", action!(auth::login))
        .register("AuthController", "processLogin", action!(auth::process_login))
        .register("AuthController", "logout", action!(auth::logout))
        .register("AuthController", "register", action!(auth::register))
        .register("AuthController", "processRegister", action!(auth::process_register))
        .register("DashboardController", "index", action!(dashboard::index))
        .register("UserController", "index", action!(user::index))
        .register("UserController", "create", action!(user::create))
        .register("UserController", "store", action!(user::store))
        .register("UserController", "edit", action!(user::edit))
        .register("UserController", "update", action!(user::update))
        .register("UserController", "delete", action!(user::delete))
        .register("UniversityController", "index", action!(university::index))
        .register("UniversityController", "detail", action!(university::detail))
        .register("UniversityController", "create", action!(university::create))
        .register("UniversityController", "store", action!(university::store))
        .register("UniversityController", "edit", action!(university::edit))
        .register("UniversityController", "update", action!(university::update))
        .register("UniversityController", "delete", action!(university::delete));
    table
}

/// The result of handling one request: what to send, plus the session cookie headers.
#[derive(Debug)]
pub struct AppResponse {
    pub outcome: Outcome,
    pub headers: HeaderMap,
}

/// Shared application state. One instance serves every request.
pub struct App {
    routes: RouteTable<Action>,
    data_store: Box<dyn DataStore>,
    session_store: Mutex<Box<dyn SessionStore>>,
    credentials: CredentialVerifier,
    images: ImageStore,
}

impl App {
    /// Creates the tables if needed and checks the route table before accepting requests.
    pub async fn new(
        data_store: Box<dyn DataStore>,
        session_store: Box<dyn SessionStore>,
        credentials: CredentialVerifier,
        images: ImageStore,
        fallback: FallbackPolicy,
    ) -> Result<Self, CoordinationError> {
        UserStore::init(data_store.as_ref()).await?;
        UniversityStore::init(data_store.as_ref()).await?;
        session_store.init().await?;

        let routes = default_route_table(fallback);
        routes.validate()?;

        tracing::info!(?fallback, "Application initialized");
        Ok(Self {
            routes,
            data_store,
            session_store: Mutex::new(session_store),
            credentials,
            images,
        })
    }

    /// Builds the application from environment configuration with an in-memory session store.
    pub async fn from_env() -> Result<Self, CoordinationError> {
        Self::new(
            data_store_from_env()?,
            Box::new(InMemorySessionStore::default()),
            CredentialVerifier::from_env()?,
            ImageStore::from_env(),
            *DISPATCH_FALLBACK,
        )
        .await
    }

    pub fn data_store(&self) -> &dyn DataStore {
        self.data_store.as_ref()
    }

    pub fn credentials(&self) -> &CredentialVerifier {
        &self.credentials
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Creates an admin account when the user table is empty. Returns the new user if one was made.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, CoordinationError> {
        if UserStore::count_users(self.data_store(), None).await? > 0 {
            return Ok(None);
        }

        let password_hash = self.credentials.hash_password(password).await?;
        let user = UserStore::create_user(
            self.data_store(),
            NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::Admin,
            },
        )
        .await?;
        tracing::info!(username = %user.username, "Seeded initial admin account");
        Ok(Some(user))
    }

    pub async fn purge_expired_sessions(&self) -> Result<usize, CoordinationError> {
        let purged = self.session_store.lock().await.purge_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }

    /// Runs one request through session loading, routing, the handler and session commit.
    ///
    /// Infrastructure failures return `Err` and leave the stored session untouched.
    #[tracing::instrument(skip_all, fields(method = %input.method, path = %input.path))]
    pub async fn handle(
        &self,
        headers: &HeaderMap,
        input: RequestInput,
    ) -> Result<AppResponse, CoordinationError> {
        let session_id = session_id_from_headers(headers);
        let session = load_session(&self.session_store, session_id.as_deref()).await?;

        let path = input.path.clone();
        let mut ctx = RequestContext::new(input, session);

        let outcome = match self.routes.resolve(&path) {
            Ok((route, action)) => match action(self, &mut ctx, route.params).await {
                Ok(outcome) | Err(ActionError::Halt(outcome)) => outcome,
                Err(ActionError::Fatal(e)) => return Err(e),
            },
            Err(DispatchError::NotFound(_) | DispatchError::MissingMethod { .. }) => {
                tracing::debug!("No route for request");
                Outcome::NotFound
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = match outcome {
            Outcome::Render(mut view) => {
                view.flash = ctx.session.take_flash();
                view.principal = ctx.session.principal();
                Outcome::Render(view)
            }
            other => other,
        };

        let headers = commit_session(&self.session_store, &ctx.session).await?;
        Ok(AppResponse { outcome, headers })
    }
}

#[cfg(test)]
impl App {
    /// Returns the session's CSRF token, issuing one if needed, without touching its flash.
    pub(crate) async fn csrf_token_for_session(&self, session_id: &str) -> String {
        let mut session = load_session(&self.session_store, Some(session_id))
            .await
            .unwrap();
        let token = crate::session::issue_csrf_token(&mut session).unwrap();
        commit_session(&self.session_store, &session).await.unwrap();
        token
    }
}
