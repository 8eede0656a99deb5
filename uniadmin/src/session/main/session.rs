use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::header::HeaderMap;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use super::cookie::{expire_session_cookie, set_session_cookie};
use super::csrf::CSRF_TOKEN_KEY;
use crate::session::config::SESSION_LIFETIME;
use crate::session::errors::SessionError;
use crate::session::types::{ClientInfo, Principal, Session, SessionRecord};
use crate::storage::SessionStore;
use crate::userdb::Role;
use crate::utils::gen_random_string;

const SESSION_PREFIX: &str = "session";

const USER_ID_KEY: &str = "user_id";
const USERNAME_KEY: &str = "username";
const EMAIL_KEY: &str = "email";
const ROLE_KEY: &str = "role";
const LOGIN_TIME_KEY: &str = "login_time";
const IP_ADDRESS_KEY: &str = "ip_address";
const USER_AGENT_KEY: &str = "user_agent";

fn new_session_id() -> Result<String, SessionError> {
    Ok(gen_random_string(32)?)
}

impl Session {
    /// Starts an empty session under a freshly generated id.
    pub fn start() -> Result<Self, SessionError> {
        Ok(Self {
            id: new_session_id()?,
            data: BTreeMap::new(),
            destroyed: false,
            stale_ids: Vec::new(),
        })
    }

    fn resume(id: String, record: SessionRecord) -> Self {
        Self {
            id,
            data: record.data,
            destroyed: false,
            stale_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Typed read. Values that do not deserialize into `T` read as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), SessionError> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn unset(&mut self, key: &str) {
        self.data.remove(key);
    }

    /// Reads and removes a value in one step.
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        self.data
            .remove(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Clears the bag and schedules the server-side record for deletion.
    ///
    /// Writes fail with [`SessionError::Destroyed`] until [`Session::renew`] is called.
    pub fn destroy(&mut self) {
        tracing::debug!("Destroying session");
        self.data.clear();
        self.stale_ids.push(self.id.clone());
        self.destroyed = true;
    }

    /// Starts a brand-new empty session under a new id after [`Session::destroy`].
    pub fn renew(&mut self) -> Result<(), SessionError> {
        if !self.destroyed {
            self.stale_ids.push(self.id.clone());
        }
        self.id = new_session_id()?;
        self.data.clear();
        self.destroyed = false;
        Ok(())
    }

    /// Moves the bag to a new id. With `delete_old` the previous record is removed on commit.
    pub fn regenerate_id(&mut self, delete_old: bool) -> Result<(), SessionError> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }
        let old_id = std::mem::replace(&mut self.id, new_session_id()?);
        if delete_old {
            self.stale_ids.push(old_id);
        }
        tracing::debug!("Session id regenerated");
        Ok(())
    }

    /// A session is authenticated exactly when it carries a user id.
    pub fn is_authenticated(&self) -> bool {
        self.get::<i64>(USER_ID_KEY).is_some()
    }

    pub fn principal(&self) -> Option<Principal> {
        let id = self.get::<i64>(USER_ID_KEY)?;
        Some(Principal {
            id,
            username: self.get(USERNAME_KEY).unwrap_or_default(),
            email: self.get(EMAIL_KEY).unwrap_or_default(),
            role: self.get::<Role>(ROLE_KEY).unwrap_or_default(),
        })
    }

    /// Rotates the id and records the principal along with login metadata.
    ///
    /// The anti-forgery token of the anonymous session is dropped, so the next form
    /// rendered after sign-in carries a new one.
    pub fn sign_in(&mut self, principal: &Principal, client: &ClientInfo) -> Result<(), SessionError> {
        self.regenerate_id(true)?;
        self.unset(CSRF_TOKEN_KEY);
        self.set(USER_ID_KEY, &principal.id)?;
        self.set(USERNAME_KEY, &principal.username)?;
        self.set(EMAIL_KEY, &principal.email)?;
        self.set(ROLE_KEY, &principal.role)?;
        self.set(LOGIN_TIME_KEY, &Utc::now().timestamp())?;
        self.set(IP_ADDRESS_KEY, &client.ip_address)?;
        self.set(USER_AGENT_KEY, &client.user_agent)?;
        Ok(())
    }

    pub fn login_time(&self) -> Option<DateTime<Utc>> {
        self.get::<i64>(LOGIN_TIME_KEY)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            ip_address: self.get::<Option<String>>(IP_ADDRESS_KEY).flatten(),
            user_agent: self.get::<Option<String>>(USER_AGENT_KEY).flatten(),
        }
    }
}

/// Loads the session named by the client's cookie.
///
/// Ids that are unknown to the store or expired are never adopted; a new session with a
/// fresh id is started instead. A record that no longer deserializes is treated the same way.
pub async fn load_session(
    store: &Mutex<Box<dyn SessionStore>>,
    session_id: Option<&str>,
) -> Result<Session, SessionError> {
    let Some(session_id) = session_id else {
        return Session::start();
    };

    let stored = store.lock().await.get(SESSION_PREFIX, session_id).await?;
    let Some(stored) = stored else {
        tracing::debug!("Unknown or expired session id, starting a new session");
        return Session::start();
    };

    match serde_json::from_str::<SessionRecord>(&stored.value) {
        Ok(record) => Ok(Session::resume(session_id.to_string(), record)),
        Err(e) => {
            tracing::warn!("Discarding unreadable session record: {}", e);
            Session::start()
        }
    }
}

/// Persists the session and returns the `Set-Cookie` headers for the response.
///
/// Stale ids are removed first. A destroyed session that was not renewed is not written
/// back and its cookie is expired.
pub async fn commit_session(
    store: &Mutex<Box<dyn SessionStore>>,
    session: &Session,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    let mut store = store.lock().await;

    for stale_id in &session.stale_ids {
        store.remove(SESSION_PREFIX, stale_id).await?;
    }

    if session.destroyed {
        expire_session_cookie(&mut headers)?;
        return Ok(headers);
    }

    let record = SessionRecord {
        data: session.data.clone(),
    };
    store
        .put_with_ttl(
            SESSION_PREFIX,
            &session.id,
            serde_json::to_string(&record)?,
            *SESSION_LIFETIME,
        )
        .await?;

    set_session_cookie(&mut headers, &session.id)?;
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySessionStore;
    use http::header::SET_COOKIE;

    fn memory_store() -> Mutex<Box<dyn SessionStore>> {
        Mutex::new(Box::new(InMemorySessionStore::new()))
    }

    fn alice() -> Principal {
        Principal {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_set_get_unset_take() {
        // Given a fresh session
        let mut session = Session::start().unwrap();

        // When setting values of different types
        session.set("n", &42i64).unwrap();
        session.set("s", "text").unwrap();

        // Then typed reads return them
        assert_eq!(session.get::<i64>("n"), Some(42));
        assert_eq!(session.get::<String>("s"), Some("text".to_string()));
        // And a mismatched type reads as absent
        assert_eq!(session.get::<i64>("s"), None);

        // When unsetting and taking
        session.unset("n");
        let taken: Option<String> = session.take("s");

        // Then both are gone
        assert!(!session.contains("n"));
        assert_eq!(taken, Some("text".to_string()));
        assert!(!session.contains("s"));
    }

    #[test]
    fn test_destroy_clears_and_blocks_writes() {
        // Given a session with data
        let mut session = Session::start().unwrap();
        let old_id = session.id().to_string();
        session.set("k", "v").unwrap();

        // When destroyed
        session.destroy();

        // Then reads are empty and writes fail
        assert!(session.is_destroyed());
        assert_eq!(session.get::<String>("k"), None);
        assert!(matches!(session.set("k", "v"), Err(SessionError::Destroyed)));
        assert_eq!(session.stale_ids, vec![old_id.clone()]);

        // When renewed a new id accepts writes again
        session.renew().unwrap();
        assert_ne!(session.id(), old_id);
        assert!(session.set("flash", "bye").is_ok());
    }

    #[test]
    fn test_regenerate_preserves_bag() {
        let mut session = Session::start().unwrap();
        session.set("k", "v").unwrap();
        let old_id = session.id().to_string();

        session.regenerate_id(false).unwrap();

        assert_ne!(session.id(), old_id);
        assert_eq!(session.get::<String>("k"), Some("v".to_string()));
        assert!(session.stale_ids.is_empty());

        session.regenerate_id(true).unwrap();
        assert_eq!(session.stale_ids.len(), 1);
    }

    #[test]
    fn test_principal_projection() {
        // Given an anonymous session
        let mut session = Session::start().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.principal().is_none());

        // When signing in
        let pre_login_id = session.id().to_string();
        let client = ClientInfo {
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: Some("test-agent".to_string()),
        };
        session.sign_in(&alice(), &client).unwrap();

        // Then the id changed and the principal is projected back
        assert_ne!(session.id(), pre_login_id);
        assert!(session.is_authenticated());
        assert_eq!(session.principal(), Some(alice()));
        assert_eq!(session.client_info(), client);
        assert!(session.login_time().is_some());
    }

    #[test]
    fn test_user_id_alone_authenticates() {
        // Given only a user id in the bag
        let mut session = Session::start().unwrap();
        session.set("user_id", &3i64).unwrap();

        // Then the session is authenticated with least-privilege defaults
        let principal = session.principal().unwrap();
        assert_eq!(principal.id, 3);
        assert_eq!(principal.role, Role::User);
    }

    #[tokio::test]
    async fn test_load_without_cookie_starts_new_session() {
        let store = memory_store();
        let session = load_session(&store, None).await.unwrap();
        assert!(session.data.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_adopted() {
        // Given a cookie id the store has never seen
        let store = memory_store();

        // When loading
        let session = load_session(&store, Some("attacker-chosen")).await.unwrap();

        // Then a fresh id is issued
        assert_ne!(session.id(), "attacker-chosen");
    }

    #[tokio::test]
    async fn test_commit_and_reload() {
        // Given a session with data committed to the store
        let store = memory_store();
        let mut session = load_session(&store, None).await.unwrap();
        session.set("k", "v").unwrap();
        let headers = commit_session(&store, &session).await.unwrap();

        // Then the cookie names the session id
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains(&format!("={};", session.id())));

        // And loading by that id restores the bag
        let reloaded = load_session(&store, Some(session.id())).await.unwrap();
        assert_eq!(reloaded.id(), session.id());
        assert_eq!(reloaded.get::<String>("k"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_regenerated_id_removes_old_record() {
        // Given a committed session
        let store = memory_store();
        let mut session = load_session(&store, None).await.unwrap();
        session.set("k", "v").unwrap();
        commit_session(&store, &session).await.unwrap();
        let old_id = session.id().to_string();

        // When signing in on the next request
        let mut session = load_session(&store, Some(&old_id)).await.unwrap();
        session.sign_in(&alice(), &ClientInfo::default()).unwrap();
        commit_session(&store, &session).await.unwrap();

        // Then the old id no longer resolves
        let stale = load_session(&store, Some(&old_id)).await.unwrap();
        assert_ne!(stale.id(), old_id);
        assert!(!stale.is_authenticated());

        // And the new id carries the principal and the pre-login data
        let current = load_session(&store, Some(session.id())).await.unwrap();
        assert_eq!(current.principal(), Some(alice()));
        assert_eq!(current.get::<String>("k"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_destroyed_session_is_removed_and_cookie_expired() {
        // Given a committed authenticated session
        let store = memory_store();
        let mut session = load_session(&store, None).await.unwrap();
        session.sign_in(&alice(), &ClientInfo::default()).unwrap();
        commit_session(&store, &session).await.unwrap();
        let id = session.id().to_string();

        // When destroyed without renewal
        let mut session = load_session(&store, Some(&id)).await.unwrap();
        session.destroy();
        let headers = commit_session(&store, &session).await.unwrap();

        // Then the record is gone and the cookie is expired
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        let reloaded = load_session(&store, Some(&id)).await.unwrap();
        assert!(!reloaded.is_authenticated());
    }

    #[tokio::test]
    async fn test_corrupt_record_starts_new_session() {
        let store = memory_store();
        store
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, "bad", "not json".to_string(), 60)
            .await
            .unwrap();

        let session = load_session(&store, Some("bad")).await.unwrap();
        assert_ne!(session.id(), "bad");
    }
}
