use headers::{Cookie, HeaderMapExt};
use http::header::HeaderMap;

use crate::session::config::{SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE, SESSION_LIFETIME};
use crate::session::errors::SessionError;
use crate::utils::header_set_cookie;

/// Extracts the session id from the request's `Cookie` header, if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let Some(cookies) = headers.typed_get::<Cookie>() else {
        tracing::debug!("No cookie header found");
        return None;
    };

    let session_id = cookies.get(SESSION_COOKIE_NAME.as_str())?;
    if session_id.is_empty() {
        return None;
    }
    Some(session_id.to_string())
}

pub(super) fn set_session_cookie(headers: &mut HeaderMap, session_id: &str) -> Result<(), SessionError> {
    let max_age = i64::try_from(*SESSION_LIFETIME).unwrap_or(i64::MAX);
    header_set_cookie(
        headers,
        SESSION_COOKIE_NAME.as_str(),
        session_id,
        max_age,
        *SESSION_COOKIE_SECURE,
    )?;
    Ok(())
}

pub(super) fn expire_session_cookie(headers: &mut HeaderMap) -> Result<(), SessionError> {
    header_set_cookie(
        headers,
        SESSION_COOKIE_NAME.as_str(),
        "",
        0,
        *SESSION_COOKIE_SECURE,
    )?;
    Ok(())
}
