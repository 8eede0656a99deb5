use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::session::types::Session;
use crate::utils::gen_random_string;

pub(super) const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Returns the session's anti-forgery token, creating it on first use.
///
/// The token is 32 bytes from the system CSPRNG, base64url encoded. It stays the same
/// until the session is renewed or a user signs in.
pub fn issue_csrf_token(session: &mut Session) -> Result<String, SessionError> {
    if let Some(token) = session.get::<String>(CSRF_TOKEN_KEY) {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    let token = gen_random_string(32)?;
    session.set(CSRF_TOKEN_KEY, &token)?;
    tracing::debug!("Issued new CSRF token");
    Ok(token)
}

/// Checks a submitted token against the session's token in constant time.
///
/// Never fails: a missing session token, a missing or empty submission and a
/// mismatch all yield `false`.
pub fn validate_csrf_token(session: &Session, supplied: Option<&str>) -> bool {
    let Some(stored) = session.get::<String>(CSRF_TOKEN_KEY) else {
        tracing::warn!("CSRF validation without an issued token");
        return false;
    };
    let supplied = supplied.unwrap_or_default();
    if stored.is_empty() || supplied.is_empty() {
        tracing::warn!("CSRF token missing from request");
        return false;
    }

    let valid: bool = stored.as_bytes().ct_eq(supplied.as_bytes()).into();
    if !valid {
        tracing::warn!("CSRF token mismatch");
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::{ClientInfo, Principal};
    use crate::userdb::Role;
    use proptest::prelude::*;

    fn session() -> Session {
        Session::start().unwrap()
    }

    #[test]
    fn test_issue_is_idempotent() {
        // Given a fresh session
        let mut session = session();

        // When issuing twice
        let first = issue_csrf_token(&mut session).unwrap();
        let second = issue_csrf_token(&mut session).unwrap();

        // Then the same token comes back
        assert_eq!(first, second);
        assert_eq!(first.len(), 43);
    }

    #[test]
    fn test_validate_accepts_issued_token() {
        let mut session = session();
        let token = issue_csrf_token(&mut session).unwrap();
        assert!(validate_csrf_token(&session, Some(&token)));
    }

    #[test]
    fn test_validate_without_issued_token() {
        // Given a session that never issued a token
        let session = session();

        // Then every submission is rejected
        assert!(!validate_csrf_token(&session, Some("anything")));
        assert!(!validate_csrf_token(&session, Some("")));
        assert!(!validate_csrf_token(&session, None));
    }

    #[test]
    fn test_validate_rejects_empty_and_missing() {
        let mut session = session();
        issue_csrf_token(&mut session).unwrap();
        assert!(!validate_csrf_token(&session, Some("")));
        assert!(!validate_csrf_token(&session, None));
    }

    #[test]
    fn test_token_survives_regeneration_but_not_destroy() {
        // Given an issued token
        let mut session = session();
        let token = issue_csrf_token(&mut session).unwrap();

        // When the id is rotated the bag (and token) is preserved
        session.regenerate_id(true).unwrap();
        assert!(validate_csrf_token(&session, Some(&token)));

        // When the session is destroyed and renewed a new token is issued
        session.destroy();
        session.renew().unwrap();
        assert!(!validate_csrf_token(&session, Some(&token)));
        let renewed = issue_csrf_token(&mut session).unwrap();
        assert_ne!(renewed, token);
    }

    #[test]
    fn test_sign_in_discards_anonymous_token() {
        // Given a token issued to an anonymous session
        let mut session = session();
        let anonymous_token = issue_csrf_token(&mut session).unwrap();

        // When a user signs in
        let principal = Principal {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
        };
        session.sign_in(&principal, &ClientInfo::default()).unwrap();

        // Then the old token no longer validates and a different one is minted
        assert!(!validate_csrf_token(&session, Some(&anonymous_token)));
        let signed_in_token = issue_csrf_token(&mut session).unwrap();
        assert_ne!(signed_in_token, anonymous_token);
        assert!(validate_csrf_token(&session, Some(&signed_in_token)));
    }

    #[test]
    fn test_issue_on_destroyed_session_fails() {
        let mut session = session();
        session.destroy();
        assert!(matches!(
            issue_csrf_token(&mut session),
            Err(SessionError::Destroyed)
        ));
    }

    proptest! {
        #[test]
        fn prop_single_char_change_is_rejected(idx in 0usize..43, replacement in "[A-Za-z0-9_-]") {
            let mut session = session();
            let token = issue_csrf_token(&mut session).unwrap();

            let mut chars: Vec<char> = token.chars().collect();
            let new_char = replacement.chars().next().unwrap();
            prop_assume!(chars[idx] != new_char);
            chars[idx] = new_char;
            let tampered: String = chars.into_iter().collect();

            prop_assert!(!validate_csrf_token(&session, Some(&tampered)));
        }

        #[test]
        fn prop_arbitrary_strings_are_rejected(candidate in ".*") {
            let mut session = session();
            let token = issue_csrf_token(&mut session).unwrap();
            prop_assume!(candidate != token);
            prop_assert!(!validate_csrf_token(&session, Some(&candidate)));
        }
    }
}
