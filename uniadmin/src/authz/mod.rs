//! Authentication and role guards over the session.
//!
//! A failing guard records a flash message and tells the caller where to redirect.
//! Guards return `Result`, so `?` ends the calling handler before its body runs.

use thiserror::Error;

use crate::session::{FlashKind, Principal, Session, SessionError};

pub const LOGIN_PATH: &str = "auth/login";
pub const LANDING_PATH: &str = "dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No principal in the session
    Unauthenticated,
    /// Principal present but not an admin
    NotAdmin,
}

impl Denial {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Please login first",
            Self::NotAdmin => "Access denied. Admin only.",
        }
    }

    pub fn redirect_to(&self) -> &'static str {
        match self {
            Self::Unauthenticated => LOGIN_PATH,
            Self::NotAdmin => LANDING_PATH,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum GateError {
    #[error("Access denied: {}", .0.message())]
    Denied(Denial),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

pub fn is_authenticated(session: &Session) -> bool {
    session.is_authenticated()
}

pub fn is_admin(session: &Session) -> bool {
    session.principal().is_some_and(|p| p.is_admin())
}

pub fn require_authenticated(session: &mut Session) -> Result<Principal, GateError> {
    match session.principal() {
        Some(principal) => Ok(principal),
        None => deny(session, Denial::Unauthenticated),
    }
}

pub fn require_admin(session: &mut Session) -> Result<Principal, GateError> {
    let principal = require_authenticated(session)?;
    if principal.is_admin() {
        Ok(principal)
    } else {
        tracing::warn!(user_id = principal.id, "Non-admin denied access to admin action");
        deny(session, Denial::NotAdmin)
    }
}

fn deny(session: &mut Session, denial: Denial) -> Result<Principal, GateError> {
    session.flash(FlashKind::Error, denial.message())?;
    Err(GateError::Denied(denial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ClientInfo, Flash};
    use crate::userdb::Role;

    fn signed_in(role: Role) -> Session {
        let mut session = Session::start().unwrap();
        let principal = Principal {
            id: 1,
            username: "sam".to_string(),
            email: "sam@example.com".to_string(),
            role,
        };
        session.sign_in(&principal, &ClientInfo::default()).unwrap();
        session
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        // Given an anonymous session
        let mut session = Session::start().unwrap();

        // When requiring authentication
        let result = require_authenticated(&mut session);

        // Then the guard denies with a login redirect and a flash
        match result {
            Err(GateError::Denied(denial)) => {
                assert_eq!(denial, Denial::Unauthenticated);
                assert_eq!(denial.redirect_to(), "auth/login");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            session.take_flash(),
            Some(Flash {
                kind: FlashKind::Error,
                message: "Please login first".to_string()
            })
        );
    }

    #[test]
    fn test_user_role_is_sent_to_dashboard() {
        // Given a signed-in regular user
        let mut session = signed_in(Role::User);

        // When requiring admin
        let result = require_admin(&mut session);

        // Then the guard denies with a dashboard redirect
        assert!(matches!(result, Err(GateError::Denied(Denial::NotAdmin))));
        assert_eq!(Denial::NotAdmin.redirect_to(), "dashboard");
        assert_eq!(
            session.take_flash().unwrap().message,
            "Access denied. Admin only."
        );
    }

    #[test]
    fn test_admin_passes_both_guards() {
        let mut session = signed_in(Role::Admin);
        assert!(require_authenticated(&mut session).is_ok());
        let principal = require_admin(&mut session).unwrap();
        assert_eq!(principal.username, "sam");
        assert!(session.take_flash().is_none());
    }

    #[test]
    fn test_anonymous_require_admin_goes_to_login() {
        let mut session = Session::start().unwrap();
        assert!(matches!(
            require_admin(&mut session),
            Err(GateError::Denied(Denial::Unauthenticated))
        ));
    }

    #[test]
    fn test_predicates() {
        assert!(!is_authenticated(&Session::start().unwrap()));
        assert!(is_authenticated(&signed_in(Role::User)));
        assert!(!is_admin(&signed_in(Role::User)));
        assert!(is_admin(&signed_in(Role::Admin)));
    }

    #[test]
    fn test_logged_out_session_is_denied() {
        // Given a session that was signed in and then destroyed and renewed
        let mut session = signed_in(Role::Admin);
        session.destroy();
        session.renew().unwrap();

        // Then the next guard sends the client to login
        assert!(matches!(
            require_authenticated(&mut session),
            Err(GateError::Denied(Denial::Unauthenticated))
        ));
    }
}
