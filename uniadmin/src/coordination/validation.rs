//! Form validation shared by registration, user management and universities.
//!
//! Validators return every problem found, in a fixed order, as user-facing messages.

use super::app::App;
use crate::university::UniversityInput;
use crate::userdb::{UserError, UserStore};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 || domain.len() > 253 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c))
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PasswordRule {
    Required,
    /// Blank means "keep the current password"
    Optional,
}

/// Account fields as submitted, already sanitized except for the passwords.
#[derive(Debug, Clone, Default)]
pub(super) struct AccountForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Checks an account form. Uniqueness ignores the record `exclude_id`.
pub(super) async fn validate_account(
    app: &App,
    form: &AccountForm,
    password_rule: PasswordRule,
    exclude_id: Option<i64>,
) -> Result<Vec<String>, UserError> {
    let mut errors = Vec::new();
    let store = app.data_store();

    if form.username.is_empty() {
        errors.push("Username is required".to_string());
    } else if form.username.chars().count() < MIN_USERNAME_LEN {
        errors.push("Username must be at least 3 characters".to_string());
    } else if UserStore::username_exists(store, &form.username, exclude_id).await? {
        errors.push("Username already exists".to_string());
    }

    if form.email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(&form.email) {
        errors.push("Invalid email format".to_string());
    } else if UserStore::email_exists(store, &form.email, exclude_id).await? {
        errors.push("Email already exists".to_string());
    }

    let check_password = password_rule == PasswordRule::Required || !form.password.is_empty();
    if check_password {
        if form.password.is_empty() {
            errors.push("Password is required".to_string());
        } else if form.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push("Password must be at least 6 characters".to_string());
        }
        if form.password != form.confirm_password {
            errors.push("Passwords do not match".to_string());
        }
    }

    Ok(errors)
}

pub(super) fn validate_university(input: &UniversityInput) -> Vec<String> {
    let mut errors = Vec::new();
    if input.name.is_empty() {
        errors.push("University name is required".to_string());
    }
    if input.address.is_empty() {
        errors.push("Address is required".to_string());
    }
    if let Some(email) = input.email.as_deref() {
        if !is_valid_email(email) {
            errors.push("Invalid email format".to_string());
        }
    }
    errors
}
