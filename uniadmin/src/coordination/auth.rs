//! Login, logout and self-registration.

use std::collections::BTreeMap;

use super::app::App;
use super::context::RequestContext;
use super::outcome::{ActionResult, Outcome, Page, View, flash_and_redirect, redirect};
use super::validation::{AccountForm, PasswordRule, validate_account};
use crate::authz::{LANDING_PATH, LOGIN_PATH};
use crate::session::{FlashKind, Principal, issue_csrf_token};
use crate::userdb::{NewUser, Role, UserStore};
use crate::utils::sanitize_text;

const REGISTER_PATH: &str = "auth/register";
const REGISTER_FORM: &str = "register";

pub(super) async fn login(_app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    if ctx.session.is_authenticated() {
        return redirect(LANDING_PATH);
    }

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    Ok(Outcome::Render(
        View::new("Login", Page::Login { csrf_token }).without_layout(),
    ))
}

pub(super) async fn process_login(
    app: &App,
    ctx: &mut RequestContext,
    _params: Vec<String>,
) -> ActionResult {
    if !ctx.is_post() {
        return redirect(LOGIN_PATH);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", LOGIN_PATH);
    }

    let identifier = sanitize_text(ctx.form_value("identifier"));
    let password = ctx.form_value("password").to_string();
    if identifier.is_empty() || password.is_empty() {
        return flash_and_redirect(ctx, FlashKind::Error, "Please fill all fields", LOGIN_PATH);
    }

    let stored = UserStore::find_credential(app.data_store(), &identifier).await?;
    let verified = match &stored {
        Some(stored) => {
            app.credentials()
                .verify_password(&password, &stored.password)
                .await
        }
        None => false,
    };
    let user = match stored {
        Some(stored) if verified => stored.into_user(),
        _ => {
            tracing::warn!("Failed login attempt");
            return flash_and_redirect(
                ctx,
                FlashKind::Error,
                "Invalid username/email or password",
                LOGIN_PATH,
            );
        }
    };

    let principal = Principal {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    };
    let client = ctx.client.clone();
    ctx.session.sign_in(&principal, &client)?;
    tracing::info!(user_id = principal.id, "User logged in");

    let message = format!("Welcome back, {}!", principal.username);
    flash_and_redirect(ctx, FlashKind::Success, &message, LANDING_PATH)
}

pub(super) async fn logout(_app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    if let Some(principal) = ctx.session.principal() {
        tracing::info!(user_id = principal.id, "User logged out");
    }
    ctx.session.destroy();
    ctx.session.renew()?;
    flash_and_redirect(
        ctx,
        FlashKind::Success,
        "You have been logged out successfully",
        LOGIN_PATH,
    )
}

pub(super) async fn register(_app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    if ctx.session.is_authenticated() {
        return redirect(LANDING_PATH);
    }

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    let errors = ctx.session.take_form_errors(REGISTER_FORM);
    let data = ctx.session.take_form_data(REGISTER_FORM);
    Ok(Outcome::Render(
        View::new(
            "Register",
            Page::Register {
                csrf_token,
                errors,
                data,
            },
        )
        .without_layout(),
    ))
}

pub(super) async fn process_register(
    app: &App,
    ctx: &mut RequestContext,
    _params: Vec<String>,
) -> ActionResult {
    if !ctx.is_post() {
        return redirect(REGISTER_PATH);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", REGISTER_PATH);
    }

    let form = AccountForm {
        username: sanitize_text(ctx.form_value("username")),
        email: sanitize_text(ctx.form_value("email")),
        password: ctx.form_value("password").to_string(),
        confirm_password: ctx.form_value("confirm_password").to_string(),
    };

    let errors = validate_account(app, &form, PasswordRule::Required, None).await?;
    if !errors.is_empty() {
        let data = BTreeMap::from([
            ("username".to_string(), form.username),
            ("email".to_string(), form.email),
        ]);
        ctx.session.set_form_state(REGISTER_FORM, &errors, &data)?;
        return redirect(REGISTER_PATH);
    }

    let new_user = NewUser {
        username: form.username,
        email: form.email,
        password_hash: app.credentials().hash_password(&form.password).await?,
        role: Role::User,
    };
    match UserStore::create_user(app.data_store(), new_user).await {
        Ok(_) => flash_and_redirect(
            ctx,
            FlashKind::Success,
            "Registration successful! Please login.",
            LOGIN_PATH,
        ),
        Err(e) => {
            tracing::error!("Registration insert failed: {}", e);
            flash_and_redirect(
                ctx,
                FlashKind::Error,
                "Registration failed. Please try again.",
                REGISTER_PATH,
            )
        }
    }
}
