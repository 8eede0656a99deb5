//! Account management for admins.

use std::collections::BTreeMap;

use super::app::App;
use super::context::RequestContext;
use super::outcome::{ActionResult, Outcome, Page, View, flash_and_redirect, id_param, redirect};
use super::validation::{AccountForm, PasswordRule, validate_account};
use crate::authz::require_admin;
use crate::session::{FlashKind, issue_csrf_token};
use crate::userdb::{NewUser, Role, UserError, UserStore, UserUpdate};
use crate::utils::sanitize_text;

const USER_FORM: &str = "user";
const INDEX_PATH: &str = "user";
const CREATE_PATH: &str = "user/create";

fn edit_path(id: &str) -> String {
    format!("user/edit/{id}")
}

fn raw_id(params: &[String]) -> &str {
    params.first().map(String::as_str).unwrap_or_default()
}

fn account_form(ctx: &RequestContext) -> AccountForm {
    AccountForm {
        username: sanitize_text(ctx.form_value("username")),
        email: sanitize_text(ctx.form_value("email")),
        password: ctx.form_value("password").to_string(),
        confirm_password: ctx.form_value("confirm_password").to_string(),
    }
}

/// Reads the `role` field, defaulting to `user` when absent.
fn submitted_role(ctx: &RequestContext) -> Result<Role, String> {
    let raw = ctx.form.get("role").map(String::as_str).unwrap_or("user");
    raw.parse::<Role>().map_err(|_| raw.to_string())
}

pub(super) async fn index(app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    let principal = require_admin(&mut ctx.session)?;

    let users = UserStore::get_all_users(app.data_store()).await?;
    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    Ok(Outcome::Render(View::new(
        "User Management",
        Page::UserList {
            users,
            csrf_token,
            current_user_id: principal.id,
        },
    )))
}

pub(super) async fn create(_app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    require_admin(&mut ctx.session)?;

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    let errors = ctx.session.take_form_errors(USER_FORM);
    let data = ctx.session.take_form_data(USER_FORM);
    Ok(Outcome::Render(View::new(
        "Add New User",
        Page::UserCreate {
            csrf_token,
            errors,
            data,
        },
    )))
}

pub(super) async fn store(app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    require_admin(&mut ctx.session)?;

    if !ctx.is_post() {
        return redirect(CREATE_PATH);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", CREATE_PATH);
    }

    let form = account_form(ctx);
    let mut errors = validate_account(app, &form, PasswordRule::Required, None).await?;
    let role = submitted_role(ctx);
    if role.is_err() {
        errors.push("Invalid role".to_string());
    }

    let role = match role {
        Ok(role) if errors.is_empty() => role,
        _ => {
            let data = BTreeMap::from([
                ("username".to_string(), form.username),
                ("email".to_string(), form.email),
                ("role".to_string(), ctx.form_value("role").to_string()),
            ]);
            ctx.session.set_form_state(USER_FORM, &errors, &data)?;
            return redirect(CREATE_PATH);
        }
    };

    let new_user = NewUser {
        username: form.username,
        email: form.email,
        password_hash: app.credentials().hash_password(&form.password).await?,
        role,
    };
    match UserStore::create_user(app.data_store(), new_user).await {
        Ok(_) => flash_and_redirect(ctx, FlashKind::Success, "User created successfully", INDEX_PATH),
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            flash_and_redirect(ctx, FlashKind::Error, "Failed to create user", CREATE_PATH)
        }
    }
}

pub(super) async fn edit(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    require_admin(&mut ctx.session)?;

    let user = match id_param(&params) {
        Some(id) => UserStore::get_user(app.data_store(), id).await?,
        None => None,
    };
    let Some(user) = user else {
        return flash_and_redirect(ctx, FlashKind::Error, "User not found", INDEX_PATH);
    };

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    let errors = ctx.session.take_form_errors(USER_FORM);
    Ok(Outcome::Render(View::new(
        "Edit User",
        Page::UserEdit {
            user,
            csrf_token,
            errors,
        },
    )))
}

pub(super) async fn update(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    require_admin(&mut ctx.session)?;

    let back = edit_path(raw_id(&params));
    if !ctx.is_post() {
        return redirect(back);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", back);
    }

    let existing = match id_param(&params) {
        Some(id) => UserStore::get_user(app.data_store(), id).await?,
        None => None,
    };
    let Some(existing) = existing else {
        return flash_and_redirect(ctx, FlashKind::Error, "User not found", INDEX_PATH);
    };

    let form = account_form(ctx);
    let mut errors =
        validate_account(app, &form, PasswordRule::Optional, Some(existing.id)).await?;
    let role = submitted_role(ctx);
    if role.is_err() {
        errors.push("Invalid role".to_string());
    }

    let role = match role {
        Ok(role) if errors.is_empty() => role,
        _ => {
            ctx.session
                .set_form_state(USER_FORM, &errors, &BTreeMap::new())?;
            return redirect(back);
        }
    };

    let password_hash = if form.password.is_empty() {
        None
    } else {
        Some(app.credentials().hash_password(&form.password).await?)
    };
    let update = UserUpdate {
        username: form.username,
        email: form.email,
        role,
        password_hash,
    };

    match UserStore::update_user(app.data_store(), existing.id, update).await {
        Ok(_) => flash_and_redirect(ctx, FlashKind::Success, "User updated successfully", INDEX_PATH),
        Err(UserError::NotFound) => {
            flash_and_redirect(ctx, FlashKind::Error, "User not found", INDEX_PATH)
        }
        Err(e) => {
            tracing::error!(user_id = existing.id, "Failed to update user: {}", e);
            flash_and_redirect(ctx, FlashKind::Error, "Failed to update user", back)
        }
    }
}

pub(super) async fn delete(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    let principal = require_admin(&mut ctx.session)?;

    if !ctx.is_post() {
        return redirect(INDEX_PATH);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", INDEX_PATH);
    }

    let Some(id) = id_param(&params) else {
        return flash_and_redirect(ctx, FlashKind::Error, "User not found", INDEX_PATH);
    };
    if id == principal.id {
        return flash_and_redirect(
            ctx,
            FlashKind::Error,
            "You cannot delete your own account",
            INDEX_PATH,
        );
    }

    match UserStore::delete_user(app.data_store(), id).await {
        Ok(()) => flash_and_redirect(ctx, FlashKind::Success, "User deleted successfully", INDEX_PATH),
        Err(UserError::LastAdmin) => flash_and_redirect(
            ctx,
            FlashKind::Error,
            "Failed to delete user. Cannot delete the last admin.",
            INDEX_PATH,
        ),
        Err(UserError::NotFound) => {
            flash_and_redirect(ctx, FlashKind::Error, "User not found", INDEX_PATH)
        }
        Err(e) => Err(e.into()),
    }
}
