//! University directory pages. Any signed-in user may browse and edit; only admins delete.

use std::collections::BTreeMap;

use super::app::App;
use super::context::RequestContext;
use super::outcome::{ActionResult, Outcome, Page, View, flash_and_redirect, id_param, redirect};
use super::validation::validate_university;
use crate::authz::{is_admin, require_admin, require_authenticated};
use crate::config::UNIVERSITIES_PER_PAGE;
use crate::session::{FlashKind, issue_csrf_token};
use crate::university::{ImageStore, UniversityError, UniversityInput, UniversityStore};
use crate::utils::sanitize_text;

const UNIVERSITY_FORM: &str = "university";
const INDEX_PATH: &str = "university";
const CREATE_PATH: &str = "university/create";
const IMAGE_FIELD: &str = "image";
const TEXT_FIELDS: [&str; 6] = ["name", "address", "description", "website", "phone", "email"];

fn detail_path(id: i64) -> String {
    format!("university/detail/{id}")
}

fn edit_path(params: &[String]) -> String {
    format!(
        "university/edit/{}",
        params.first().map(String::as_str).unwrap_or_default()
    )
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn university_input(ctx: &RequestContext) -> UniversityInput {
    let field = |name: &str| sanitize_text(ctx.form_value(name));
    UniversityInput {
        name: field("name"),
        address: field("address"),
        description: optional(field("description")),
        image: None,
        website: optional(field("website")),
        phone: optional(field("phone")),
        email: optional(field("email")),
    }
}

fn submitted_data(ctx: &RequestContext) -> BTreeMap<String, String> {
    TEXT_FIELDS
        .iter()
        .map(|name| (name.to_string(), sanitize_text(ctx.form_value(name))))
        .collect()
}

/// Validates the text fields and, if present, the uploaded image. Nothing is written.
fn collect_errors(ctx: &RequestContext, input: &UniversityInput) -> Vec<String> {
    let mut errors = validate_university(input);
    if let Some(file) = ctx.file(IMAGE_FIELD) {
        if let Err(e) = ImageStore::validate(file) {
            errors.push(e.to_string());
        }
    }
    errors
}

/// Stores the uploaded image, if any. Returns `Err` with the user-facing message on failure.
async fn save_image(app: &App, ctx: &RequestContext) -> Result<Option<String>, String> {
    match ctx.file(IMAGE_FIELD) {
        Some(file) => app.images().save(file).await.map(Some).map_err(|e| {
            tracing::error!(error = ?e, "Image upload failed");
            e.to_string()
        }),
        None => Ok(None),
    }
}

pub(super) async fn index(app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    require_authenticated(&mut ctx.session)?;

    let search = ctx.query_value("search").unwrap_or_default().trim().to_string();
    let current_page = ctx
        .query_value("page")
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let offset = (current_page - 1).saturating_mul(UNIVERSITIES_PER_PAGE);

    let store = app.data_store();
    let search_filter = (!search.is_empty()).then_some(search.as_str());
    let universities =
        UniversityStore::list(store, Some(UNIVERSITIES_PER_PAGE), offset, search_filter).await?;
    let total = UniversityStore::count(store, search_filter).await?;
    let total_pages = (total + UNIVERSITIES_PER_PAGE - 1) / UNIVERSITIES_PER_PAGE;

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    Ok(Outcome::Render(View::new(
        "Universities",
        Page::UniversityList {
            universities,
            search,
            current_page,
            total_pages,
            total,
            csrf_token,
            is_admin: is_admin(&ctx.session),
        },
    )))
}

pub(super) async fn detail(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    require_authenticated(&mut ctx.session)?;

    let university = match id_param(&params) {
        Some(id) => UniversityStore::get(app.data_store(), id).await?,
        None => None,
    };
    let Some(university) = university else {
        return flash_and_redirect(ctx, FlashKind::Error, "University not found", INDEX_PATH);
    };

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    Ok(Outcome::Render(View::new(
        university.name.clone(),
        Page::UniversityDetail {
            university,
            csrf_token,
            is_admin: is_admin(&ctx.session),
        },
    )))
}

pub(super) async fn create(_app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    require_authenticated(&mut ctx.session)?;

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    let errors = ctx.session.take_form_errors(UNIVERSITY_FORM);
    let data = ctx.session.take_form_data(UNIVERSITY_FORM);
    Ok(Outcome::Render(View::new(
        "Add New University",
        Page::UniversityCreate {
            csrf_token,
            errors,
            data,
        },
    )))
}

pub(super) async fn store(app: &App, ctx: &mut RequestContext, _params: Vec<String>) -> ActionResult {
    let principal = require_authenticated(&mut ctx.session)?;

    if !ctx.is_post() {
        return redirect(CREATE_PATH);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", CREATE_PATH);
    }

    let mut input = university_input(ctx);
    let mut errors = collect_errors(ctx, &input);
    if errors.is_empty() {
        match save_image(app, ctx).await {
            Ok(image) => input.image = image,
            Err(message) => errors.push(message),
        }
    }
    if !errors.is_empty() {
        let data = submitted_data(ctx);
        ctx.session.set_form_state(UNIVERSITY_FORM, &errors, &data)?;
        return redirect(CREATE_PATH);
    }

    let id = match UniversityStore::create(app.data_store(), &input, principal.id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to add university: {}", e);
            if let Some(image) = &input.image {
                app.images().remove(image).await;
            }
            return flash_and_redirect(ctx, FlashKind::Error, "Failed to add university", CREATE_PATH);
        }
    };
    flash_and_redirect(
        ctx,
        FlashKind::Success,
        "University added successfully",
        detail_path(id),
    )
}

pub(super) async fn edit(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    require_authenticated(&mut ctx.session)?;

    let university = match id_param(&params) {
        Some(id) => UniversityStore::get(app.data_store(), id).await?,
        None => None,
    };
    let Some(university) = university else {
        return flash_and_redirect(ctx, FlashKind::Error, "University not found", INDEX_PATH);
    };

    let csrf_token = issue_csrf_token(&mut ctx.session)?;
    let errors = ctx.session.take_form_errors(UNIVERSITY_FORM);
    Ok(Outcome::Render(View::new(
        "Edit University",
        Page::UniversityEdit {
            university,
            csrf_token,
            errors,
        },
    )))
}

pub(super) async fn update(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    require_authenticated(&mut ctx.session)?;

    let back = edit_path(&params);
    if !ctx.is_post() {
        return redirect(back);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", back);
    }

    let existing = match id_param(&params) {
        Some(id) => UniversityStore::get(app.data_store(), id).await?,
        None => None,
    };
    let Some(existing) = existing else {
        return flash_and_redirect(ctx, FlashKind::Error, "University not found", INDEX_PATH);
    };

    let mut input = university_input(ctx);
    input.image = existing.image.clone();
    let mut errors = collect_errors(ctx, &input);
    let mut new_image = None;
    if errors.is_empty() {
        match save_image(app, ctx).await {
            Ok(image) => new_image = image,
            Err(message) => errors.push(message),
        }
    }
    if !errors.is_empty() {
        ctx.session
            .set_form_state(UNIVERSITY_FORM, &errors, &BTreeMap::new())?;
        return redirect(back);
    }
    if new_image.is_some() {
        input.image = new_image.clone();
    }

    let result = UniversityStore::update(app.data_store(), existing.id, &input).await;
    match (&result, &new_image, &existing.image) {
        (Ok(()), Some(_), Some(old)) => app.images().remove(old).await,
        (Err(_), Some(new), _) => app.images().remove(new).await,
        _ => {}
    }

    match result {
        Ok(()) => flash_and_redirect(
            ctx,
            FlashKind::Success,
            "University updated successfully",
            detail_path(existing.id),
        ),
        Err(UniversityError::NotFound) => {
            flash_and_redirect(ctx, FlashKind::Error, "University not found", INDEX_PATH)
        }
        Err(e) => {
            tracing::error!(university_id = existing.id, "Failed to update university: {}", e);
            flash_and_redirect(ctx, FlashKind::Error, "Failed to update university", back)
        }
    }
}

pub(super) async fn delete(app: &App, ctx: &mut RequestContext, params: Vec<String>) -> ActionResult {
    require_admin(&mut ctx.session)?;

    if !ctx.is_post() {
        return redirect(INDEX_PATH);
    }
    if !ctx.csrf_valid() {
        return flash_and_redirect(ctx, FlashKind::Error, "Invalid CSRF token", INDEX_PATH);
    }

    let existing = match id_param(&params) {
        Some(id) => UniversityStore::get(app.data_store(), id).await?,
        None => None,
    };
    let Some(existing) = existing else {
        return flash_and_redirect(ctx, FlashKind::Error, "Failed to delete university", INDEX_PATH);
    };

    match UniversityStore::delete(app.data_store(), existing.id).await {
        Ok(()) => {
            if let Some(image) = &existing.image {
                app.images().remove(image).await;
            }
            flash_and_redirect(
                ctx,
                FlashKind::Success,
                "University deleted successfully",
                INDEX_PATH,
            )
        }
        Err(UniversityError::NotFound) => {
            flash_and_redirect(ctx, FlashKind::Error, "Failed to delete university", INDEX_PATH)
        }
        Err(e) => Err(e.into()),
    }
}
