//! Askama templates for every page, and the conversion from core view data.

use std::collections::BTreeMap;

use askama::Template;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uniadmin::{DashboardStats, Flash, FlashKind, Page, Principal, University, User, View};

const DATE_FORMAT: &str = "%d %b %Y";
const DATETIME_FORMAT: &str = "%d %b %Y %H:%M";

fn fmt_date(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format(DATE_FORMAT).to_string()
}

fn fmt_datetime(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format(DATETIME_FORMAT).to_string()
}

struct FlashView {
    class: &'static str,
    message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        let class = match flash.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "danger",
            FlashKind::Warning => "warning",
            FlashKind::Info => "info",
        };
        Self {
            class,
            message: flash.message,
        }
    }
}

struct NavUser {
    username: String,
    role: String,
    initial: String,
    is_admin: bool,
}

impl From<Principal> for NavUser {
    fn from(principal: Principal) -> Self {
        let initial = principal
            .username
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "U".to_string());
        Self {
            is_admin: principal.is_admin(),
            role: principal.role.to_string(),
            username: principal.username,
            initial,
        }
    }
}

/// Values the layout and the standalone pages share.
struct Chrome {
    title: String,
    base: String,
    with_layout: bool,
    flash: Option<FlashView>,
    nav: Option<NavUser>,
}

struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    is_admin: bool,
    is_self: bool,
    created_at: String,
}

impl UserRow {
    fn new(user: User, current_user_id: i64, tz: Tz) -> Self {
        Self {
            id: user.id,
            is_self: user.id == current_user_id,
            is_admin: user.role == uniadmin::Role::Admin,
            role: user.role.to_string(),
            username: user.username,
            email: user.email,
            created_at: fmt_date(user.created_at, tz),
        }
    }
}

struct UniversityRow {
    id: i64,
    name: String,
    address: String,
    description: String,
    image_url: String,
    website: String,
    /// Only set for http(s) URLs
    website_href: String,
    phone: String,
    email: String,
    creator: String,
    created_at: String,
    updated_at: String,
}

impl UniversityRow {
    fn new(university: University, base: &str, tz: Tz) -> Self {
        Self {
            id: university.id,
            name: university.name,
            address: university.address,
            description: university.description.unwrap_or_default(),
            image_url: university
                .image
                .map(|image| format!("{base}/assets/uploads/{}", urlencoding::encode(&image)))
                .unwrap_or_default(),
            website_href: university
                .website
                .as_deref()
                .filter(|w| w.starts_with("http://") || w.starts_with("https://"))
                .map(str::to_string)
                .unwrap_or_default(),
            website: university.website.unwrap_or_default(),
            phone: university.phone.unwrap_or_default(),
            email: university.email.unwrap_or_default(),
            creator: university
                .creator_name
                .unwrap_or_else(|| "Unknown".to_string()),
            created_at: fmt_datetime(university.created_at, tz),
            updated_at: fmt_datetime(university.updated_at, tz),
        }
    }
}

struct PageLink {
    number: i64,
    active: bool,
}

/// Submitted values echoed back into a form after a validation failure.
struct FormData(BTreeMap<String, String>);

impl FormData {
    fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate {
    chrome: Chrome,
    csrf_token: String,
}

#[derive(Template)]
#[template(path = "register.j2", escape = "html")]
struct RegisterTemplate {
    chrome: Chrome,
    csrf_token: String,
    errors: Vec<String>,
    data: FormData,
}

#[derive(Template)]
#[template(path = "dashboard.j2", escape = "html")]
struct DashboardTemplate {
    chrome: Chrome,
    stats: DashboardStats,
    recent: Vec<UniversityRow>,
    login_time: String,
}

#[derive(Template)]
#[template(path = "users_index.j2", escape = "html")]
struct UserListTemplate {
    chrome: Chrome,
    users: Vec<UserRow>,
    csrf_token: String,
}

#[derive(Template)]
#[template(path = "users_create.j2", escape = "html")]
struct UserCreateTemplate {
    chrome: Chrome,
    csrf_token: String,
    errors: Vec<String>,
    data: FormData,
}

#[derive(Template)]
#[template(path = "users_edit.j2", escape = "html")]
struct UserEditTemplate {
    chrome: Chrome,
    csrf_token: String,
    errors: Vec<String>,
    user: UserRow,
}

#[derive(Template)]
#[template(path = "universities_index.j2", escape = "html")]
struct UniversityListTemplate {
    chrome: Chrome,
    universities: Vec<UniversityRow>,
    search: String,
    search_query: String,
    current_page: i64,
    total_pages: i64,
    total: i64,
    pages: Vec<PageLink>,
    csrf_token: String,
    is_admin: bool,
}

#[derive(Template)]
#[template(path = "universities_detail.j2", escape = "html")]
struct UniversityDetailTemplate {
    chrome: Chrome,
    university: UniversityRow,
    csrf_token: String,
    is_admin: bool,
}

#[derive(Template)]
#[template(path = "universities_create.j2", escape = "html")]
struct UniversityCreateTemplate {
    chrome: Chrome,
    csrf_token: String,
    errors: Vec<String>,
    data: FormData,
}

#[derive(Template)]
#[template(path = "universities_edit.j2", escape = "html")]
struct UniversityEditTemplate {
    chrome: Chrome,
    csrf_token: String,
    errors: Vec<String>,
    university: UniversityRow,
}

/// Renders a core [`View`] to HTML for an application mounted at `base`.
pub(crate) fn render(view: View, base: &str, tz: Tz) -> Result<String, askama::Error> {
    let current_user_id = view.principal.as_ref().map(|p| p.id).unwrap_or_default();
    let chrome = Chrome {
        title: view.title,
        base: base.to_string(),
        with_layout: view.with_layout,
        flash: view.flash.map(FlashView::from),
        nav: view.principal.map(NavUser::from),
    };
    let university_row = |u: University| UniversityRow::new(u, base, tz);

    match view.page {
        Page::Login { csrf_token } => LoginTemplate { chrome, csrf_token }.render(),
        Page::Register {
            csrf_token,
            errors,
            data,
        } => RegisterTemplate {
            chrome,
            csrf_token,
            errors,
            data: FormData(data),
        }
        .render(),
        Page::Dashboard {
            stats,
            recent,
            login_time,
        } => DashboardTemplate {
            chrome,
            stats,
            recent: recent.into_iter().map(university_row).collect(),
            login_time: login_time
                .map(|t| fmt_datetime(t, tz))
                .unwrap_or_default(),
        }
        .render(),
        Page::UserList {
            users,
            csrf_token,
            current_user_id,
        } => UserListTemplate {
            chrome,
            users: users
                .into_iter()
                .map(|u| UserRow::new(u, current_user_id, tz))
                .collect(),
            csrf_token,
        }
        .render(),
        Page::UserCreate {
            csrf_token,
            errors,
            data,
        } => UserCreateTemplate {
            chrome,
            csrf_token,
            errors,
            data: FormData(data),
        }
        .render(),
        Page::UserEdit {
            user,
            csrf_token,
            errors,
        } => UserEditTemplate {
            chrome,
            csrf_token,
            errors,
            user: UserRow::new(user, current_user_id, tz),
        }
        .render(),
        Page::UniversityList {
            universities,
            search,
            current_page,
            total_pages,
            total,
            csrf_token,
            is_admin,
        } => UniversityListTemplate {
            chrome,
            universities: universities.into_iter().map(university_row).collect(),
            search_query: urlencoding::encode(&search).into_owned(),
            search,
            current_page,
            total_pages,
            total,
            pages: (1..=total_pages)
                .map(|number| PageLink {
                    number,
                    active: number == current_page,
                })
                .collect(),
            csrf_token,
            is_admin,
        }
        .render(),
        Page::UniversityDetail {
            university,
            csrf_token,
            is_admin,
        } => UniversityDetailTemplate {
            chrome,
            university: university_row(university),
            csrf_token,
            is_admin,
        }
        .render(),
        Page::UniversityCreate {
            csrf_token,
            errors,
            data,
        } => UniversityCreateTemplate {
            chrome,
            csrf_token,
            errors,
            data: FormData(data),
        }
        .render(),
        Page::UniversityEdit {
            university,
            csrf_token,
            errors,
        } => UniversityEditTemplate {
            chrome,
            csrf_token,
            errors,
            university: university_row(university),
        }
        .render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dates_use_display_timezone() {
        // Given 2024-01-31 20:30 UTC
        let dt = Utc.with_ymd_and_hms(2024, 1, 31, 20, 30, 0).unwrap();

        // Then Jakarta (UTC+7) is already on the next day
        assert_eq!(fmt_date(dt, chrono_tz::Asia::Jakarta), "01 Feb 2024");
        assert_eq!(fmt_datetime(dt, chrono_tz::Asia::Jakarta), "01 Feb 2024 03:30");
        assert_eq!(fmt_datetime(dt, chrono_tz::UTC), "31 Jan 2024 20:30");
    }

    #[test]
    fn test_login_page_escapes_flash() {
        // Given a flash carrying markup
        let view = View {
            title: "Login".to_string(),
            page: Page::Login {
                csrf_token: "tok".to_string(),
            },
            with_layout: false,
            flash: Some(Flash {
                kind: FlashKind::Error,
                message: "<script>alert(1)</script>".to_string(),
            }),
            principal: None,
        };

        // When rendering
        let html = render(view, "/admin", chrono_tz::UTC).unwrap();

        // Then the markup is escaped and links honor the mount point
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&#60;script&#62;alert(1)&#60;/script&#62;"));
        assert!(html.contains("alert-danger"));
        assert!(html.contains(r#"action="/admin/auth/processLogin""#));
        assert!(html.contains(r#"value="tok""#));
    }

    #[test]
    fn test_university_list_pagination_links() {
        let view = View::new(
            "Universities",
            Page::UniversityList {
                universities: Vec::new(),
                search: "gadjah mada".to_string(),
                current_page: 2,
                total_pages: 3,
                total: 25,
                csrf_token: "tok".to_string(),
                is_admin: false,
            },
        );

        let html = render(view, "", chrono_tz::UTC).unwrap();

        assert!(html.contains("/university?page=3&amp;search=gadjah%20mada"));
        assert!(html.contains("Page 2 of 3"));
        assert!(html.contains(r#"value="gadjah mada""#));
    }

    #[test]
    fn test_nav_user_initial() {
        let nav = NavUser::from(Principal {
            id: 1,
            username: "éva".to_string(),
            email: "eva@example.com".to_string(),
            role: uniadmin::Role::Admin,
        });
        assert_eq!(nav.initial, "É");
        assert!(nav.is_admin);
        assert_eq!(nav.role, "admin");
    }
}
