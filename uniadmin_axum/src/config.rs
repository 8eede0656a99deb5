//! Central configuration for the uniadmin-axum crate

use std::sync::LazyLock;

use chrono_tz::Tz;

const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jakarta;

/// Mount point of the application, e.g. `/admin`. Empty means the site root.
/// Default: ""
pub static UNIADMIN_BASE_PATH: LazyLock<String> = LazyLock::new(|| {
    normalize_base_path(&std::env::var("UNIADMIN_BASE_PATH").unwrap_or_default())
});

/// Timezone used when displaying timestamps
/// Default: "Asia/Jakarta"
pub static DISPLAY_TIMEZONE: LazyLock<Tz> =
    LazyLock::new(|| parse_timezone(std::env::var("DISPLAY_TIMEZONE").ok().as_deref()));

/// `"admin/"` and `"/admin"` both become `"/admin"`; `"/"` becomes `""`.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn parse_timezone(raw: Option<&str>) -> Tz {
    match raw {
        Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(timezone = %name, "Unknown DISPLAY_TIMEZONE, using Asia/Jakarta");
            DEFAULT_TIMEZONE
        }),
        None => DEFAULT_TIMEZONE,
    }
}

/// The path below the mount point, or `None` when `path` lies outside it.
pub(crate) fn strip_base_path<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
