use std::sync::LazyLock;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("uniadmin_session".to_string())
});

/// Seconds a session survives without activity. Also the cookie Max-Age.
pub static SESSION_LIFETIME: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("SESSION_LIFETIME")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600)
});

/// Whether the session cookie carries the `Secure` attribute. Only `false`/`0` disable it.
pub static SESSION_COOKIE_SECURE: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_SECURE")
        .map(|v| parse_flag(&v, true))
        .unwrap_or(true)
});

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
