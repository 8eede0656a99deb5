use std::{env, sync::LazyLock};

use crate::dispatch::FallbackPolicy;

/// Handler used when the first path segment names no registered controller.
pub(crate) const DEFAULT_HANDLER: &str = "DashboardController";
/// Method used when the second path segment names no method of the selected controller.
pub(crate) const DEFAULT_METHOD: &str = "index";

pub(crate) const UNIVERSITIES_PER_PAGE: i64 = 10;

/// `DISPATCH_FALLBACK`: `silent` (default) or `strict`.
pub static DISPATCH_FALLBACK: LazyLock<FallbackPolicy> = LazyLock::new(|| {
    match env::var("DISPATCH_FALLBACK") {
        Ok(value) => FallbackPolicy::parse(&value).unwrap_or_else(|| {
            tracing::warn!(value = %value, "Unknown DISPATCH_FALLBACK, using silent");
            FallbackPolicy::Silent
        }),
        Err(_) => FallbackPolicy::Silent,
    }
});
