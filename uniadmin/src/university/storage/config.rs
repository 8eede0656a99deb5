use std::sync::LazyLock;

use crate::storage::DB_TABLE_PREFIX;

pub(crate) static DB_TABLE_UNIVERSITIES: LazyLock<String> =
    LazyLock::new(|| format!("{}universities", *DB_TABLE_PREFIX));

/// Escapes LIKE wildcards in a user keyword and wraps it for a substring match.
pub(super) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("tech"), "%tech%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
