/// Splits a request path into segments.
///
/// One leading slash and any trailing slashes are dropped, so `"/a/b/"` and `"a/b"` agree.
/// Empty input yields no segments. Empty interior segments are kept in place.
/// Each segment is percent-decoded; a segment that does not decode is kept raw.
pub fn split_path(path: &str) -> Vec<String> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return Vec::new();
    }

    path.split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect()
}

/// Maps a first path segment to its handler name: `"university"` becomes `"UniversityController"`.
///
/// Only the first character is uppercased; the rest is kept as written.
pub fn handler_name(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => format!("{}{}Controller", first.to_uppercase(), chars.as_str()),
        None => "Controller".to_string(),
    }
}
