//! Canonical string construction.

/// Normalize a method for signing: trimmed and upper-cased.
pub fn normalize_method(method: &str) -> String {
    method.trim().to_ascii_uppercase()
}

/// Normalize a content type for signing and transmission.
///
/// Each `;`-separated segment is trimmed and empty segments are dropped, so
/// `"multipart/form-data ;boundary=x "` becomes
/// `"multipart/form-data; boundary=x"`.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build the canonical string that is fed into the HMAC.
pub fn build_canonical_string(
    method: &str,
    path: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        normalize_method(method),
        path.trim(),
        content_md5.trim(),
        normalize_content_type(content_type),
        date.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_string_layout() {
        let canonical = build_canonical_string(
            "post",
            "/memories",
            "abc",
            "application/json",
            "Fri, 15 Dec 2023 10:30:45 +0000",
        );
        assert_eq!(
            canonical,
            "POST\n/memories\nabc\napplication/json\nFri, 15 Dec 2023 10:30:45 +0000"
        );
    }

    #[test]
    fn test_canonical_string_absent_fields_are_empty() {
        let canonical = build_canonical_string("GET", "/languages", "", "", "");
        assert_eq!(canonical, "GET\n/languages\n\n\n");
    }

    #[test]
    fn test_whitespace_does_not_change_canonical_string() {
        let a = build_canonical_string("GET ", "/a", " md5", "application/json ", "date ");
        let b = build_canonical_string("GET", "/a", "md5", "application/json", "date");
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("application/json"), "application/json");
        assert_eq!(
            normalize_content_type(" multipart/form-data ;boundary=abc "),
            "multipart/form-data; boundary=abc"
        );
        assert_eq!(
            normalize_content_type("application/json;charset=utf-8;"),
            "application/json; charset=utf-8"
        );
        assert_eq!(normalize_content_type(""), "");
    }
}
