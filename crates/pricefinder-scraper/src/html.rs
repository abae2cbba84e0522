//! Minimal HTML extraction for product and quote pages.

use std::sync::LazyLock;

use regex::Regex;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid title regex"));

/// Returns the trimmed, entity-decoded `<title>` text, or `""` if absent.
pub(crate) fn extract_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .unwrap_or_default()
}

/// Builds the matcher for elements whose `class` attribute equals `class`
/// exactly. Compile once and reuse with [`extract_class_text`].
///
/// # Errors
///
/// Returns [`regex::Error`] if the pattern exceeds the regex size limits.
pub(crate) fn class_text_regex(class: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?is)<[a-z][a-z0-9]*\b[^>]*\bclass\s*=\s*["']{}["'][^>]*>([^<]*)"#,
        regex::escape(class)
    ))
}

/// Returns the text of the first element matched by `class_re`.
///
/// Only the text up to the element's first child tag is captured. Returns
/// `None` when no such element exists.
pub(crate) fn extract_class_text(html: &str, class_re: &Regex) -> Option<String> {
    class_re
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
}

/// Decodes the handful of named and numeric entities that show up in
/// storefront titles. `&amp;` goes last so `&amp;lt;` stays literal.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}
