//! Property-list body normalization.
//!
//! The store endpoints return plist content wrapped in several ways: a bare
//! `<dict>`, a full `<plist>` document, either of those inside a proprietary
//! `<Document>` envelope, or a raw run of `<key>`/value pairs. The plist
//! decoder only accepts a document or a `<dict>` element, so the body is
//! reduced to the smallest decodable fragment first.
//!
//! The stages run in a fixed order and each one feeds the next:
//!
//! 1. trim Unicode whitespace; an empty body is returned as-is
//! 2. unwrap the inner content of `<Document>`, if non-empty
//! 3. narrow to the first `<plist>...</plist>`
//! 4. narrow to the outermost `<dict>...</dict>` and stop
//! 5. otherwise wrap a bare `<key>` fragment in `<dict>`
//! 6. otherwise pass the body through unchanged
//!
//! Stage 4 wins even when the `<plist>` root is not a dict (for example an
//! array of dicts): the embedded dict is what gets decoded.

use regex::bytes::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static DOCUMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<Document\b[^>]*>(.*)</Document>"));
static PLIST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<plist\b[^>]*>.*?</plist>"));
static DICT_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<dict\b[^>]*>.*</dict>"));

const KEY_TAG: &[u8] = b"<key>";

fn compile(pattern: &str) -> Regex {
    // Patterns are literals; a failure here is a programming error.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid normalization pattern {pattern}: {e}"))
}

/// Reduce a response body to something the plist decoder accepts.
pub fn normalize_plist_body(body: &[u8]) -> Cow<'_, [u8]> {
    let mut normalized = trim_space(body);
    if normalized.is_empty() {
        return Cow::Borrowed(normalized);
    }

    if let Some(inner) = extract_document_inner(normalized) {
        normalized = inner;
    }

    if let Some(plist) = extract_embedded_plist(normalized) {
        normalized = plist;
    }

    if let Some(dict) = extract_embedded_dict(normalized) {
        return Cow::Borrowed(dict);
    }

    if contains_key_tag(normalized) {
        let mut wrapped = Vec::with_capacity(normalized.len() + 13);
        wrapped.extend_from_slice(b"<dict>");
        wrapped.extend_from_slice(normalized);
        wrapped.extend_from_slice(b"</dict>");
        return Cow::Owned(wrapped);
    }

    tracing::debug!(len = normalized.len(), "body has no plist structure, passing through");
    Cow::Borrowed(normalized)
}

fn extract_document_inner(body: &[u8]) -> Option<&[u8]> {
    let inner = trim_space(DOCUMENT_PATTERN.captures(body)?.get(1)?.as_bytes());
    (!inner.is_empty()).then_some(inner)
}

fn extract_embedded_plist(body: &[u8]) -> Option<&[u8]> {
    let matched = trim_space(PLIST_PATTERN.find(body)?.as_bytes());
    (!matched.is_empty()).then_some(matched)
}

fn extract_embedded_dict(body: &[u8]) -> Option<&[u8]> {
    let matched = trim_space(DICT_PATTERN.find(body)?.as_bytes());
    (!matched.is_empty()).then_some(matched)
}

/// Strip leading and trailing Unicode whitespace. Trimming stops at the
/// first byte that is not valid UTF-8.
fn trim_space(body: &[u8]) -> &[u8] {
    let start = match body.utf8_chunks().next() {
        Some(chunk) => {
            chunk.valid().len() - chunk.valid().trim_start_matches(char::is_whitespace).len()
        }
        None => return body,
    };
    let body = &body[start..];
    let end = match body.utf8_chunks().last() {
        Some(chunk) if chunk.invalid().is_empty() => {
            body.len() - (chunk.valid().len() - chunk.valid().trim_end_matches(char::is_whitespace).len())
        }
        _ => body.len(),
    };
    &body[..end]
}

fn contains_key_tag(body: &[u8]) -> bool {
    body.windows(KEY_TAG.len()).any(|w| w == KEY_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn normalize(body: &str) -> String {
        String::from_utf8(normalize_plist_body(body.as_bytes()).into_owned()).unwrap()
    }

    const DICT: &str = "<dict><key>x</key><string>y</string></dict>";

    #[test]
    fn test_document_wrapper_is_unwrapped() {
        let body = format!("<Document><plist>{DICT}</plist></Document>");
        assert_eq!(normalize(&body), DICT);

        let decoded: BTreeMap<String, String> =
            plist::from_bytes(&normalize_plist_body(body.as_bytes())).unwrap();
        assert_eq!(decoded.get("x").map(String::as_str), Some("y"));
    }

    #[test]
    fn test_document_with_attributes_and_whitespace() {
        let body = format!(
            "  <document xmlns=\"http://www.apple.com/itms/\" disableHistory=\"true\">\n  <plist version=\"1.0\">\n{DICT}\n</plist>\n</document>\n"
        );
        assert_eq!(normalize(&body), DICT);
    }

    #[test]
    fn test_empty_document_is_ignored() {
        let body = format!("<Document>   </Document>{DICT}");
        assert_eq!(normalize(&body), DICT);
    }

    #[test]
    fn test_bare_dict_is_unchanged() {
        assert_eq!(normalize(DICT), DICT);
    }

    #[test]
    fn test_full_plist_document_is_narrowed_to_dict() {
        let body = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n<plist version=\"1.0\">{DICT}</plist>"
        );
        assert_eq!(normalize(&body), DICT);
    }

    #[test]
    fn test_raw_fragment_is_wrapped() {
        assert_eq!(normalize("<key>x</key><string>y</string>"), DICT);
    }

    #[test]
    fn test_raw_fragment_is_trimmed_before_wrapping() {
        assert_eq!(normalize("\n  <key>x</key><string>y</string>  \n"), DICT);
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \r\n\t "), "");
    }

    #[test]
    fn test_unicode_whitespace_is_trimmed() {
        let padded = format!("\u{0B}\u{85}\u{A0}{DICT}\u{A0}\u{0B}");
        assert_eq!(normalize(&padded), DICT);

        let fragment = "\u{A0}<key>x</key><string>y</string>\u{85}\u{0C}";
        assert_eq!(normalize(fragment), DICT);

        assert_eq!(normalize("\u{0B}\u{A0}\u{2003}"), "");
    }

    #[test]
    fn test_trim_stops_at_invalid_utf8() {
        assert_eq!(trim_space(b"\xff \n"), b"\xff \n");
        assert_eq!(trim_space(b" ok \xff"), b"ok \xff");
        assert_eq!(trim_space(b"\x0b ok \xc2\xa0"), b"ok");
    }

    #[test]
    fn test_unstructured_body_passes_through() {
        assert_eq!(normalize("  <html>oops</html> "), "<html>oops</html>");
    }

    #[test]
    fn test_surrounding_text_is_dropped() {
        let body = format!("garbage before <plist>{DICT}</plist> garbage after");
        assert_eq!(normalize(&body), DICT);
    }

    #[test]
    fn test_tags_match_case_insensitively() {
        let body = "<PLIST><DICT><key>x</key><string>y</string></DICT></PLIST>";
        assert_eq!(
            normalize(body),
            "<DICT><key>x</key><string>y</string></DICT>"
        );
    }

    #[test]
    fn test_nested_dicts_keep_outermost() {
        let body = "<plist><dict><key>a</key><dict><key>b</key><string>c</string></dict></dict></plist>";
        assert_eq!(
            normalize(body),
            "<dict><key>a</key><dict><key>b</key><string>c</string></dict></dict>"
        );
    }

    #[test]
    fn test_multiline_content() {
        let body = "<plist>\n<dict>\n  <key>x</key>\n  <string>y</string>\n</dict>\n</plist>";
        assert_eq!(
            normalize(body),
            "<dict>\n  <key>x</key>\n  <string>y</string>\n</dict>"
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize(&format!("<Document><plist>{DICT}</plist></Document>"));
        assert_eq!(normalize(&once), once);

        let wrapped = normalize("<key>x</key><string>y</string>");
        assert_eq!(normalize(&wrapped), wrapped);
    }

    #[test]
    fn test_array_root_prefers_embedded_dict() {
        // A non-dict plist root still yields the embedded dict.
        let body = "<plist><array><dict><key>x</key><string>y</string></dict></array></plist>";
        assert_eq!(normalize(body), DICT);
    }

    #[test]
    fn test_plist_without_dict_is_kept() {
        let body = "<plist version=\"1.0\"><array><string>a</string></array></plist>";
        assert_eq!(normalize(body), body);

        let decoded: Vec<String> = plist::from_bytes(normalize(body).as_bytes()).unwrap();
        assert_eq!(decoded, vec!["a".to_string()]);
    }

    #[test]
    fn test_empty_body_fails_to_decode() {
        let normalized = normalize_plist_body(b"   ");
        let decoded: Result<BTreeMap<String, String>, _> = plist::from_bytes(&normalized);
        assert!(decoded.is_err());
    }
}
