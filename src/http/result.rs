//! The typed outcome of a request.

use http::HeaderMap;
use std::collections::HashMap;

/// Decoded response: status, flattened headers and the caller's data type.
///
/// Status interpretation is left to the caller; a 4xx/5xx still yields a
/// result as long as the body decodes.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResult<R> {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub data: R,
}

impl<R> HttpResult<R> {
    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Flatten a header map, joining repeated headers with "; ".
pub fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat = HashMap::with_capacity(headers.keys_len());

    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join("; ");
        flat.insert(canonical_header_key(name.as_str()), joined);
    }

    flat
}

/// `x-set-apple-store-front` -> `X-Set-Apple-Store-Front`.
pub fn canonical_header_key(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
