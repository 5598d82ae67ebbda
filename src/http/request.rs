//! The request contract accepted by [`Client::send`](crate::client::Client::send).

use crate::base::neterror::NetError;
use crate::http::payload::Payload;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub use http::Method;

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(ResponseFormat::Json)
        } else if s.eq_ignore_ascii_case("xml") {
            Ok(ResponseFormat::Xml)
        } else {
            Err(NetError::UnsupportedFormat(s.to_string()))
        }
    }
}

/// A single API call.
///
/// Header names are matched case-insensitively when applied; if the same
/// name appears twice with different casing, which one wins is unspecified.
#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub headers: HashMap<String, String>,
    pub response_format: ResponseFormat,
    pub payload: Option<Box<dyn Payload>>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>, response_format: ResponseFormat) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            response_format,
            payload: None,
        }
    }

    pub fn get(url: impl Into<String>, response_format: ResponseFormat) -> Self {
        Self::new(Method::GET, url, response_format)
    }

    pub fn post(url: impl Into<String>, response_format: ResponseFormat) -> Self {
        Self::new(Method::POST, url, response_format)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn payload<P: Payload + 'static>(mut self, payload: P) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }
}
