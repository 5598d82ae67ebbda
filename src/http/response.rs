//! HTTP Response with body access.

use crate::base::neterror::NetError;
use crate::http::result::flatten_headers;
use crate::http::ResponseBody;
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use hyper::body::Incoming;
use std::collections::HashMap;

/// Raw response as returned by a transport.
/// The body is read at most once.
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Option<ResponseBody>,
}

impl HttpResponse {
    /// Build a response from parts, typically for in-memory transports.
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            body: Some(body),
        }
    }

    /// Create from hyper Response<Incoming>.
    pub fn from_hyper(resp: http::Response<Incoming>) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body: Some(ResponseBody::from_incoming(body)),
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers flattened to one string per name, repeated values joined with "; ".
    pub fn flat_headers(&self) -> HashMap<String, String> {
        flatten_headers(&self.headers)
    }

    /// Take the response body for consumption.
    /// Can only be called once - subsequent calls return None.
    pub fn take_body(&mut self) -> Option<ResponseBody> {
        self.body.take()
    }

    /// Consume the body as bytes. A body that was already taken reads as empty.
    pub async fn bytes(&mut self) -> Result<Bytes, NetError> {
        match self.body.take() {
            Some(body) => body.bytes().await,
            None => Ok(Bytes::new()),
        }
    }

    /// Consume the body as text, replacing invalid UTF-8.
    pub async fn text(&mut self) -> Result<String, NetError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
