//! Request body producers.
//!
//! A [`Payload`] is serialized lazily when the request is sent; a failure
//! aborts the send before any network activity.

use std::collections::BTreeMap;
use std::fmt::Debug;
use thiserror::Error;

/// Failure to serialize a request body.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("plist encoding failed: {0}")]
    Plist(#[from] plist::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

/// Something that can produce the bytes of a request body.
pub trait Payload: Debug + Send + Sync {
    fn data(&self) -> Result<Vec<u8>, PayloadError>;
}

/// A property-list dictionary sent as an XML plist document.
#[derive(Debug, Clone, Default)]
pub struct XmlPayload {
    pub content: BTreeMap<String, plist::Value>,
}

impl XmlPayload {
    pub fn new(content: BTreeMap<String, plist::Value>) -> Self {
        Self { content }
    }
}

impl Payload for XmlPayload {
    fn data(&self) -> Result<Vec<u8>, PayloadError> {
        let dict: plist::Dictionary = self
            .content
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut buf = Vec::new();
        plist::Value::Dictionary(dict).to_writer_xml(&mut buf)?;
        Ok(buf)
    }
}

/// Form fields sent as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default)]
pub struct UrlPayload {
    pub content: BTreeMap<String, String>,
}

impl UrlPayload {
    pub fn new(content: BTreeMap<String, String>) -> Self {
        Self { content }
    }
}

impl Payload for UrlPayload {
    fn data(&self) -> Result<Vec<u8>, PayloadError> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.content.iter())
            .finish();
        Ok(encoded.into_bytes())
    }
}
