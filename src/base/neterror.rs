use crate::http::payload::PayloadError;
use std::io;
use thiserror::Error;

/// Every failure a request can surface.
///
/// Stage variants wrap the underlying cause so the rendered message reads
/// "<stage>: <cause>". Leaf variants follow Chromium's `net_error_list.h`
/// naming for transport failures.
#[derive(Debug, Error)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name not resolved for {domain}: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: io::Error,
    },
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("HTTP protocol error: {0}")]
    HttpProtocol(#[source] hyper::Error),

    // Redirect Errors
    #[error("Invalid redirect")]
    InvalidRedirect,
    #[error("Too many redirects")]
    TooManyRedirects,

    // Request stages
    #[error("failed to get payload data: {0}")]
    PayloadData(#[source] PayloadError),
    #[error("failed to create request: invalid url: {0}")]
    InvalidUrl(#[source] url::ParseError),
    #[error("failed to create request: {0}")]
    CreateRequest(#[source] http::Error),
    #[error("failed to make round trip: {0}")]
    RoundTrip(#[source] Box<NetError>),
    #[error("request failed: {0}")]
    Request(#[source] Box<NetError>),
    #[error("received error: {0}")]
    Execute(#[source] Box<NetError>),
    #[error("failed to save cookies: {0}")]
    SaveCookies(#[source] io::Error),
    #[error("content type is not supported ({0})")]
    UnsupportedFormat(String),
    #[error("failed to read response body: {0}")]
    ReadBody(#[source] hyper::Error),
    #[error("failed to unmarshal json: {0}")]
    UnmarshalJson(#[source] serde_json::Error),
    #[error("failed to unmarshal xml: {0}")]
    UnmarshalXml(#[source] plist::Error),
}

impl NetError {
    /// Create a connection error that names its destination.
    pub fn connection_failed_to(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.into(),
            port,
            source,
        }
    }

    /// Create a DNS error that names the domain.
    pub fn dns_failed(domain: impl Into<String>, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            source,
        }
    }

    /// The innermost error of a chain of stage wrappers.
    pub fn root(&self) -> &NetError {
        match self {
            NetError::RoundTrip(inner) | NetError::Request(inner) | NetError::Execute(inner) => {
                inner.root()
            }
            other => other,
        }
    }

    /// Whether the failure happened while decoding an otherwise complete response.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            NetError::UnmarshalJson(_) | NetError::UnmarshalXml(_)
        )
    }
}
