//! Single-hop transports.
//!
//! [`RoundTrip`] executes exactly one HTTP exchange: no redirects, no
//! cookies. [`HttpTransport`] is the network implementation;
//! [`UserAgentTransport`] decorates any transport with a default
//! `User-Agent`.

use crate::base::neterror::NetError;
use crate::http::response::HttpResponse;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderValue, HOST, USER_AGENT};
use http::Request;
use http_body_util::Full;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use url::Url;

/// User agent sent when a request does not set one.
pub const DEFAULT_USER_AGENT: &str =
    "Configurator/2.15 (Macintosh; OS X 11.0.0; 16G29) AppleWebKit/2603.3.8";

/// Request type carried by transports: absolute URI, fully buffered body.
pub type TransportRequest = Request<Full<Bytes>>;

/// Executes one request/response exchange.
#[async_trait]
pub trait RoundTrip: Send + Sync {
    async fn round_trip(&self, req: TransportRequest) -> Result<HttpResponse, NetError>;
}

#[async_trait]
impl<T: RoundTrip + ?Sized> RoundTrip for Arc<T> {
    async fn round_trip(&self, req: TransportRequest) -> Result<HttpResponse, NetError> {
        (**self).round_trip(req).await
    }
}

/// HTTP/1.1 over a fresh TCP or TLS connection per request.
///
/// No timeout is applied; a stalled server stalls the caller.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    connect_job: ConnectJob,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tls_config(tls: TlsConfig) -> Self {
        Self {
            connect_job: ConnectJob::new(tls),
        }
    }
}

#[async_trait]
impl RoundTrip for HttpTransport {
    async fn round_trip(&self, req: TransportRequest) -> Result<HttpResponse, NetError> {
        let url = Url::parse(&req.uri().to_string()).map_err(NetError::InvalidUrl)?;

        let socket = self.connect_job.connect(&url).await?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(socket))
            .await
            .map_err(NetError::HttpProtocol)?;

        // Drive the connection until the response body is consumed or dropped.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });

        let (mut parts, body) = req.into_parts();

        if !parts.headers.contains_key(HOST) {
            let host = url.host_str().ok_or(NetError::ConnectionFailed)?;
            let authority = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
            let value = HeaderValue::from_str(&authority)
                .map_err(|e| NetError::CreateRequest(e.into()))?;
            parts.headers.insert(HOST, value);
        }

        // HTTP/1.1 origin-form request target.
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        parts.uri = target
            .parse()
            .map_err(|e: http::uri::InvalidUri| NetError::CreateRequest(e.into()))?;

        let resp = sender
            .send_request(Request::from_parts(parts, body))
            .await
            .map_err(NetError::HttpProtocol)?;

        Ok(HttpResponse::from_hyper(resp))
    }
}

/// Decorator that fills in `User-Agent` when the caller left it out.
///
/// Errors from the wrapped transport come back as
/// [`NetError::RoundTrip`].
#[derive(Debug, Clone)]
pub struct UserAgentTransport<T> {
    inner: T,
    user_agent: HeaderValue,
}

impl<T: RoundTrip> UserAgentTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }

    /// Use a custom default; an invalid header value keeps the built-in one.
    pub fn with_user_agent(inner: T, user_agent: &str) -> Self {
        let user_agent = HeaderValue::from_str(user_agent).unwrap_or_else(|_| {
            tracing::warn!(user_agent, "invalid user agent, using default");
            HeaderValue::from_static(DEFAULT_USER_AGENT)
        });
        Self { inner, user_agent }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: RoundTrip> RoundTrip for UserAgentTransport<T> {
    async fn round_trip(&self, mut req: TransportRequest) -> Result<HttpResponse, NetError> {
        let missing = req
            .headers()
            .get(USER_AGENT)
            .map_or(true, |v| v.is_empty());
        if missing {
            req.headers_mut()
                .insert(USER_AGENT, self.user_agent.clone());
        }

        self.inner
            .round_trip(req)
            .await
            .map_err(|e| NetError::RoundTrip(Box::new(e)))
    }
}
