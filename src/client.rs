//! Typed HTTP client with builder pattern.
//!
//! [`Client<R>`] sends one [`Request`], follows redirects, persists cookies
//! and decodes the body into `R` as JSON or as a property list.
//!
//! # Example
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use storenet::{Client, HttpClient, Request, ResponseFormat};
//!
//! #[derive(Deserialize)]
//! struct Lookup {
//!     #[serde(rename = "resultCount")]
//!     result_count: u32,
//! }
//!
//! # async fn run() -> Result<(), storenet::NetError> {
//! let client: Client<Lookup> = Client::builder().build();
//! let result = client
//!     .send(Request::get(
//!         "https://itunes.apple.com/lookup?bundleId=com.example.app",
//!         ResponseFormat::Json,
//!     ))
//!     .await?;
//! println!("{} results", result.data.result_count);
//! # Ok(())
//! # }
//! ```

use crate::base::neterror::NetError;
use crate::cookies::monster::CookieMonster;
use crate::cookies::CookieJar;
use crate::http::normalize::normalize_plist_body;
use crate::http::response::HttpResponse;
use crate::http::result::HttpResult;
use crate::http::transport::{HttpTransport, RoundTrip, UserAgentTransport, DEFAULT_USER_AGENT};
use crate::http::{Method, Request, ResponseFormat};
use crate::urlrequest::job::{URLRequestHttpJob, DEFAULT_REDIRECT_LIMIT};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use url::Url;

/// The seam endpoint code depends on, so it can be driven by a fake.
#[async_trait]
pub trait HttpClient<R: Send>: Send + Sync {
    async fn send(&self, request: Request) -> Result<HttpResult<R>, NetError>;
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Sent when a request carries no `User-Agent`.
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: DEFAULT_REDIRECT_LIMIT,
        }
    }
}

/// HTTP client decoding responses into `R`.
///
/// Use [`Client::builder()`] to configure and create a client. Clones share
/// the transport and cookie jar.
pub struct Client<R> {
    job: URLRequestHttpJob,
    cookie_jar: Arc<dyn CookieJar>,
    config: ClientConfig,
    _data: PhantomData<fn() -> R>,
}

impl<R> Clone for Client<R> {
    fn clone(&self) -> Self {
        Self {
            job: self.job.clone(),
            cookie_jar: self.cookie_jar.clone(),
            config: self.config.clone(),
            _data: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Client<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish()
    }
}

impl<R> Client<R> {
    /// Network client with the given jar and default settings.
    pub fn new(cookie_jar: Arc<dyn CookieJar>) -> Self {
        Self::builder().cookie_jar(cookie_jar).build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder<R> {
        ClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cookie_jar(&self) -> &Arc<dyn CookieJar> {
        &self.cookie_jar
    }

    /// Build a raw request. `body` may be empty.
    pub fn new_request(
        &self,
        method: Method,
        url: &str,
        body: impl Into<Bytes>,
    ) -> Result<http::Request<Bytes>, NetError> {
        let url = Url::parse(url).map_err(NetError::InvalidUrl)?;
        http::Request::builder()
            .method(method)
            .uri(url.as_str())
            .body(body.into())
            .map_err(NetError::CreateRequest)
    }

    /// Run a raw request through the redirect job, persisting cookies,
    /// and hand back the undecoded response.
    pub async fn execute(&self, req: http::Request<Bytes>) -> Result<HttpResponse, NetError> {
        let response = self
            .job
            .start(req)
            .await
            .map_err(|e| NetError::Execute(Box::new(e)))?;

        self.cookie_jar.save().map_err(NetError::SaveCookies)?;
        Ok(response)
    }
}

impl<R: DeserializeOwned> Client<R> {
    /// Send a request and decode its body according to
    /// [`Request::response_format`].
    pub async fn send(&self, request: Request) -> Result<HttpResult<R>, NetError> {
        let body = match &request.payload {
            Some(payload) => Bytes::from(payload.data().map_err(NetError::PayloadData)?),
            None => Bytes::new(),
        };

        let mut req = self.new_request(request.method.clone(), &request.url, body)?;
        for (key, value) in &request.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| NetError::CreateRequest(e.into()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| NetError::CreateRequest(e.into()))?;
            req.headers_mut().insert(name, value);
        }

        let response = self
            .job
            .start(req)
            .await
            .map_err(|e| NetError::Request(Box::new(e)))?;

        self.cookie_jar.save().map_err(NetError::SaveCookies)?;

        match request.response_format {
            ResponseFormat::Json => handle_json_response(response).await,
            ResponseFormat::Xml => handle_xml_response(response).await,
        }
    }
}

#[async_trait]
impl<R> HttpClient<R> for Client<R>
where
    R: DeserializeOwned + Send + 'static,
{
    async fn send(&self, request: Request) -> Result<HttpResult<R>, NetError> {
        Client::send(self, request).await
    }
}

async fn handle_json_response<R: DeserializeOwned>(
    mut response: HttpResponse,
) -> Result<HttpResult<R>, NetError> {
    let body = response.bytes().await?;
    let data = serde_json::from_slice(&body).map_err(NetError::UnmarshalJson)?;

    Ok(HttpResult {
        status_code: response.status().as_u16(),
        headers: response.flat_headers(),
        data,
    })
}

async fn handle_xml_response<R: DeserializeOwned>(
    mut response: HttpResponse,
) -> Result<HttpResult<R>, NetError> {
    let body = response.bytes().await?;
    let normalized = normalize_plist_body(&body);
    let data = plist::from_bytes(&normalized).map_err(NetError::UnmarshalXml)?;

    Ok(HttpResult {
        status_code: response.status().as_u16(),
        headers: response.flat_headers(),
        data,
    })
}

/// Builder for creating a [`Client`].
pub struct ClientBuilder<R> {
    cookie_jar: Option<Arc<dyn CookieJar>>,
    transport: Option<Arc<dyn RoundTrip>>,
    config: ClientConfig,
    _data: PhantomData<fn() -> R>,
}

impl<R> Default for ClientBuilder<R> {
    fn default() -> Self {
        Self {
            cookie_jar: None,
            transport: None,
            config: ClientConfig::default(),
            _data: PhantomData,
        }
    }
}

impl<R> ClientBuilder<R> {
    /// Set cookie jar. Defaults to an in-memory [`CookieMonster`].
    pub fn cookie_jar(mut self, jar: Arc<dyn CookieJar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Replace the network transport. It is still wrapped with the
    /// default `User-Agent` decorator.
    pub fn transport(mut self, transport: Arc<dyn RoundTrip>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Client<R> {
        let inner = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        let transport: Arc<dyn RoundTrip> = Arc::new(UserAgentTransport::with_user_agent(
            inner,
            &self.config.user_agent,
        ));
        let cookie_jar = self
            .cookie_jar
            .unwrap_or_else(|| Arc::new(CookieMonster::new()));

        let job = URLRequestHttpJob::new(transport, cookie_jar.clone())
            .with_redirect_limit(self.config.max_redirects);

        Client {
            job,
            cookie_jar,
            config: self.config,
            _data: PhantomData,
        }
    }
}
