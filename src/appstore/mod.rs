//! App Store endpoints built on [`HttpClient`].
//!
//! Each endpoint builds a [`Request`](crate::http::Request), sends it through
//! the client typed for its response and interprets the result. The clients
//! and the machine identity are injected so tests can swap them out.

pub mod bag;
pub mod constants;
pub mod lookup;
pub mod storefront;

use crate::base::neterror::NetError;
use crate::client::{Client, HttpClient};
use crate::cookies::CookieJar;
use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

pub use bag::{BagOutput, BagResult, UrlBag};
pub use lookup::{App, DeviceFamily, SearchResult};

/// Errors from App Store endpoints.
#[derive(Debug, Error)]
pub enum AppStoreError {
    #[error("failed to get mac address: {0}")]
    MacAddress(#[source] io::Error),
    #[error("failed to send http request: {0}")]
    SendRequest(#[source] NetError),
    #[error("received unexpected status code: {0}")]
    UnexpectedStatus(u16),
    #[error("invalid country code")]
    InvalidCountryCode,
    #[error("invalid device family")]
    InvalidDeviceFamily,
    #[error("failed to create request: {0}")]
    CreateRequest(#[source] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[source] NetError),
    #[error("request failed with status {0}")]
    RequestStatus(u16),
    #[error("app not found")]
    AppNotFound,
}

/// Identity of the host machine.
pub trait Machine: Send + Sync {
    /// Primary MAC address, colon separated.
    fn mac_address(&self) -> io::Result<String>;
}

/// App Store API facade.
#[derive(Clone)]
pub struct AppStore {
    bag_client: Arc<dyn HttpClient<BagResult>>,
    search_client: Arc<dyn HttpClient<SearchResult>>,
    machine: Arc<dyn Machine>,
}

impl fmt::Debug for AppStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStore").finish_non_exhaustive()
    }
}

impl AppStore {
    pub fn new(
        bag_client: Arc<dyn HttpClient<BagResult>>,
        search_client: Arc<dyn HttpClient<SearchResult>>,
        machine: Arc<dyn Machine>,
    ) -> Self {
        Self {
            bag_client,
            search_client,
            machine,
        }
    }

    /// Network clients sharing one cookie jar.
    pub fn with_cookie_jar(cookie_jar: Arc<dyn CookieJar>, machine: Arc<dyn Machine>) -> Self {
        Self::new(
            Arc::new(Client::<BagResult>::new(cookie_jar.clone())),
            Arc::new(Client::<SearchResult>::new(cookie_jar)),
            machine,
        )
    }
}
