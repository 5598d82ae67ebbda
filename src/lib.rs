//! # storenet
//!
//! A typed HTTP client for the App Store's private web API.
//!
//! The API answers in JSON or in XML property lists whose wrapping varies by
//! endpoint. `storenet` sends one request, follows redirects, keeps cookies
//! in a persistent jar and decodes the body into a caller-chosen type,
//! normalizing plist bodies to something the decoder accepts first.
//!
//! ## Features
//!
//! - **Typed results**: `Client<R>` decodes into any `serde` type
//! - **Plist normalization**: `<Document>` envelopes, full `<plist>`
//!   documents, bare `<dict>` elements and raw key/value fragments
//! - **Cookie Management**: RFC 6265 matching with JSON file persistence
//! - **TLS**: BoringSSL via `tokio-boring`
//! - **Redirects**: credential stripping on cross-host hops and a hand-off
//!   of the authentication redirect to the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use storenet::cookies::persistence::PersistentCookieJar;
//! use storenet::{Client, Request, ResponseFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let jar = Arc::new(PersistentCookieJar::open("cookies.json")?);
//!     let client: Client<HashMap<String, plist::Value>> = Client::new(jar);
//!     let result = client
//!         .send(Request::get(
//!             "https://init.itunes.apple.com/bag.xml?guid=001122334455",
//!             ResponseFormat::Xml,
//!         ))
//!         .await?;
//!     println!("Status: {}", result.status_code);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Cookie storage and persistence
//! - [`http`] - Request/result model, transports and body normalization
//! - [`socket`] - TCP and TLS connection setup
//! - [`urlrequest`] - Redirect-following request execution
//! - [`client`] - The typed client and its builder
//! - [`appstore`] - Bag discovery and app lookup

pub mod appstore;
pub mod base;
pub mod client;
pub mod cookies;
pub mod http;
pub mod socket;
pub mod urlrequest;

pub use crate::http::{HttpResult, Method, Request, ResponseFormat};
pub use base::neterror::NetError;
pub use client::{Client, ClientBuilder, ClientConfig, HttpClient};
pub use cookies::CookieJar;
pub use urlrequest::AUTH_URL;
