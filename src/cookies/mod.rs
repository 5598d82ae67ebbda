//! Cookie management.
//!
//! - **Storage**: In-memory cookie jar ([`CookieMonster`](monster::CookieMonster))
//! - **Persistence**: JSON file-backed jar ([`PersistentCookieJar`](persistence::PersistentCookieJar))
//!
//! # Architecture
//!
//! This implementation mirrors Chromium's cookie storage architecture:
//!
//! | Chromium (C++) | storenet (Rust) | Responsibility |
//! |----------------|-----------------|----------------|
//! | `net::CookieMonster` | [`CookieMonster`](monster::CookieMonster) | Cookie jar with oldest-first eviction |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonicalcookie::CanonicalCookie) | Single cookie representation |
//! | `SqlitePersistentCookieStore` | [`persistence`] | Disk persistence |
//!
//! # Example
//!
//! ```rust,no_run
//! use storenet::cookies::persistence::PersistentCookieJar;
//! use storenet::cookies::CookieJar;
//!
//! let jar = PersistentCookieJar::open("cookies.json")?;
//! // ... send requests ...
//! jar.save()?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod canonicalcookie;
pub mod monster;
pub mod persistence;

use http::HeaderMap;
use std::io;
use url::Url;

/// Cookie storage consulted on every request and response hop.
pub trait CookieJar: Send + Sync {
    /// Store the `Set-Cookie` headers of a response received from `url`.
    fn set_cookies(&self, url: &Url, headers: &HeaderMap);

    /// The `Cookie` header value for a request to `url`, if any cookie applies.
    fn cookie_header(&self, url: &Url) -> Option<String>;

    /// Flush the jar to durable storage.
    fn save(&self) -> io::Result<()>;
}
