//! Cookie persistence - save and load cookies to/from disk.
//!
//! Provides JSON-based persistence for CookieMonster and the
//! file-backed [`PersistentCookieJar`].

use crate::cookies::canonicalcookie::{CanonicalCookie, SameSite};
use crate::cookies::monster::CookieMonster;
use crate::cookies::CookieJar;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;
use url::Url;

/// Serializable representation of a cookie for persistence.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct PersistentCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    secure: bool,
    http_only: bool,
    host_only: bool,
    expires_unix_secs: Option<i64>,
}

/// Save the unexpired cookies of a CookieMonster to a file.
pub fn save_cookies(monster: &CookieMonster, path: &Path) -> io::Result<()> {
    let now = OffsetDateTime::now_utc();

    let all_cookies: Vec<PersistentCookie> = monster
        .iter_all_cookies()
        .filter(|cookie| !cookie.is_expired(now))
        .map(|cookie| PersistentCookie {
            expires_unix_secs: cookie.expiration_time.map(|t| t.unix_timestamp()),
            name: cookie.name,
            value: cookie.value,
            domain: cookie.domain,
            path: cookie.path,
            secure: cookie.secure,
            http_only: cookie.http_only,
            host_only: cookie.host_only,
        })
        .collect();

    let json = serde_json::to_string_pretty(&all_cookies)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)
}

/// Load cookies from a file into a new CookieMonster, skipping expired ones.
pub fn load_cookies(path: &Path) -> io::Result<CookieMonster> {
    let json = fs::read_to_string(path)?;
    let persistent_cookies: Vec<PersistentCookie> =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let monster = CookieMonster::new();
    let now = OffsetDateTime::now_utc();

    for pc in persistent_cookies {
        let expiration_time = match pc.expires_unix_secs {
            Some(secs) => match OffsetDateTime::from_unix_timestamp(secs) {
                Ok(t) if t <= now => continue,
                Ok(t) => Some(t),
                Err(_) => continue,
            },
            None => None,
        };

        monster.set_canonical_cookie(CanonicalCookie {
            name: pc.name,
            value: pc.value,
            domain: pc.domain,
            path: pc.path,
            creation_time: now,
            expiration_time,
            last_access_time: now,
            secure: pc.secure,
            http_only: pc.http_only,
            host_only: pc.host_only,
            same_site: SameSite::Lax,
        });
    }

    Ok(monster)
}

/// Cookie jar backed by a JSON file.
///
/// Cookies live in memory and are written out on every [`CookieJar::save`];
/// concurrent saves are serialized.
#[derive(Debug)]
pub struct PersistentCookieJar {
    monster: CookieMonster,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PersistentCookieJar {
    /// Open a jar at `path`, loading existing cookies. A missing file
    /// yields an empty jar.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let monster = match load_cookies(&path) {
            Ok(monster) => monster,
            Err(e) if e.kind() == io::ErrorKind::NotFound => CookieMonster::new(),
            Err(e) => return Err(e),
        };

        tracing::debug!(path = %path.display(), cookies = monster.total_cookie_count(), "opened cookie jar");

        Ok(Self {
            monster,
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn monster(&self) -> &CookieMonster {
        &self.monster
    }
}

impl CookieJar for PersistentCookieJar {
    fn set_cookies(&self, url: &Url, headers: &HeaderMap) {
        self.monster.set_cookies(url, headers);
    }

    fn cookie_header(&self, url: &Url) -> Option<String> {
        self.monster.cookie_header(url)
    }

    fn save(&self) -> io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "cookie jar lock poisoned"))?;
        save_cookies(&self.monster, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session_cookie(now: OffsetDateTime) -> CanonicalCookie {
        CanonicalCookie {
            name: "session".to_string(),
            value: "abc123".to_string(),
            domain: "apple.com".to_string(),
            path: "/".to_string(),
            creation_time: now,
            expiration_time: None,
            last_access_time: now,
            secure: true,
            http_only: true,
            host_only: false,
            same_site: SameSite::Lax,
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let monster = CookieMonster::new();
        monster.set_canonical_cookie(session_cookie(OffsetDateTime::now_utc()));

        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        save_cookies(&monster, &path).unwrap();

        let loaded = load_cookies(&path).unwrap();
        assert_eq!(loaded.total_cookie_count(), 1);

        let url = Url::parse("https://buy.itunes.apple.com/").unwrap();
        let cookies = loaded.get_cookies_for_url(&url);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "session");
        assert_eq!(cookies[0].value, "abc123");
    }

    #[test]
    fn test_expired_cookies_are_not_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let past = OffsetDateTime::now_utc().unix_timestamp() - 60;
        fs::write(
            &path,
            format!(
                r#"[{{"name":"old","value":"v","domain":"apple.com","path":"/","secure":false,"http_only":false,"host_only":true,"expires_unix_secs":{past}}}]"#
            ),
        )
        .unwrap();

        assert_eq!(load_cookies(&path).unwrap().total_cookie_count(), 0);
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(jar.monster().total_cookie_count(), 0);
    }

    #[test]
    fn test_open_corrupt_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "not json").unwrap();

        let err = PersistentCookieJar::open(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_jar_save_then_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let url = Url::parse("https://buy.itunes.apple.com/").unwrap();

        let jar = PersistentCookieJar::open(&path).unwrap();
        jar.monster().parse_and_save_cookie(&url, "itspod=25; Path=/; Max-Age=3600");
        jar.save().unwrap();

        let reopened = PersistentCookieJar::open(&path).unwrap();
        assert_eq!(reopened.cookie_header(&url).as_deref(), Some("itspod=25"));
    }

    #[test]
    fn test_save_to_unwritable_path_fails() {
        let dir = tempdir().unwrap();
        let jar = PersistentCookieJar::open(dir.path().join("missing-dir").join("c.json")).unwrap();
        assert!(jar.save().is_err());
    }
}
