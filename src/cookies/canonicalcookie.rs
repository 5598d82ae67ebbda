use time::OffsetDateTime;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub last_access_time: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
    pub same_site: SameSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

impl CanonicalCookie {
    /// A host-only session cookie.
    pub fn new(
        name: String,
        value: String,
        domain: String,
        path: String,
        creation_time: OffsetDateTime,
        expiration_time: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            name,
            value,
            domain,
            path,
            creation_time,
            expiration_time,
            last_access_time: creation_time,
            secure: false,
            http_only: false,
            host_only: true,
            same_site: SameSite::Unspecified,
        }
    }

    /// Session cookies (no expiration) never expire while the jar lives.
    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        self.expiration_time
            .is_some_and(|expiry| expiry <= current_time)
    }

    pub fn is_persistent(&self) -> bool {
        self.expiration_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_never_expires() {
        let now = OffsetDateTime::now_utc();
        let cookie = CanonicalCookie::new(
            "mz_at0".to_string(),
            "token".to_string(),
            "apple.com".to_string(),
            "/".to_string(),
            now,
            None,
        );
        assert!(!cookie.is_expired(now + time::Duration::days(365)));
        assert!(!cookie.is_persistent());
        assert!(cookie.host_only);
    }

    #[test]
    fn test_expiry() {
        let now = OffsetDateTime::now_utc();
        let cookie = CanonicalCookie::new(
            "a".to_string(),
            "b".to_string(),
            "apple.com".to_string(),
            "/".to_string(),
            now,
            Some(now + time::Duration::hours(1)),
        );
        assert!(!cookie.is_expired(now));
        assert!(cookie.is_expired(now + time::Duration::hours(2)));
    }
}
