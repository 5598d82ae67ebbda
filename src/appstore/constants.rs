//! Store endpoints.

pub const ITUNES_API_DOMAIN: &str = "itunes.apple.com";
pub const ITUNES_API_PATH_LOOKUP: &str = "/lookup";

pub const PRIVATE_INIT_DOMAIN: &str = "init.itunes.apple.com";
pub const PRIVATE_INIT_PATH: &str = "/bag.xml";

pub use crate::urlrequest::job::AUTH_URL;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_share_the_store_domain() {
        assert!(PRIVATE_INIT_DOMAIN.ends_with(ITUNES_API_DOMAIN));
        assert!(AUTH_URL.starts_with("https://buy.itunes.apple.com/"));
        assert!(ITUNES_API_PATH_LOOKUP.starts_with('/'));
        assert!(PRIVATE_INIT_PATH.starts_with('/'));
    }
}
