//! App lookup by bundle id.

use super::constants::{ITUNES_API_DOMAIN, ITUNES_API_PATH_LOOKUP};
use super::storefront::store_front;
use super::{AppStore, AppStoreError};
use crate::http::{Request, ResponseFormat};
use serde::Deserialize;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    Phone,
    Pad,
}

impl DeviceFamily {
    fn entity(self) -> &'static str {
        match self {
            DeviceFamily::Phone => "software",
            DeviceFamily::Pad => "iPadSoftware",
        }
    }
}

impl FromStr for DeviceFamily {
    type Err = AppStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iPhone" => Ok(DeviceFamily::Phone),
            "iPad" => Ok(DeviceFamily::Pad),
            _ => Err(AppStoreError::InvalidDeviceFamily),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "resultCount", default)]
    pub count: u32,
    #[serde(default)]
    pub results: Vec<App>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct App {
    #[serde(rename = "trackId", default)]
    pub id: i64,
    #[serde(rename = "bundleId", default)]
    pub bundle_id: String,
    #[serde(rename = "trackName", default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub price: f64,
}

impl AppStore {
    /// Look up the app published under `bundle_id` in a country's store.
    pub async fn lookup(
        &self,
        bundle_id: &str,
        country_code: &str,
        device_family: &str,
    ) -> Result<App, AppStoreError> {
        if store_front(country_code).is_none() {
            return Err(AppStoreError::InvalidCountryCode);
        }

        let request = lookup_request(bundle_id, country_code, device_family.parse()?)?;
        let res = self
            .search_client
            .send(request)
            .await
            .map_err(AppStoreError::Request)?;

        if res.status_code != 200 {
            tracing::debug!(status = res.status_code, data = ?res.data, "lookup failed");
            return Err(AppStoreError::RequestStatus(res.status_code));
        }

        res.data
            .results
            .into_iter()
            .next()
            .ok_or(AppStoreError::AppNotFound)
    }
}

fn lookup_request(
    bundle_id: &str,
    country_code: &str,
    device_family: DeviceFamily,
) -> Result<Request, AppStoreError> {
    // Sorted by key.
    let url = Url::parse_with_params(
        &format!("https://{ITUNES_API_DOMAIN}{ITUNES_API_PATH_LOOKUP}"),
        &[
            ("bundleId", bundle_id),
            ("country", country_code),
            ("entity", device_family.entity()),
            ("limit", "1"),
            ("media", "software"),
        ],
    )
    .map_err(AppStoreError::CreateRequest)?;

    Ok(Request::get(url.as_str(), ResponseFormat::Json))
}
