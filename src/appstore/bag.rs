//! Bag discovery: where to authenticate.

use super::constants::{PRIVATE_INIT_DOMAIN, PRIVATE_INIT_PATH};
use super::{AppStore, AppStoreError};
use crate::http::{Request, ResponseFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BagResult {
    #[serde(rename = "urlBag", default)]
    pub url_bag: UrlBag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UrlBag {
    #[serde(rename = "authenticateAccount", default)]
    pub auth_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagOutput {
    pub auth_endpoint: String,
}

impl AppStore {
    /// Fetch the URL bag for this machine.
    pub async fn bag(&self) -> Result<BagOutput, AppStoreError> {
        let mac = self
            .machine
            .mac_address()
            .map_err(AppStoreError::MacAddress)?;

        let guid = mac.to_uppercase().replace(':', "");
        let res = self
            .bag_client
            .send(bag_request(&guid))
            .await
            .map_err(AppStoreError::SendRequest)?;

        if res.status_code != 200 {
            return Err(AppStoreError::UnexpectedStatus(res.status_code));
        }

        Ok(BagOutput {
            auth_endpoint: res.data.url_bag.auth_endpoint,
        })
    }
}

fn bag_request(guid: &str) -> Request {
    Request::get(
        format!("https://{PRIVATE_INIT_DOMAIN}{PRIVATE_INIT_PATH}?guid={guid}"),
        ResponseFormat::Xml,
    )
    .header("Accept", "application/xml")
}
