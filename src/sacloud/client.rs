//! A reqwest-backed implementation of the [`DnsApi`][super::DnsApi] trait.
//!
//! Talks to the Sakura Cloud `commonserviceitem` REST endpoints with basic auth. Transport
//! failures, 429 and 5xx responses are retried a bounded number of times with exponential
//! backoff; the reconciliation logic above performs no retries of its own.

use crate::config::Config;
use crate::error::Error;
use crate::sacloud::{Credentials, DnsApi, DnsApiBuilder, DynDnsApi, Record, Zone, ZoneId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "sacloud-webhook/cert-manager";

const API_RETRY_MAX: u32 = 3;
const API_RETRY_WAIT_MIN: Duration = Duration::from_secs(1);
const API_RETRY_WAIT_MAX: Duration = Duration::from_secs(64);

/// Sakura Cloud API client bound to one request's [`Credentials`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Deserialize, Debug, Default)]
struct SearchResponse {
    #[serde(rename = "Total", default)]
    total: usize,
    #[serde(rename = "CommonServiceItems", default)]
    items: Vec<CommonServiceItem>,
}

#[derive(Deserialize, Debug)]
struct CommonServiceItem {
    #[serde(rename = "ID")]
    id: ZoneId,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Settings", default)]
    settings: DnsSettings,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct DnsSettings {
    #[serde(rename = "DNS", default)]
    dns: RecordSets,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct RecordSets {
    #[serde(rename = "ResourceRecordSets", default)]
    records: Vec<Record>,
}

impl ApiClient {
    fn endpoint(&self) -> String {
        format!(
            "{}/cloud/zone/{}/api/cloud/1.1/commonserviceitem",
            self.base_url, self.credentials.zone
        )
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .basic_auth(
                &self.credentials.access_token,
                Some(&self.credentials.access_secret),
            )
            .header(reqwest::header::USER_AGENT, USER_AGENT)
    }

    async fn send_with_retry(
        &self,
        context: &'static str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        let mut wait = API_RETRY_WAIT_MIN;
        let mut attempt = 0;
        loop {
            let result = self.authed(build()).send().await;
            let retryable = match &result {
                Ok(resp) => {
                    let status = resp.status();
                    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                }
                Err(err) => err.is_connect() || err.is_timeout(),
            };
            if !retryable || attempt >= API_RETRY_MAX {
                return match result {
                    Ok(resp) if resp.status().is_success() => Ok(resp),
                    Ok(resp) => {
                        let status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        Err(Error::ApiStatus {
                            context,
                            status,
                            body,
                        })
                    }
                    Err(source) => Err(Error::Api { context, source }),
                };
            }
            attempt += 1;
            tracing::debug!("sacloud api ({context}) attempt {attempt} failed, retrying in {wait:?}");
            tokio::time::sleep(wait).await;
            wait = (wait * 2).min(API_RETRY_WAIT_MAX);
        }
    }
}

#[async_trait::async_trait]
impl DnsApi for ApiClient {
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>, Error> {
        let filter = json!({ "Name": name, "Provider.Class": "dns" }).to_string();
        let url = self.endpoint();
        let response = self
            .send_with_retry("zone search", || {
                self.http.get(&url).query(&[("Filter", filter.as_str())])
            })
            .await?;
        let search: SearchResponse = response.json().await.map_err(|source| Error::Api {
            context: "zone search",
            source,
        })?;
        tracing::debug!(
            "zone search for \"{name}\" returned {} of {} items",
            search.items.len(),
            search.total
        );
        Ok(zones_named(search, name))
    }

    async fn replace_records(&self, zone: &ZoneId, records: Vec<Record>) -> Result<(), Error> {
        let url = format!("{}/{zone}", self.endpoint());
        let body = json!({
            "CommonServiceItem": {
                "Settings": { "DNS": { "ResourceRecordSets": records } }
            }
        });
        self.send_with_retry("record update", || self.http.put(&url).json(&body))
            .await?;
        Ok(())
    }
}

/// Narrow search results to zones whose name equals `name`. The provider's `Filter`
/// query matches names partially, so a search for `example.com` can also return
/// sibling zones like `dev-example.com`; the trait contract is equality.
fn zones_named(search: SearchResponse, name: &str) -> Vec<Zone> {
    search
        .items
        .into_iter()
        .filter(|item| item.name == name)
        .map(|item| Zone {
            id: item.id,
            name: item.name,
            records: item.settings.dns.records,
        })
        .collect()
}

/// Builds an [`ApiClient`] per call. Constructed once at startup from the webhook
/// [`Config`]; the clients it produces are discarded after each Present/CleanUp.
#[allow(clippy::module_name_repetitions)]
pub struct SacloudApiBuilder {
    base_url: String,
    timeout: Duration,
}

impl SacloudApiBuilder {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.sacloud_api_url, config.sacloud_timeout)
    }

    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

impl DnsApiBuilder for SacloudApiBuilder {
    fn for_credentials(&self, credentials: &Credentials) -> Result<DynDnsApi, Error> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|source| Error::Api {
                context: "client construction",
                source,
            })?;
        Ok(Arc::new(ApiClient {
            http,
            base_url: self.base_url.clone(),
            credentials: credentials.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: "https://secure.sakura.ad.jp".to_string(),
            credentials: Credentials {
                access_token: "token".to_string(),
                access_secret: "secret".to_string(),
                zone: "is1a".to_string(),
            },
        }
    }

    #[test]
    fn endpoint_includes_api_zone() {
        assert_eq!(
            client().endpoint(),
            "https://secure.sakura.ad.jp/cloud/zone/is1a/api/cloud/1.1/commonserviceitem"
        );
    }

    #[test]
    fn search_response_decodes_record_sets() {
        let raw = r#"{
            "Total": 1,
            "CommonServiceItems": [{
                "ID": "112900000001",
                "Name": "example.com",
                "Settings": {
                    "DNS": {
                        "ResourceRecordSets": [
                            {"Type": "TXT", "Name": "_acme-challenge", "RData": "k1", "TTL": 60},
                            {"Type": "A", "Name": "www", "RData": "1.2.3.4", "TTL": 300}
                        ]
                    }
                }
            }]
        }"#;
        let search: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(search.total, 1);
        assert_eq!(search.items.len(), 1);
        let item = &search.items[0];
        assert_eq!(item.id, ZoneId("112900000001".to_string()));
        assert_eq!(item.settings.dns.records.len(), 2);
        assert!(item.settings.dns.records[0].is_txt());
    }

    #[test]
    fn zones_named_drops_partial_name_matches() {
        let raw = r#"{
            "Total": 2,
            "CommonServiceItems": [
                {"ID": "1", "Name": "dev-example.com", "Settings": {"DNS": {"ResourceRecordSets": []}}},
                {"ID": "2", "Name": "example.com", "Settings": {"DNS": {"ResourceRecordSets": []}}}
            ]
        }"#;
        let search: SearchResponse = serde_json::from_str(raw).unwrap();
        let zones = zones_named(search, "example.com");
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].name, "example.com");
        assert_eq!(zones[0].id, ZoneId("2".to_string()));
    }

    #[test]
    fn search_response_tolerates_missing_settings() {
        let raw = r#"{"Total": 0}"#;
        let search: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(search.total, 0);
        assert!(search.items.is_empty());
    }
}
