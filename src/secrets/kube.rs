//! A Kubernetes API-backed implementation of the [`SecretStore`][super::SecretStore] trait.
//!
//! Reads `Secret` resources with the webhook's service account bearer token. Secret `data`
//! values arrive base64-encoded from the API and are decoded before use.

use crate::config::Config;
use crate::error::Error;
use crate::secrets::{SecretKeySelector, SecretStore};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct KubeSecretStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize, Debug, Default)]
struct SecretObject {
    #[serde(default)]
    data: HashMap<String, String>,
}

impl KubeSecretStore {
    /// Build a store from in-cluster service account material: the bearer token at
    /// [`Config::kube_token_path`] and, when present, the cluster CA certificate
    /// alongside it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the token file can't be read, or [`Error::Api`] if the
    /// HTTP client can't be constructed.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let token = std::fs::read_to_string(&config.kube_token_path)?
            .trim()
            .to_string();

        let mut builder = reqwest::Client::builder();
        let ca_path = Path::new(&config.kube_token_path).with_file_name("ca.crt");
        if let Ok(pem) = std::fs::read(&ca_path) {
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|source| Error::Api {
                context: "kube client ca",
                source,
            })?;
            builder = builder.add_root_certificate(cert);
        }
        let http = builder.build().map_err(|source| Error::Api {
            context: "kube client",
            source,
        })?;

        Ok(Self::new(http, &config.kube_api_url, token))
    }

    pub(crate) fn new(http: reqwest::Client, base_url: &str, token: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn secret_url(&self, namespace: &str, name: &str) -> String {
        format!("{}/api/v1/namespaces/{namespace}/secrets/{name}", self.base_url)
    }
}

#[async_trait::async_trait]
impl SecretStore for KubeSecretStore {
    async fn secret_value(
        &self,
        namespace: &str,
        selector: &SecretKeySelector,
    ) -> Result<String, Error> {
        tracing::debug!(
            "try to load secret `{}` with key `{}`",
            selector.name,
            selector.key
        );

        let not_found = |reason: String| Error::SecretNotFound {
            namespace: namespace.to_string(),
            name: selector.name.clone(),
            reason,
        };

        let response = self
            .http
            .get(self.secret_url(namespace, &selector.name))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| not_found(err.to_string()))?;
        if !response.status().is_success() {
            return Err(not_found(format!("status {}", response.status())));
        }
        let secret: SecretObject = response
            .json()
            .await
            .map_err(|err| not_found(err.to_string()))?;

        extract_value(&secret, namespace, selector)
    }
}

fn extract_value(
    secret: &SecretObject,
    namespace: &str,
    selector: &SecretKeySelector,
) -> Result<String, Error> {
    let encoded = secret
        .data
        .get(&selector.key)
        .ok_or_else(|| Error::SecretKeyMissing {
            namespace: namespace.to_string(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        })?;

    let decode_err = |reason: String| Error::SecretDecode {
        namespace: namespace.to_string(),
        name: selector.name.clone(),
        key: selector.key.clone(),
        reason,
    };
    let raw = BASE64_STANDARD
        .decode(encoded)
        .map_err(|err| decode_err(err.to_string()))?;
    String::from_utf8(raw).map_err(|err| decode_err(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(name: &str, key: &str) -> SecretKeySelector {
        SecretKeySelector {
            name: name.to_string(),
            key: key.to_string(),
        }
    }

    #[test]
    fn extract_decodes_base64_data() {
        let secret: SecretObject =
            serde_json::from_str(r#"{"data":{"token":"dG9rLTEyMw=="}}"#).unwrap();
        let value = extract_value(&secret, "default", &selector("sacloud-api", "token"))
            .expect("value should decode");
        assert_eq!(value, "tok-123");
    }

    #[test]
    fn extract_missing_key() {
        let secret = SecretObject::default();
        let err = extract_value(&secret, "default", &selector("sacloud-api", "token"))
            .expect_err("extract should fail");
        assert!(matches!(err, Error::SecretKeyMissing { key, .. } if key == "token"));
    }

    #[test]
    fn extract_invalid_base64() {
        let secret: SecretObject =
            serde_json::from_str(r#"{"data":{"token":"not base64!"}}"#).unwrap();
        let err = extract_value(&secret, "default", &selector("sacloud-api", "token"))
            .expect_err("extract should fail");
        assert!(matches!(err, Error::SecretDecode { .. }));
    }

    #[test]
    fn secret_url_shape() {
        let store = KubeSecretStore::new(
            reqwest::Client::new(),
            "https://kubernetes.default.svc/",
            "tok".to_string(),
        );
        assert_eq!(
            store.secret_url("cert-manager", "sacloud-api"),
            "https://kubernetes.default.svc/api/v1/namespaces/cert-manager/secrets/sacloud-api"
        );
    }
}
