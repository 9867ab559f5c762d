use crate::error::Error;
use crate::secrets::{SecretKeySelector, SecretStore};
use std::collections::HashMap;

/// A map-backed implementation of [`SecretStore`], keyed by `(namespace, secret name)`.
#[derive(Default, Debug, Clone)]
pub struct InMemorySecretStore {
    secrets: HashMap<(String, String), HashMap<String, String>>,
}

impl InMemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a secret key/value under a namespaced secret name, replacing any
    /// previous value for that key.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.secrets
            .entry((namespace.into(), name.into()))
            .or_default()
            .insert(key.into(), value.into());
    }
}

#[async_trait::async_trait]
impl SecretStore for InMemorySecretStore {
    async fn secret_value(
        &self,
        namespace: &str,
        selector: &SecretKeySelector,
    ) -> Result<String, Error> {
        let data = self
            .secrets
            .get(&(namespace.to_string(), selector.name.clone()))
            .ok_or_else(|| Error::SecretNotFound {
                namespace: namespace.to_string(),
                name: selector.name.clone(),
                reason: "not found".to_string(),
            })?;
        data.get(&selector.key)
            .cloned()
            .ok_or_else(|| Error::SecretKeyMissing {
                namespace: namespace.to_string(),
                name: selector.name.clone(),
                key: selector.key.clone(),
            })
    }
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

    #[tokio::test]
    async fn lookup_hit() {
        let mut store = InMemorySecretStore::new();
        store.insert("default", "sacloud-api", "token", "tok-123");
        let value = store
            .secret_value("default", &selector("sacloud-api", "token"))
            .await
            .expect("value should resolve");
        assert_eq!(value, "tok-123");
    }

    #[tokio::test]
    async fn missing_secret() {
        let store = InMemorySecretStore::new();
        let err = store
            .secret_value("default", &selector("sacloud-api", "token"))
            .await
            .expect_err("lookup should fail");
        assert!(matches!(err, Error::SecretNotFound { name, .. } if name == "sacloud-api"));
    }

    #[tokio::test]
    async fn missing_key() {
        let mut store = InMemorySecretStore::new();
        store.insert("default", "sacloud-api", "token", "tok-123");
        let err = store
            .secret_value("default", &selector("sacloud-api", "zone"))
            .await
            .expect_err("lookup should fail");
        assert!(matches!(err, Error::SecretKeyMissing { key, .. } if key == "zone"));
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let mut store = InMemorySecretStore::new();
        store.insert("team-a", "sacloud-api", "token", "tok-a");
        let err = store
            .secret_value("team-b", &selector("sacloud-api", "token"))
            .await
            .expect_err("other namespace should miss");
        assert!(matches!(err, Error::SecretNotFound { .. }));
    }
}
