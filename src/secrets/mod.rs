//! Credential secret lookup.
//!
//! Sakura Cloud API credentials are never carried in solver configuration directly;
//! issuers reference them through [`SecretKeySelector`]s pointing at Kubernetes `Secret`
//! resources in the challenge's namespace. The [`SecretStore`] trait is the seam between
//! the reconciliation logic and wherever those secrets actually live.
//!
//! Two implementations are provided, [`kube::KubeSecretStore`] and
//! [`memory::InMemorySecretStore`]. The former reads from the Kubernetes API with the
//! webhook's service account. The latter is backed by a map and suits tests and local
//! development.

use crate::error::Error;
use serde::Deserialize;
use std::sync::Arc;

pub mod kube;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use kube::KubeSecretStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemorySecretStore;

/// `DynSecretStore` is a type alias for a shareable [`SecretStore`] trait object.
#[allow(clippy::module_name_repetitions)]
pub type DynSecretStore = Arc<dyn SecretStore + Send + Sync>;

/// A reference to one key of one named `Secret`, scoped to a namespace at lookup time.
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct SecretKeySelector {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
}

/// An async trait describing lookup of a single credential value by namespace and
/// [`SecretKeySelector`]. Values are resolved fresh per call; no implementation caches.
#[async_trait::async_trait]
pub trait SecretStore {
    /// Fetch the selected key's value from the named secret in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SecretNotFound`] if the secret can't be fetched, and
    /// [`Error::SecretKeyMissing`] if it exists without the selected key.
    async fn secret_value(
        &self,
        namespace: &str,
        selector: &SecretKeySelector,
    ) -> Result<String, Error>;
}
