//! ACME DNS-01 challenge solvers.
//!
//! A [`Solver`] receives [`ChallengeRequest`]s from the [webhook API][crate::api] and is
//! responsible for presenting the challenge TXT record with its DNS provider, then
//! cleaning it up once the challenge has been resolved. Solvers are kept in a
//! [`Registry`] keyed by [`Solver::name`], which disambiguates between implementations
//! sharing one webhook deployment.
//!
//! One implementation is provided, [`sacloud::SacloudSolver`].

use crate::error::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod sacloud;

#[allow(clippy::module_name_repetitions)]
pub use sacloud::SacloudSolver;

/// `DynSolver` is a type alias for a shareable [`Solver`] trait object.
pub type DynSolver = Arc<dyn Solver + Send + Sync>;

/// One unit of challenge work, supplied by cert-manager per Present/CleanUp call.
///
/// `resolved_fqdn` and `resolved_zone` both arrive dot-terminated. `key` is the opaque
/// proof value to publish as TXT content. The `config` blob is the issuer's
/// provider-specific configuration, decoded by the solver that receives it.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    pub resolved_zone: String,
    pub key: String,
    pub resource_namespace: String,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// An async trait describing the two lifecycle operations of a DNS-01 challenge solver.
///
/// Both operations must tolerate being called multiple times with the same values:
/// cert-manager re-invokes them until its self-check observes the expected record.
#[async_trait::async_trait]
pub trait Solver {
    /// Fixed identifier for this solver, unique within the webhook's API group.
    fn name(&self) -> &'static str;

    /// Create the challenge TXT record with the DNS provider.
    async fn present(&self, ch: &ChallengeRequest) -> Result<(), Error>;

    /// Remove the challenge TXT record once the challenge has been resolved.
    async fn cleanup(&self, ch: &ChallengeRequest) -> Result<(), Error>;
}

/// Named set of registered solvers, dispatched to by the [webhook API][crate::api].
#[derive(Default, Clone)]
pub struct Registry {
    solvers: HashMap<&'static str, DynSolver>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, solver: DynSolver) {
        self.solvers.insert(solver.name(), solver);
    }

    /// Look up a solver by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSolver`] for names never registered.
    pub fn get(&self, name: &str) -> Result<DynSolver, Error> {
        self.solvers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSolver(name.to_string()))
    }
}

/// Per-zone serialization points for the provider's read-modify-replace sequence.
///
/// The provider's record-set replace is its only mutation primitive, so two concurrent
/// calls for the same zone that both read before either writes would lose one write.
/// Holding the zone's lock across the window closes that race within this process.
#[derive(Default)]
pub(crate) struct ZoneLocks {
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ZoneLocks {
    pub(crate) fn for_zone(&self, zone: &str) -> Arc<Mutex<()>> {
        // NB: expect is safe: the critical section below cannot panic.
        let mut locks = self.locks.lock().expect("zone lock registry poisoned");
        locks.entry(zone.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_request_wire_format() {
        let ch: ChallengeRequest = serde_json::from_str(
            r#"{
                "uid": "b9ce8d5a",
                "resolvedFQDN": "_acme-challenge.example.com.",
                "resolvedZone": "example.com.",
                "key": "LPsIwTo7o8BoG0-vjCyGQGBWSVIPxI-i_X336eUOQZo",
                "resourceNamespace": "cert-manager",
                "config": {"apiZoneRef": {"name": "sacloud-api", "key": "zone"}}
            }"#,
        )
        .expect("request should deserialize");
        assert_eq!(ch.uid, "b9ce8d5a");
        assert_eq!(ch.resolved_fqdn, "_acme-challenge.example.com.");
        assert_eq!(ch.resolved_zone, "example.com.");
        assert_eq!(ch.resource_namespace, "cert-manager");
        assert!(ch.config.is_some());
    }

    #[test]
    fn challenge_request_config_optional() {
        let ch: ChallengeRequest = serde_json::from_str(
            r#"{
                "resolvedFQDN": "_acme-challenge.example.com.",
                "resolvedZone": "example.com.",
                "key": "k1",
                "resourceNamespace": "default"
            }"#,
        )
        .expect("request should deserialize");
        assert!(ch.config.is_none());
        assert!(ch.uid.is_empty());
    }

    #[test]
    fn registry_rejects_unknown_names() {
        let registry = Registry::new();
        let err = registry.get("route53").err().expect("lookup should fail");
        assert!(matches!(err, Error::UnknownSolver(name) if name == "route53"));
    }
}
