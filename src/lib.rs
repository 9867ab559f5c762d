//! Sacloud Webhook
//!
//! A [cert-manager] ACME [DNS-01] webhook solver for the [Sakura Cloud DNS] service.
//!
//! Presents [RFC-8555][RFC-8555] [DNS-01] challenge TXT records through the Sakura Cloud
//! API to prove domain control during X509 certificate issuance, and cleans them up once
//! the challenge has been resolved. API credentials are referenced per-issuer through
//! Kubernetes `Secret` resources, supporting multi-tenant deployments.
//!
//! [cert-manager]: https://cert-manager.io
//! [Sakura Cloud DNS]: https://manual.sakura.ad.jp/cloud/appliance/dns/
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod sacloud;
pub mod secrets;
pub mod solver;

pub use api::new as new_api;
pub use config::{Config, SharedConfig};
pub use sacloud::client::SacloudApiBuilder;
pub use secrets::kube::KubeSecretStore;
pub use secrets::memory::InMemorySecretStore;
pub use solver::sacloud::SacloudSolver;
pub use solver::{ChallengeRequest, Registry, Solver};
