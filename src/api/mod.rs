//! Webhook HTTP API dispatching ACME DNS-01 challenges to registered solvers.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is
//!   operational.
//!
//! ## `/apis/{group_name}/v1alpha1/{solver}/present` (POST)
//!
//!   Expects a cert-manager `ChallengeRequest` JSON body of the form:
//!
//!   ```json
//!   {
//!     "uid": "b9ce8d5a",
//!     "resolvedFQDN": "_acme-challenge.example.com.",
//!     "resolvedZone": "example.com.",
//!     "key": "LPsIwTo7o8BoG0-vjCyGQGBWSVIPxI-i_X336eUOQZo",
//!     "resourceNamespace": "cert-manager",
//!     "config": {
//!       "apiAccessTokenRef": {"name": "sacloud-api", "key": "token"},
//!       "apiAccessSecretRef": {"name": "sacloud-api", "key": "secret"},
//!       "apiZoneRef": {"name": "sacloud-api", "key": "zone"}
//!     }
//!   }
//!   ```
//!
//!   Dispatches to the solver registered under `{solver}` (e.g. `sacloud`), which
//!   publishes the challenge TXT record with its provider. For successful calls,
//!   returns HTTP 200 (OK) and a JSON body echoing the request `uid`:
//!
//!   ```json
//!   { "uid": "b9ce8d5a", "success": true }
//!   ```
//!
//! ## `/apis/{group_name}/v1alpha1/{solver}/cleanup` (POST)
//!
//!   Same request and response shapes as `present`. Removes the TXT records carrying
//!   the challenge's proof value once the challenge has been resolved.
//!
//! The `{group_name}` route segment is the API resource group configured at startup
//! ([`Config::group_name`][`crate::config::Config::group_name`]); requests for solver
//! names never [registered][`crate::solver::Registry::register`] are answered with
//! HTTP 404 (Not Found).

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
