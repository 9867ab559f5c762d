//! Sakura Cloud DNS API boundary.
//!
//! The provider offers two operations this webhook needs: find zones by name, and replace
//! a zone's whole record set; there is no per-record mutation primitive. Both are modeled
//! by the [`DnsApi`] trait so the reconciliation logic in
//! [`solver::sacloud`][crate::solver::sacloud] can be exercised against an in-memory fake.
//! The production implementation is [`client::ApiClient`].

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod client;

pub use client::SacloudApiBuilder;

/// `DynDnsApi` is a type alias for a shareable [`DnsApi`] trait object.
pub type DynDnsApi = Arc<dyn DnsApi + Send + Sync>;

/// Per-request Sakura Cloud API credentials, resolved from issuer-referenced secrets.
///
/// `zone` is the Sakura availability zone the DNS service is managed through
/// (e.g. `is1a`), not a DNS zone name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Credentials {
    pub access_token: String,
    pub access_secret: String,
    pub zone: String,
}

/// Identifier of a provider-side DNS zone resource.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A provider-managed DNS zone: looked up by name, never created or deleted here.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub records: Vec<Record>,
}

/// One resource record of a zone's record set, with the provider's PascalCase wire names.
///
/// The record type is kept as a plain string: this solver only ever writes `TXT`, but
/// every other type present in a set must survive a replace untouched.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Type")]
    pub rtype: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RData")]
    pub rdata: String,
    #[serde(rename = "TTL")]
    pub ttl: u32,
}

impl Record {
    #[must_use]
    pub fn is_txt(&self) -> bool {
        self.rtype == "TXT"
    }
}

/// An async trait describing the two provider operations used per challenge.
#[async_trait::async_trait]
pub trait DnsApi {
    /// Search DNS zones whose name equals `name`, returning every match.
    async fn find_zones(&self, name: &str) -> Result<Vec<Zone>, Error>;

    /// Replace the named zone's entire record set with `records` in a single update.
    async fn replace_records(&self, zone: &ZoneId, records: Vec<Record>) -> Result<(), Error>;
}

/// Builds a [`DnsApi`] for one request's [`Credentials`].
///
/// Clients are constructed fresh per Present/CleanUp call so freshly rotated
/// credentials take effect immediately; nothing is cached across calls.
pub trait DnsApiBuilder: Send + Sync {
    /// Construct a client bound to `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the underlying HTTP client can't be built.
    fn for_credentials(&self, credentials: &Credentials) -> Result<DynDnsApi, Error>;
}
