//! The Sakura Cloud DNS-01 challenge solver.
//!
//! Maps a challenge onto a provider zone and its TXT record set. Per call the solver:
//! decomposes the challenge FQDN into a relative entry and owning domain, resolves API
//! credentials from issuer-referenced secrets, locates the unique zone named after the
//! domain, computes the new record set (append, update-in-place, filter or no-op), and
//! submits it as one replace-all-records update, the only mutation the provider offers.

use crate::error::Error;
use crate::sacloud::{Credentials, DnsApiBuilder, Record, Zone};
use crate::secrets::{DynSecretStore, SecretKeySelector};
use crate::solver::{ChallengeRequest, Solver, ZoneLocks};
use serde::Deserialize;

/// TTL for challenge TXT records. Short-lived by design: challenge records exist only
/// for the validation window.
const CHALLENGE_TTL: u32 = 60;

const SOLVER_NAME: &str = "sacloud";

/// Per-issuer solver configuration, decoded fresh from each challenge's `config` blob.
///
/// All three references are required for credential resolution to succeed, but each
/// defaults to an empty selector so an absent blob decodes cleanly and fails later with
/// a descriptive secret-lookup error.
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct SolverConfig {
    #[serde(default, rename = "apiAccessTokenRef")]
    pub api_access_token_ref: SecretKeySelector,
    #[serde(default, rename = "apiAccessSecretRef")]
    pub api_access_secret_ref: SecretKeySelector,
    #[serde(default, rename = "apiZoneRef")]
    pub api_zone_ref: SecretKeySelector,
}

impl SolverConfig {
    fn from_challenge(config: Option<&serde_json::Value>) -> Result<Self, Error> {
        match config {
            None => Ok(Self::default()),
            Some(raw) => serde_json::from_value(raw.clone()).map_err(Error::InvalidSolverConfig),
        }
    }
}

#[allow(clippy::module_name_repetitions)]
pub struct SacloudSolver {
    secrets: DynSecretStore,
    dns: Box<dyn DnsApiBuilder>,
    locks: ZoneLocks,
}

impl SacloudSolver {
    #[must_use]
    pub fn new(secrets: DynSecretStore, dns: Box<dyn DnsApiBuilder>) -> Self {
        Self {
            secrets,
            dns,
            locks: ZoneLocks::default(),
        }
    }

    async fn credentials(&self, ch: &ChallengeRequest) -> Result<Credentials, Error> {
        let cfg = SolverConfig::from_challenge(ch.config.as_ref())?;
        tracing::trace!("decoded solver configuration {cfg:?}");
        let ns = &ch.resource_namespace;
        Ok(Credentials {
            access_token: self.secrets.secret_value(ns, &cfg.api_access_token_ref).await?,
            access_secret: self
                .secrets
                .secret_value(ns, &cfg.api_access_secret_ref)
                .await?,
            zone: self.secrets.secret_value(ns, &cfg.api_zone_ref).await?,
        })
    }
}

#[async_trait::async_trait]
impl Solver for SacloudSolver {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    async fn present(&self, ch: &ChallengeRequest) -> Result<(), Error> {
        tracing::debug!(
            "present: namespace={}, zone={}, fqdn={}",
            ch.resource_namespace,
            ch.resolved_zone,
            ch.resolved_fqdn
        );
        let (entry, domain) = decompose(&ch.resolved_fqdn, &ch.resolved_zone)?;
        tracing::debug!("present for entry={entry}, domain={domain}");

        let credentials = self.credentials(ch).await?;
        let api = self.dns.for_credentials(&credentials)?;

        let zone_lock = self.locks.for_zone(&domain);
        let _guard = zone_lock.lock().await;

        let zone = single_zone(api.find_zones(&domain).await?, &domain)?;
        match presented_records(&zone.records, &entry, &ch.key) {
            // The same key is already published for this entry, nothing to do.
            None => Ok(()),
            Some(records) => api.replace_records(&zone.id, records).await,
        }
    }

    async fn cleanup(&self, ch: &ChallengeRequest) -> Result<(), Error> {
        tracing::debug!(
            "cleanup: namespace={}, zone={}, fqdn={}",
            ch.resource_namespace,
            ch.resolved_zone,
            ch.resolved_fqdn
        );
        let (entry, domain) = decompose(&ch.resolved_fqdn, &ch.resolved_zone)?;
        tracing::debug!("cleanup for entry={entry}, domain={domain}");

        let credentials = self.credentials(ch).await?;
        let api = self.dns.for_credentials(&credentials)?;

        let zone_lock = self.locks.for_zone(&domain);
        let _guard = zone_lock.lock().await;

        let zone = single_zone(api.find_zones(&domain).await?, &domain)?;
        let records = cleaned_records(&zone.records, &ch.key);
        api.replace_records(&zone.id, records).await
    }
}

/// Split a challenge FQDN into its entry relative to the zone, and the plain domain
/// name of the zone. Both inputs are dot-terminated; an empty entry denotes the apex.
///
/// Fails fast when `fqdn` does not end with `zone` rather than producing a garbage
/// entry from mismatched input.
fn decompose(fqdn: &str, zone: &str) -> Result<(String, String), Error> {
    let entry = fqdn
        .strip_suffix(zone)
        .ok_or_else(|| Error::FqdnZoneMismatch {
            fqdn: fqdn.to_string(),
            zone: zone.to_string(),
        })?;
    let entry = entry.strip_suffix('.').unwrap_or(entry);
    let domain = zone.strip_suffix('.').unwrap_or(zone);
    Ok((entry.to_string(), domain.to_string()))
}

/// Require exactly one zone match. The solver will not guess among several same-named
/// zones nor auto-provision a missing one.
fn single_zone(mut zones: Vec<Zone>, domain: &str) -> Result<Zone, Error> {
    if zones.len() == 1 {
        Ok(zones.swap_remove(0))
    } else {
        Err(Error::UninitializedZone {
            domain: domain.to_string(),
            matches: zones.len(),
        })
    }
}

/// Compute the record set that presents `key` for `entry`, or `None` when the set
/// already contains it and no update is needed.
///
/// An existing TXT record for the entry is updated in place rather than appended to,
/// keeping at most one challenge TXT record per entry across repeated validation
/// attempts. TXT records for the entry carrying other keys are scanned past, so a
/// later record with the matching key still short-circuits to a no-op.
fn presented_records(existing: &[Record], entry: &str, key: &str) -> Option<Vec<Record>> {
    let mut records = existing.to_vec();

    let mut target = None;
    for (i, record) in records.iter().enumerate() {
        if record.is_txt() && record.name == entry {
            if record.rdata == key {
                return None;
            }
            target = Some(i);
        }
    }

    match target {
        Some(i) => records[i].rdata = key.to_string(),
        None => records.push(Record {
            rtype: "TXT".to_string(),
            name: entry.to_string(),
            rdata: key.to_string(),
            ttl: CHALLENGE_TTL,
        }),
    }
    Some(records)
}

/// Compute the record set with every TXT record carrying exactly `key` removed.
///
/// The filter deliberately ignores record names: removal is scoped to the exact proof
/// value, so concurrent challenges sharing an entry name but holding different keys
/// are unaffected. A key that was never written filters out nothing.
fn cleaned_records(existing: &[Record], key: &str) -> Vec<Record> {
    existing
        .iter()
        .filter(|record| !(record.is_txt() && record.rdata == key))
        .cloned()
        .collect()
}
