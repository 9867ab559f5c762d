//! Error types.

use axum::extract::rejection::JsonRejection;

/// Error enumerates the possible webhook error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the [`Config::group_name`][`crate::config::Config::group_name`] setting is
    /// absent or empty. The group name identifies the API resource group the solver set is
    /// served under and must be decided before the webhook starts.
    #[error("group_name must be specified")]
    MissingGroupName,

    /// Returned when a challenge request addresses a solver name that was never
    /// [registered][`crate::solver::Registry::register`]. Solver names disambiguate between
    /// implementations sharing one webhook deployment.
    #[error("no solver registered with name \"{0}\"")]
    UnknownSolver(String),

    /// Returned when clients `POST` invalid JSON.
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Returned when the per-request solver `config` blob does not decode into a
    /// [`SolverConfig`][`crate::solver::sacloud::SolverConfig`]. An absent blob is valid and
    /// decodes to the default config; a present-but-malformed one is not.
    #[error("error decoding solver config: {0}")]
    InvalidSolverConfig(serde_json::Error),

    /// Returned when a challenge's resolved FQDN does not end with its resolved zone.
    /// The two are produced together by cert-manager so a mismatch indicates a broken
    /// caller rather than a state this solver could recover from.
    #[error("FQDN \"{fqdn}\" is not within zone \"{zone}\"")]
    FqdnZoneMismatch { fqdn: String, zone: String },

    /// Returned when a referenced credential `Secret` cannot be fetched from the
    /// [`SecretStore`][`crate::secrets::SecretStore`].
    #[error("unable to get secret \"{namespace}/{name}\": {reason}")]
    SecretNotFound {
        namespace: String,
        name: String,
        reason: String,
    },

    /// Returned when a referenced credential `Secret` exists but lacks the selected key.
    #[error("key {key:?} not found in secret \"{namespace}/{name}\"")]
    SecretKeyMissing {
        namespace: String,
        name: String,
        key: String,
    },

    /// Returned when a secret value is not valid base64/UTF-8. Kubernetes serves `Secret`
    /// data base64-encoded over the API.
    #[error("secret \"{namespace}/{name}\" key {key:?} is not decodable: {reason}")]
    SecretDecode {
        namespace: String,
        name: String,
        key: String,
        reason: String,
    },

    /// Returned when a zone search does not produce exactly one match for the challenge
    /// domain. The solver will not guess among same-named zones nor create a missing one.
    #[error("uninitialized zone: {domain} ({matches} matches)")]
    UninitializedZone { domain: String, matches: usize },

    /// Returned when a Sakura Cloud API round-trip fails at the transport level.
    #[error("unable to sacloud api ({context}): {source}")]
    Api {
        context: &'static str,
        source: reqwest::Error,
    },

    /// Returned when the Sakura Cloud API answers with a non-success HTTP status.
    #[error("sacloud api ({context}) returned {status}: {body}")]
    ApiStatus {
        context: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file]) fails due to
    /// invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}
