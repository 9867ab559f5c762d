use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// API resource group the solver set is registered under, e.g. `acme.example.com`.
    /// Forms the route prefix `/apis/{group_name}/v1alpha1`. Required, validated at load.
    pub group_name: String,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    #[serde(default = "default_kube_api_url")]
    pub kube_api_url: String,
    #[serde(default = "default_kube_token_path")]
    pub kube_token_path: String,
    #[serde(default = "default_sacloud_api_url")]
    pub sacloud_api_url: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_sacloud_timeout")]
    pub sacloud_timeout: Duration,
}

fn default_kube_api_url() -> String {
    "https://kubernetes.default.svc".to_string()
}

fn default_kube_token_path() -> String {
    "/var/run/secrets/kubernetes.io/serviceaccount/token".to_string()
}

fn default_sacloud_api_url() -> String {
    "https://secure.sakura.ad.jp".to_string()
}

fn default_sacloud_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.group_name.is_empty() {
            return Err(Error::MissingGroupName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Config {
        serde_json::from_str(json).expect("config should deserialize")
    }

    #[test]
    fn full_config() {
        let conf = parse(
            r#"{
                "group_name": "acme.example.com",
                "api_bind_addr": "127.0.0.1:4443",
                "api_timeout": 10,
                "kube_api_url": "https://127.0.0.1:6443",
                "sacloud_timeout": 5
            }"#,
        );
        conf.validate().expect("config should validate");
        assert_eq!(conf.group_name, "acme.example.com");
        assert_eq!(conf.api_timeout, Duration::from_secs(10));
        assert_eq!(conf.kube_api_url, "https://127.0.0.1:6443");
        assert_eq!(conf.sacloud_timeout, Duration::from_secs(5));
        assert_eq!(conf.sacloud_api_url, "https://secure.sakura.ad.jp");
        assert_eq!(
            conf.kube_token_path,
            "/var/run/secrets/kubernetes.io/serviceaccount/token"
        );
    }

    #[test]
    fn empty_group_name_rejected() {
        let conf = parse(
            r#"{
                "group_name": "",
                "api_bind_addr": "127.0.0.1:4443",
                "api_timeout": 10
            }"#,
        );
        assert!(matches!(conf.validate(), Err(Error::MissingGroupName)));
    }
}
