use anyhow::{anyhow, Result};
use sacloud_webhook::{
    Config, KubeSecretStore, Registry, SacloudApiBuilder, SacloudSolver, SharedConfig,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("sacloud-webhook".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;

    let secrets = KubeSecretStore::from_config(&config)?;
    let mut registry = Registry::new();
    registry.register(Arc::new(SacloudSolver::new(
        Arc::new(secrets),
        Box::new(SacloudApiBuilder::from_config(&config)),
    )));

    tracing::info!(
        "webhook serving group \"{}\" on {}",
        config.group_name,
        config.api_bind_addr
    );
    let api_server = sacloud_webhook::new_api(config.clone(), registry);
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sacloud_webhook=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
