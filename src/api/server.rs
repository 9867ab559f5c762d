use crate::api::routes;
use crate::config::SharedConfig;
use crate::solver::Registry;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub registry: Registry,
}

pub fn new(
    config: SharedConfig,
    registry: Registry,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.api_bind_addr)
        .serve(routes::new(AppState { config, registry }).into_make_service())
}
