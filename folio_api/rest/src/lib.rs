use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::Router;
use folio_core_contact_contracts::ContactFeatureService;
use folio_core_health_contracts::HealthFeatureService;
use folio_di::Build;
use tokio::net::TcpListener;
use url::Url;

mod errors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone, Build)]
pub struct RestServer<Health, Contact> {
    health: Health,
    contact: Contact,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub addr: SocketAddr,
    /// Public url of the website the api belongs to.
    pub site_url: Arc<Url>,
    /// Origins allowed to make cross-origin requests.
    pub allowed_origins: Arc<[String]>,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
}

/// Trust the client address sent by a reverse proxy.
#[derive(Debug, Clone)]
pub struct RestServerRealIpConfig {
    /// Name of the header containing the real client address.
    pub header: String,
    /// Address of the reverse proxy. The header is ignored on requests from
    /// any other address.
    pub set_from: IpAddr,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
{
    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.addr).await?;
        let router = self.router();
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::contact::router(self.contact.into()))
            .merge(routes::robots::router(self.config.site_url));

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::cors::add(&self.config.allowed_origins)(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::client_ip::add(self.config.real_ip_config)(router);
        middlewares::request_id::add(router)
    }
}
