use anyhow::Context;
use folio_config::Config;
use folio_di::Provide;
use folio_email_contracts::EmailService;
use tracing::info;

use crate::{
    email,
    environment::{types::RestServer, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to mail transport");
    let email = email::connect(&config.email).await?;
    email
        .ping()
        .await
        .context("Failed to reach the mail transport")?;

    let config_provider = ConfigProvider::new(&config);
    let mut provider = Provider::new(config_provider, email);
    let server: RestServer = provider.provide();
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}
