use anyhow::Context;
use folio_config::{EmailConfig, EmailTransportConfig};
use folio_email_impl::{EmailServiceImpl, EmailTransport, SmtpCredentials};
use tracing::info;

/// Set up the mail transport selected by the config.
pub async fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    let transport = transport(config.transport()?);
    let sender = config.sender()?;
    info!(transport = transport.name(), %sender, "Using mail transport");

    EmailServiceImpl::new(transport, sender)
        .await
        .context("Failed to set up mail transport")
}

fn transport(config: EmailTransportConfig) -> EmailTransport {
    match config {
        EmailTransportConfig::SendGrid { api_key } => EmailTransport::SendGrid { api_key },
        EmailTransportConfig::Mailgun { domain, api_key } => {
            EmailTransport::Mailgun { domain, api_key }
        }
        EmailTransportConfig::Smtp {
            host,
            port,
            starttls,
            user,
            password,
        } => EmailTransport::Smtp {
            host,
            port,
            starttls,
            credentials: user
                .zip(password)
                .map(|(user, password)| SmtpCredentials { user, password }),
        },
    }
}
