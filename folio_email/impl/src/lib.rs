use anyhow::anyhow;
use folio_email_contracts::{Email, EmailBody, EmailService};
use folio_models::{email_address::EmailAddressWithName, Sensitive};
use folio_utils::{trace_instrument, Apply};
use lettre::{
    message::{header, MessageBuilder, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::warn;

pub mod template;

const SENDGRID_HOST: &str = "smtp.sendgrid.net";
const MAILGUN_HOST: &str = "smtp.mailgun.org";
const SUBMISSION_PORT: u16 = 587;

/// The mail transport used to deliver all outgoing emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTransport {
    /// SendGrid SMTP relay, authenticated with an api key.
    SendGrid { api_key: Sensitive<String> },
    /// Mailgun SMTP relay, authenticated as the postmaster of `domain`.
    Mailgun {
        domain: String,
        api_key: Sensitive<String>,
    },
    /// Any other SMTP relay. Without `starttls` the connection is plaintext,
    /// which is only acceptable for local relays.
    Smtp {
        host: String,
        port: u16,
        starttls: bool,
        credentials: Option<SmtpCredentials>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: Sensitive<String>,
}

impl EmailTransport {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendGrid { .. } => "sendgrid",
            Self::Mailgun { .. } => "mailgun",
            Self::Smtp { .. } => "smtp",
        }
    }

    fn connection(self) -> SmtpConnection {
        match self {
            Self::SendGrid { api_key } => SmtpConnection {
                host: SENDGRID_HOST.into(),
                port: SUBMISSION_PORT,
                starttls: true,
                credentials: Some(SmtpCredentials {
                    user: "apikey".into(),
                    password: api_key,
                }),
            },
            Self::Mailgun { domain, api_key } => SmtpConnection {
                host: MAILGUN_HOST.into(),
                port: SUBMISSION_PORT,
                starttls: true,
                credentials: Some(SmtpCredentials {
                    user: format!("postmaster@{domain}"),
                    password: api_key,
                }),
            },
            Self::Smtp {
                host,
                port,
                starttls,
                credentials,
            } => SmtpConnection {
                host,
                port,
                starttls,
                credentials,
            },
        }
    }

    fn build(self) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
        let SmtpConnection {
            host,
            port,
            starttls,
            credentials,
        } = self.connection();

        let builder = if starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)?
        } else {
            warn!(%host, port, "STARTTLS disabled, using insecure mailer");
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };

        Ok(builder
            .port(port)
            .apply_map(credentials, |builder, SmtpCredentials { user, password }| {
                builder.credentials(Credentials::new(user, password.0))
            })
            .build())
    }
}

/// Address, encryption and authentication used to reach the mail server.
#[derive(Debug, PartialEq, Eq)]
struct SmtpConnection {
    host: String,
    port: u16,
    starttls: bool,
    credentials: Option<SmtpCredentials>,
}

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailServiceImpl {
    pub async fn new(transport: EmailTransport, from: EmailAddressWithName) -> anyhow::Result<Self> {
        let transport = transport.build()?;

        Ok(Self { from, transport })
    }

    #[cfg(feature = "dummy")]
    pub async fn dummy() -> Self {
        Self::new(
            EmailTransport::Smtp {
                host: "dummy".into(),
                port: 25,
                starttls: false,
                credentials: None,
            },
            "dummy@example.com".parse().unwrap(),
        )
        .await
        .unwrap()
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject);

        let message = match email.body {
            EmailBody::Text(text) => builder.header(header::ContentType::TEXT_PLAIN).body(text)?,
            EmailBody::Alternative { text, html } => {
                builder.multipart(MultiPart::alternative_plain_html(text, html))?
            }
        };

        Ok(message)
    }
}

impl EmailService for EmailServiceImpl {
    #[trace_instrument(skip(self))]
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map(|response| response.is_positive())
            .map_err(Into::into)
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}
