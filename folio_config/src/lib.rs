use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use folio_models::{email_address::EmailAddressWithName, Sensitive};
use serde::Deserialize;
use url::Url;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of additional config files, applied in order after
/// the default config.
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";

const ENV_PREFIX: &str = "FOLIO";
const ENV_SEPARATOR: &str = "__";

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const FALLBACK_SENDER: &str = "noreply@localhost";

/// Load the default config, any files listed in `FOLIO_CONFIG` and the
/// `FOLIO_*` environment overrides.
pub fn load() -> anyhow::Result<Config> {
    let extra_paths = std::env::var(CONFIG_PATH_ENV).unwrap_or_default();
    let paths = std::iter::once(DEFAULT_CONFIG_PATH)
        .chain(extra_paths.split(':').filter(|path| !path.is_empty()))
        .collect::<Vec<_>>();

    load_from(&paths, Some(environment()))
}

/// Load only the given config files, ignoring the environment.
pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    load_from(paths, None)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

fn load_from(
    paths: &[impl AsRef<Path>],
    environment: Option<Environment>,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let builder = match environment {
        Some(environment) => builder.add_source(environment),
        None => builder,
    };

    builder
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
    pub sentry: Option<SentryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Public url of the website, used to point crawlers at the sitemap.
    pub site_url: Url,
    /// Origins allowed to submit the contact form from a browser.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub real_ip: Option<HttpRealIpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailConfig {
    pub from: Option<EmailAddressWithName>,
    pub sendgrid: Option<SendGridConfig>,
    pub mailgun: Option<MailgunConfig>,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendGridConfig {
    pub api_key: Option<Sensitive<String>>,
    pub from: Option<EmailAddressWithName>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MailgunConfig {
    pub api_key: Option<Sensitive<String>>,
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Upgrade the connection with STARTTLS. Disable only for local relays.
    #[serde(default = "default_smtp_starttls")]
    pub starttls: bool,
    pub user: Option<String>,
    pub password: Option<Sensitive<String>>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            starttls: default_smtp_starttls(),
            user: None,
            password: None,
        }
    }
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.into()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_smtp_starttls() -> bool {
    true
}

/// The single mail transport selected for this deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTransportConfig {
    SendGrid {
        api_key: Sensitive<String>,
    },
    Mailgun {
        domain: String,
        api_key: Sensitive<String>,
    },
    Smtp {
        host: String,
        port: u16,
        starttls: bool,
        user: Option<String>,
        password: Option<Sensitive<String>>,
    },
}

impl EmailConfig {
    /// Select the mail transport. A SendGrid api key wins over a Mailgun api
    /// key, which wins over the generic smtp relay. Empty values count as
    /// absent.
    pub fn transport(&self) -> anyhow::Result<EmailTransportConfig> {
        if let Some(api_key) = self
            .sendgrid
            .as_ref()
            .and_then(|sendgrid| non_empty(&sendgrid.api_key))
        {
            return Ok(EmailTransportConfig::SendGrid { api_key });
        }

        if let Some((mailgun, api_key)) = self
            .mailgun
            .as_ref()
            .and_then(|mailgun| Some((mailgun, non_empty(&mailgun.api_key)?)))
        {
            let domain = mailgun
                .domain
                .clone()
                .filter(|domain| !domain.is_empty())
                .context("A mailgun api key is configured, but no mailgun domain")?;
            return Ok(EmailTransportConfig::Mailgun { domain, api_key });
        }

        Ok(EmailTransportConfig::Smtp {
            host: self.smtp.host.clone(),
            port: self.smtp.port,
            starttls: self.smtp.starttls,
            user: self.smtp.user.clone().filter(|user| !user.is_empty()),
            password: non_empty(&self.smtp.password),
        })
    }

    /// The address all outgoing emails are sent from.
    ///
    /// Falls back to the smtp user (if it is an email address), then to the
    /// SendGrid sender and finally to `noreply@localhost`.
    pub fn sender(&self) -> anyhow::Result<EmailAddressWithName> {
        let sender = self
            .from
            .clone()
            .or_else(|| {
                self.smtp
                    .user
                    .as_deref()
                    .and_then(|user| user.parse().ok())
            })
            .or_else(|| {
                self.sendgrid
                    .as_ref()
                    .and_then(|sendgrid| sendgrid.from.clone())
            });

        match sender {
            Some(sender) => Ok(sender),
            None => FALLBACK_SENDER
                .parse()
                .context("Failed to parse fallback sender address"),
        }
    }
}

fn non_empty(value: &Option<Sensitive<String>>) -> Option<Sensitive<String>> {
    value.clone().filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Recipient of contact form submissions.
    pub email: EmailAddressWithName,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub points: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            points: 5,
            window: Duration(std::time::Duration::from_secs(15 * 60)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Deserialize)]
pub struct SentryConfig {
    pub dsn: Url,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load_with_env(vars: &[(&str, &str)]) -> Config {
        let vars = vars
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect::<HashMap<_, _>>();
        load_from(&[DEFAULT_CONFIG_PATH], Some(environment().source(Some(vars)))).unwrap()
    }

    #[test]
    fn load_default_config() {
        let config = load_paths(&[DEFAULT_CONFIG_PATH]).unwrap();

        assert_eq!(config.contact.rate_limit.points, 5);
        assert_eq!(
            config.contact.rate_limit.window.0,
            std::time::Duration::from_secs(15 * 60)
        );
        assert_eq!(
            config.email.transport().unwrap(),
            EmailTransportConfig::Smtp {
                host: "smtp.gmail.com".into(),
                port: 587,
                starttls: true,
                user: None,
                password: None,
            }
        );
    }

    #[test]
    fn environment_overrides() {
        let config = load_with_env(&[
            ("FOLIO_HTTP__PORT", "8080"),
            ("FOLIO_EMAIL__SENDGRID__API_KEY", "SG.secret"),
            ("FOLIO_CONTACT__EMAIL", "owner@example.com"),
        ]);

        assert_eq!(config.http.port, 8080);
        assert_eq!(
            config.email.transport().unwrap(),
            EmailTransportConfig::SendGrid {
                api_key: "SG.secret".to_owned().into()
            }
        );
        assert_eq!(config.contact.email.to_string(), "owner@example.com");
    }

    #[test]
    fn transport_sendgrid_wins() {
        let config = EmailConfig {
            sendgrid: Some(SendGridConfig {
                api_key: Some("SG.key".to_owned().into()),
                from: None,
            }),
            mailgun: Some(MailgunConfig {
                api_key: Some("mg-key".to_owned().into()),
                domain: Some("mg.example.com".into()),
            }),
            ..Default::default()
        };

        assert_eq!(
            config.transport().unwrap(),
            EmailTransportConfig::SendGrid {
                api_key: "SG.key".to_owned().into()
            }
        );
    }

    #[test]
    fn transport_mailgun() {
        let config = EmailConfig {
            sendgrid: Some(SendGridConfig {
                api_key: Some(String::new().into()),
                from: None,
            }),
            mailgun: Some(MailgunConfig {
                api_key: Some("mg-key".to_owned().into()),
                domain: Some("mg.example.com".into()),
            }),
            ..Default::default()
        };

        assert_eq!(
            config.transport().unwrap(),
            EmailTransportConfig::Mailgun {
                domain: "mg.example.com".into(),
                api_key: "mg-key".to_owned().into(),
            }
        );
    }

    #[test]
    fn transport_mailgun_without_domain() {
        let config = EmailConfig {
            mailgun: Some(MailgunConfig {
                api_key: Some("mg-key".to_owned().into()),
                domain: None,
            }),
            ..Default::default()
        };

        config.transport().unwrap_err();
    }

    #[test]
    fn transport_smtp_with_credentials() {
        let config = EmailConfig {
            smtp: SmtpConfig {
                host: "mail.example.com".into(),
                port: 465,
                starttls: true,
                user: Some("me@example.com".into()),
                password: Some("hunter2".to_owned().into()),
            },
            ..Default::default()
        };

        assert_eq!(
            config.transport().unwrap(),
            EmailTransportConfig::Smtp {
                host: "mail.example.com".into(),
                port: 465,
                starttls: true,
                user: Some("me@example.com".into()),
                password: Some("hunter2".to_owned().into()),
            }
        );
    }

    #[test]
    fn transport_smtp_local_relay() {
        let config = EmailConfig {
            smtp: SmtpConfig {
                host: "localhost".into(),
                port: 1025,
                starttls: false,
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            config.transport().unwrap(),
            EmailTransportConfig::Smtp {
                host: "localhost".into(),
                port: 1025,
                starttls: false,
                user: None,
                password: None,
            }
        );
    }

    #[test]
    fn sender_explicit() {
        let config = EmailConfig {
            from: Some("Folio <folio@example.com>".parse().unwrap()),
            smtp: SmtpConfig {
                user: Some("me@example.com".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            config.sender().unwrap().to_string(),
            "Folio <folio@example.com>"
        );
    }

    #[test]
    fn sender_from_smtp_user() {
        let config = EmailConfig {
            smtp: SmtpConfig {
                user: Some("me@example.com".into()),
                ..Default::default()
            },
            sendgrid: Some(SendGridConfig {
                api_key: None,
                from: Some("sg@example.com".parse().unwrap()),
            }),
            ..Default::default()
        };

        assert_eq!(config.sender().unwrap().to_string(), "me@example.com");
    }

    #[test]
    fn sender_from_sendgrid() {
        let config = EmailConfig {
            smtp: SmtpConfig {
                user: Some("apikey".into()),
                ..Default::default()
            },
            sendgrid: Some(SendGridConfig {
                api_key: None,
                from: Some("sg@example.com".parse().unwrap()),
            }),
            ..Default::default()
        };

        assert_eq!(config.sender().unwrap().to_string(), "sg@example.com");
    }

    #[test]
    fn sender_fallback() {
        let config = EmailConfig::default();

        assert_eq!(config.sender().unwrap().to_string(), "noreply@localhost");
    }
}
