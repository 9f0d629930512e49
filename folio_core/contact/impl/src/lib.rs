use std::{net::IpAddr, sync::Arc};

use anyhow::Context;
use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_di::Build;
use folio_email_contracts::template::TemplateEmailService;
use folio_models::{
    contact::{ContactForm, MalformedContactForm},
    email_address::EmailAddressWithName,
};
use folio_shared_contracts::rate_limit::{RateLimitError, RateLimitService};
use folio_templates_contracts::ContactNotificationTemplate;
use folio_utils::trace_instrument;
use tracing::{debug, error};

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<RateLimit, TemplateEmail> {
    rate_limit: RateLimit,
    template_email: TemplateEmail,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Recipient of all contact notifications.
    pub email: Arc<EmailAddressWithName>,
}

impl<RateLimit, TemplateEmail> ContactFeatureService
    for ContactFeatureServiceImpl<RateLimit, TemplateEmail>
where
    RateLimit: RateLimitService,
    TemplateEmail: TemplateEmailService,
{
    #[trace_instrument(skip(self))]
    async fn send_message(
        &self,
        client_ip: Option<IpAddr>,
        form: Result<ContactForm, MalformedContactForm>,
    ) -> Result<(), ContactSendMessageError> {
        self.rate_limit
            .consume(&rate_limit_key(client_ip))
            .await
            .map_err(|err| match err {
                RateLimitError::Exceeded { retry_after } => {
                    ContactSendMessageError::RateLimited { retry_after }
                }
                RateLimitError::Other(err) => err.context("Failed to check rate limit").into(),
            })?;

        let form = form.map_err(|MalformedContactForm| {
            debug!(?client_ip, "rejecting malformed contact form");
            ContactSendMessageError::Malformed
        })?;

        // the honeypot takes precedence over any field errors
        let message = form.validate();
        if form.is_spam() {
            debug!(?client_ip, "rejecting contact form with filled honeypot");
            return Err(ContactSendMessageError::Spam);
        }
        let message = message.map_err(ContactSendMessageError::Validation)?;

        let name = message.author.name.into_inner();
        let data = ContactNotificationTemplate {
            name: name.clone(),
            email: message.author.email.to_string(),
            subject: message.subject.into_inner(),
            message: message.content.into_inner(),
        };

        let sent = self
            .template_email
            .send_contact_notification_email(
                (*self.config.email).clone(),
                message.author.email.with_name(name),
                &data,
            )
            .await
            .context("Failed to send contact notification email")?;

        if !sent {
            error!(recipient = %self.config.email, "mail transport rejected the contact notification");
            return Err(ContactSendMessageError::Send);
        }

        Ok(())
    }
}

fn rate_limit_key(client_ip: Option<IpAddr>) -> String {
    match client_ip {
        Some(ip) => format!("contact:{ip}"),
        None => "contact:anonymous".into(),
    }
}
