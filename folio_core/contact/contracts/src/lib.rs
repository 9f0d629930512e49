use std::{future::Future, net::IpAddr, time::Duration};

use folio_models::contact::{ContactForm, ContactFormFieldError, MalformedContactForm};
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Relay a contact form submission to the site owner.
    ///
    /// `client_ip` identifies the sender for rate limiting. Submissions
    /// without a known address share a single budget. Every call consumes
    /// from that budget, including calls with a malformed body.
    fn send_message(
        &self,
        client_ip: Option<IpAddr>,
        form: Result<ContactForm, MalformedContactForm>,
    ) -> impl Future<Output = Result<(), ContactSendMessageError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    #[error("Too many messages have been sent from this address.")]
    RateLimited { retry_after: Duration },
    #[error("The request body is not a contact form.")]
    Malformed,
    #[error("The submission is invalid.")]
    Validation(Vec<ContactFormFieldError>),
    #[error("The submission has been identified as spam.")]
    Spam,
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(
        mut self,
        client_ip: Option<IpAddr>,
        form: Result<ContactForm, MalformedContactForm>,
        result: Result<(), ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(
                mockall::predicate::eq(client_ip),
                mockall::predicate::eq(form),
            )
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }
}
