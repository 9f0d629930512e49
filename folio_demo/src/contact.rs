//! Submissions exercising the individual gates of the contact form.

use std::sync::LazyLock;

use folio_models::contact::ContactForm;

use crate::ANA;

/// A valid submission with the hidden honeypot field filled in.
pub static SPAM: LazyLock<ContactForm> = LazyLock::new(|| ContactForm {
    honeypot: Some("https://cheap-pills.example".into()),
    ..ANA.clone()
});

/// An invalid submission with the honeypot field filled in.
pub static INVALID_SPAM: LazyLock<ContactForm> = LazyLock::new(|| ContactForm {
    name: "x".into(),
    email: "bot".into(),
    subject: "".into(),
    message: "buy".into(),
    honeypot: Some("1".into()),
});

/// A submission whose message is too short.
pub static SHORT_MESSAGE: LazyLock<ContactForm> = LazyLock::new(|| ContactForm {
    message: "Hola!".into(),
    ..ANA.clone()
});
