use folio_models::contact::{
    ContactForm, ContactFormField, ContactFormFieldError, ContactFormViolation,
};
use serde::{Deserialize, Serialize};

/// Contact form as submitted by the website. Missing text fields are treated
/// as empty, a missing honeypot is kept as absent and rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiContactForm {
    /// Full name of the sender
    pub name: String,
    /// Email address of the sender
    pub email: String,
    /// Subject of the message
    pub subject: String,
    /// Content of the message
    pub message: String,
    /// Hidden field, must be present and empty
    pub honeypot: Option<String>,
}

impl From<ApiContactForm> for ContactForm {
    fn from(value: ApiContactForm) -> Self {
        Self {
            name: value.name,
            email: value.email,
            subject: value.subject,
            message: value.message,
            honeypot: value.honeypot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiContactFieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl ApiContactFieldError {
    pub fn invalid_json() -> Self {
        Self {
            field: "body",
            code: "invalid_json",
            message: "El cuerpo de la solicitud no es JSON válido".into(),
        }
    }
}

impl From<ContactFormFieldError> for ApiContactFieldError {
    fn from(ContactFormFieldError { field, violation }: ContactFormFieldError) -> Self {
        let (field, subject) = match field {
            ContactFormField::Name => ("name", "El nombre"),
            ContactFormField::Email => ("email", "El email"),
            ContactFormField::Subject => ("subject", "El asunto"),
            ContactFormField::Message => ("message", "El mensaje"),
            ContactFormField::Honeypot => ("honeypot", "El campo"),
        };

        let (code, message) = match violation {
            ContactFormViolation::TooShort { min } => (
                "too_short",
                format!("{subject} debe tener al menos {min} caracteres"),
            ),
            ContactFormViolation::TooLong { max } => (
                "too_long",
                format!("{subject} no puede superar los {max} caracteres"),
            ),
            ContactFormViolation::InvalidEmail => {
                ("invalid_email", "Introduce un email válido".into())
            }
            ContactFormViolation::Missing => ("required", "Campo no válido".into()),
        };

        Self {
            field,
            code,
            message,
        }
    }
}
