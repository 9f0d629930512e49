use nutype::nutype;

use crate::email_address::EmailAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: EmailAddress,
}

#[nutype(
    validate(len_char_min = 2, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageAuthorName(String);

impl ContactMessageAuthorName {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 100;
}

#[nutype(
    validate(len_char_min = 5, len_char_max = 200),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageSubject(String);

impl ContactMessageSubject {
    pub const MIN_LENGTH: usize = 5;
    pub const MAX_LENGTH: usize = 200;
}

#[nutype(
    validate(len_char_min = 10, len_char_max = 2000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageContent(String);

impl ContactMessageContent {
    pub const MIN_LENGTH: usize = 10;
    pub const MAX_LENGTH: usize = 2000;
}

/// A request body that could not be read as a contact form at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedContactForm;

/// An unvalidated contact form submission as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Hidden field that humans never fill in. Browsers always submit it,
    /// so a missing honeypot is a validation error.
    pub honeypot: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactFormField {
    Name,
    Email,
    Subject,
    Message,
    Honeypot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFormViolation {
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFormFieldError {
    pub field: ContactFormField,
    pub violation: ContactFormViolation,
}

impl ContactForm {
    /// Whether the honeypot field has been filled in.
    pub fn is_spam(&self) -> bool {
        self.honeypot.as_ref().is_some_and(|honeypot| !honeypot.is_empty())
    }

    /// Validates all fields of the form, reporting every field that violates
    /// its constraints.
    pub fn validate(&self) -> Result<ContactMessage, Vec<ContactFormFieldError>> {
        let mut errors = Vec::new();
        let mut report = |field, violation| {
            errors.push(ContactFormFieldError { field, violation });
        };

        let name = ContactMessageAuthorName::try_new(self.name.clone())
            .map_err(|err| {
                use ContactMessageAuthorNameError as E;
                report(
                    ContactFormField::Name,
                    match err {
                        E::LenCharMinViolated => ContactFormViolation::TooShort {
                            min: ContactMessageAuthorName::MIN_LENGTH,
                        },
                        E::LenCharMaxViolated => ContactFormViolation::TooLong {
                            max: ContactMessageAuthorName::MAX_LENGTH,
                        },
                    },
                )
            })
            .ok();

        let email = self
            .email
            .parse::<EmailAddress>()
            .map_err(|_| report(ContactFormField::Email, ContactFormViolation::InvalidEmail))
            .ok();

        let subject = ContactMessageSubject::try_new(self.subject.clone())
            .map_err(|err| {
                use ContactMessageSubjectError as E;
                report(
                    ContactFormField::Subject,
                    match err {
                        E::LenCharMinViolated => ContactFormViolation::TooShort {
                            min: ContactMessageSubject::MIN_LENGTH,
                        },
                        E::LenCharMaxViolated => ContactFormViolation::TooLong {
                            max: ContactMessageSubject::MAX_LENGTH,
                        },
                    },
                )
            })
            .ok();

        let content = ContactMessageContent::try_new(self.message.clone())
            .map_err(|err| {
                use ContactMessageContentError as E;
                report(
                    ContactFormField::Message,
                    match err {
                        E::LenCharMinViolated => ContactFormViolation::TooShort {
                            min: ContactMessageContent::MIN_LENGTH,
                        },
                        E::LenCharMaxViolated => ContactFormViolation::TooLong {
                            max: ContactMessageContent::MAX_LENGTH,
                        },
                    },
                )
            })
            .ok();

        if self.honeypot.is_none() {
            report(ContactFormField::Honeypot, ContactFormViolation::Missing);
        }

        match (name, email, subject, content) {
            (Some(name), Some(email), Some(subject), Some(content)) if errors.is_empty() => {
                Ok(ContactMessage {
                    author: ContactMessageAuthor { name, email },
                    subject,
                    content,
                })
            }
            _ => Err(errors),
        }
    }
}
