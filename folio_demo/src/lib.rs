use std::{
    net::{IpAddr, Ipv4Addr},
    sync::LazyLock,
};

use folio_models::{contact::ContactForm, email_address::EmailAddressWithName};

pub mod contact;

pub const CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 42));

pub static CONTACT_EMAIL: LazyLock<EmailAddressWithName> =
    LazyLock::new(|| "contact@example.com".parse().unwrap());

pub static ANA: LazyLock<ContactForm> = LazyLock::new(|| ContactForm {
    name: "Ana García".into(),
    email: "ana@example.com".into(),
    subject: "Consulta proyecto".into(),
    message: "Hola, me gustaría hablar sobre un proyecto de automatización.".into(),
    honeypot: Some("".into()),
});
