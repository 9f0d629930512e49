use folio_di::Build;
use folio_email_contracts::{template::TemplateEmailService, Email, EmailBody, EmailService};
use folio_models::email_address::EmailAddressWithName;
use folio_templates_contracts::{
    ContactNotificationHtmlTemplate, ContactNotificationTemplate, ContactNotificationTextTemplate,
    TemplateService,
};
use folio_utils::trace_instrument;

#[derive(Debug, Clone, Build)]
pub struct TemplateEmailServiceImpl<Email, Template> {
    email: Email,
    template: Template,
}

impl<EmailS, Template> TemplateEmailService for TemplateEmailServiceImpl<EmailS, Template>
where
    EmailS: EmailService,
    Template: TemplateService,
{
    #[trace_instrument(skip(self))]
    async fn send_contact_notification_email(
        &self,
        recipient: EmailAddressWithName,
        reply_to: EmailAddressWithName,
        data: &ContactNotificationTemplate,
    ) -> anyhow::Result<bool> {
        let text = self
            .template
            .render(&ContactNotificationTextTemplate(data.clone()))?;
        let html = self
            .template
            .render(&ContactNotificationHtmlTemplate(data.clone()))?;

        self.email
            .send(Email {
                recipient,
                subject: format!("[Portfolio] {}", data.subject),
                body: EmailBody::Alternative { text, html },
                reply_to: Some(reply_to),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use folio_email_contracts::MockEmailService;
    use folio_templates_contracts::MockTemplateService;

    use super::*;

    fn data() -> ContactNotificationTemplate {
        ContactNotificationTemplate {
            name: "Ana García".into(),
            email: "ana@example.com".into(),
            subject: "Consulta proyecto".into(),
            message: "Hola, me gustaría hablar sobre un proyecto de automatización.".into(),
        }
    }

    #[tokio::test]
    async fn send_contact_notification_email() {
        // Arrange
        let template = MockTemplateService::new()
            .with_render(ContactNotificationTextTemplate(data()), "text".into())
            .with_render(ContactNotificationHtmlTemplate(data()), "<p>html</p>".into());

        let email = MockEmailService::new().with_send(
            Email {
                recipient: "contact@example.com".parse().unwrap(),
                subject: "[Portfolio] Consulta proyecto".into(),
                body: EmailBody::Alternative {
                    text: "text".into(),
                    html: "<p>html</p>".into(),
                },
                reply_to: Some("ana@example.com".parse().unwrap()),
            },
            true,
        );

        let sut = TemplateEmailServiceImpl { email, template };

        // Act
        let result = sut
            .send_contact_notification_email(
                "contact@example.com".parse().unwrap(),
                "ana@example.com".parse().unwrap(),
                &data(),
            )
            .await;

        // Assert
        assert!(result.unwrap());
    }
}
