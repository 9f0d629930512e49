use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use folio_core_contact_contracts::{ContactFeatureService, ContactSendMessageError};
use folio_models::contact::{ContactForm, MalformedContactForm};
use tracing::debug;

use crate::{
    errors::{internal_server_error, message, validation_error},
    middlewares::client_ip::ClientIp,
    models::contact::{ApiContactFieldError, ApiContactForm},
};

const SENT: &str = "Mensaje enviado correctamente";
const RATE_LIMITED: &str = "Demasiadas solicitudes. Inténtalo más tarde.";
const SPAM: &str = "Solicitud no válida";
const INVALID_FORM: &str = "Datos del formulario no válidos";

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactFeatureService>>,
    client_ip: Option<Extension<ClientIp>>,
    form: Result<Json<ApiContactForm>, JsonRejection>,
) -> Response {
    let form = form
        .map(|Json(form)| ContactForm::from(form))
        .map_err(|rejection| {
            debug!(%rejection, "failed to read contact form");
            MalformedContactForm
        });
    let client_ip = client_ip.and_then(|Extension(ClientIp(ip))| ip);

    match service.send_message(client_ip, form).await {
        Ok(()) => message(StatusCode::OK, SENT),
        Err(ContactSendMessageError::RateLimited { retry_after }) => (
            [(header::RETRY_AFTER, retry_after_seconds(retry_after).to_string())],
            message(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED),
        )
            .into_response(),
        Err(ContactSendMessageError::Spam) => message(StatusCode::BAD_REQUEST, SPAM),
        Err(ContactSendMessageError::Malformed) => {
            validation_error(INVALID_FORM, vec![ApiContactFieldError::invalid_json()])
        }
        Err(ContactSendMessageError::Validation(errors)) => validation_error(
            INVALID_FORM,
            errors.into_iter().map(Into::into).collect(),
        ),
        Err(ContactSendMessageError::Send) => internal_server_error(ContactSendMessageError::Send),
        Err(ContactSendMessageError::Other(err)) => internal_server_error(err),
    }
}

/// Whole seconds until `retry_after` has passed, rounded up.
fn retry_after_seconds(retry_after: Duration) -> u64 {
    retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use folio_core_contact_contracts::MockContactFeatureService;
    use folio_demo::{
        contact::{SHORT_MESSAGE, SPAM as SPAM_FORM},
        ANA, CLIENT_IP,
    };
    use folio_models::contact::{ContactFormField, ContactFormFieldError, ContactFormViolation};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn request(body: impl Into<Body>) -> axum::http::Request<Body> {
        axum::http::Request::post("/api/contact")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn form_json(form: &folio_models::contact::ContactForm) -> String {
        json!({
            "name": form.name,
            "email": form.email,
            "subject": form.subject,
            "message": form.message,
            "honeypot": form.honeypot,
        })
        .to_string()
    }

    async fn send(
        service: MockContactFeatureService,
        body: impl Into<Body>,
    ) -> (StatusCode, Option<String>, Value) {
        let router = router(Arc::new(service)).layer(Extension(ClientIp(Some(CLIENT_IP))));
        let response = router.oneshot(request(body)).await.unwrap();
        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .map(|x| x.to_str().unwrap().to_owned());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, retry_after, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let service =
            MockContactFeatureService::new().with_send_message(Some(CLIENT_IP), Ok(ANA.clone()), Ok(()));

        // Act
        let (status, _, body) = send(service, form_json(&ANA)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Mensaje enviado correctamente"}));
    }

    #[tokio::test]
    async fn rate_limited() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(ANA.clone()),
            Err(ContactSendMessageError::RateLimited {
                retry_after: Duration::from_millis(299_500),
            }),
        );

        // Act
        let (status, retry_after, body) = send(service, form_json(&ANA)).await;

        // Assert
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(retry_after.as_deref(), Some("300"));
        assert_eq!(
            body,
            json!({"message": "Demasiadas solicitudes. Inténtalo más tarde."})
        );
    }

    #[tokio::test]
    async fn spam() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(SPAM_FORM.clone()),
            Err(ContactSendMessageError::Spam),
        );

        // Act
        let (status, _, body) = send(service, form_json(&SPAM_FORM)).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "Solicitud no válida"}));
    }

    #[tokio::test]
    async fn validation_failed() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(SHORT_MESSAGE.clone()),
            Err(ContactSendMessageError::Validation(vec![
                ContactFormFieldError {
                    field: ContactFormField::Message,
                    violation: ContactFormViolation::TooShort { min: 10 },
                },
            ])),
        );

        // Act
        let (status, _, body) = send(service, form_json(&SHORT_MESSAGE)).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "message": "Datos del formulario no válidos",
                "errors": [{
                    "field": "message",
                    "code": "too_short",
                    "message": "El mensaje debe tener al menos 10 caracteres",
                }],
            })
        );
    }

    #[tokio::test]
    async fn missing_fields_reach_validation() {
        // Arrange
        let form = folio_models::contact::ContactForm {
            name: "Ana García".into(),
            ..Default::default()
        };
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(form),
            Err(ContactSendMessageError::Validation(vec![])),
        );

        // Act
        let (status, _, _) = send(service, json!({"name": "Ana García"}).to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_json() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Err(MalformedContactForm),
            Err(ContactSendMessageError::Malformed),
        );

        // Act
        let (status, _, body) = send(service, "{not json").await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "message": "Datos del formulario no válidos",
                "errors": [{
                    "field": "body",
                    "code": "invalid_json",
                    "message": "El cuerpo de la solicitud no es JSON válido",
                }],
            })
        );
    }

    #[tokio::test]
    async fn wrong_field_type_is_rate_limited() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Err(MalformedContactForm),
            Err(ContactSendMessageError::RateLimited {
                retry_after: Duration::from_secs(60),
            }),
        );
        let body = json!({
            "name": 1,
            "email": "ana@example.com",
            "subject": "Consulta proyecto",
            "message": "Hola, me gustaría hablar sobre un proyecto.",
            "honeypot": "",
        });

        // Act
        let (status, retry_after, _) = send(service, body.to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(retry_after.as_deref(), Some("60"));
    }

    #[tokio::test]
    async fn missing_honeypot_is_passed_on() {
        // Arrange
        let form = folio_models::contact::ContactForm {
            honeypot: None,
            ..ANA.clone()
        };
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(form),
            Err(ContactSendMessageError::Validation(vec![
                ContactFormFieldError {
                    field: ContactFormField::Honeypot,
                    violation: ContactFormViolation::Missing,
                },
            ])),
        );
        let body = json!({
            "name": ANA.name,
            "email": ANA.email,
            "subject": ANA.subject,
            "message": ANA.message,
        });

        // Act
        let (status, _, body) = send(service, body.to_string()).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "honeypot");
        assert_eq!(body["errors"][0]["code"], "required");
    }

    #[tokio::test]
    async fn send_failed() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(ANA.clone()),
            Err(ContactSendMessageError::Send),
        );

        // Act
        let (status, _, body) = send(service, form_json(&ANA)).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Error interno del servidor"}));
    }

    #[tokio::test]
    async fn other_error() {
        // Arrange
        let service = MockContactFeatureService::new().with_send_message(
            Some(CLIENT_IP),
            Ok(ANA.clone()),
            Err(anyhow::anyhow!("smtp connection reset").into()),
        );

        // Act
        let (status, _, body) = send(service, form_json(&ANA)).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Error interno del servidor"}));
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_seconds(Duration::from_secs(900)), 900);
        assert_eq!(retry_after_seconds(Duration::from_millis(1)), 1);
        assert_eq!(retry_after_seconds(Duration::ZERO), 0);
    }
}
