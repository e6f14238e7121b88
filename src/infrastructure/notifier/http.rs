//! HTTP adapter for the email collaborator
//!
//! POSTs the booking email payload as JSON to a configured endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{BookingEmail, NotificationError, Notifier};

/// Longest response body kept in a rejection error
const MAX_ERROR_BODY: usize = 512;

pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn deliver(&self, email: &BookingEmail) -> Result<(), NotificationError> {
        let mut request = self.client.post(&self.endpoint).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NotificationError::Timeout
            } else {
                NotificationError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(
                booking_id = %email.booking_id,
                status = status.as_u16(),
                "Email collaborator accepted"
            );
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        Err(NotificationError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationKind;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct Captured {
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    async fn accept(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        *captured.auth.lock().await = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured.bodies.lock().await.push(body);
        StatusCode::OK
    }

    async fn unavailable() -> (StatusCode, &'static str) {
        (StatusCode::SERVICE_UNAVAILABLE, "mail relay down")
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/send-booking-email")
    }

    fn email() -> BookingEmail {
        BookingEmail {
            to_email: "amina@example.com".into(),
            to_name: "Amina".into(),
            booking_id: Uuid::new_v4(),
            tour_title: "Maasai Mara Safari".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            guests_count: 3,
            total_price: Decimal::from(2400),
            kind: NotificationKind::Confirmation,
        }
    }

    #[tokio::test]
    async fn posts_payload_with_bearer_key() {
        let captured = Captured::default();
        let url = serve(
            Router::new()
                .route("/send-booking-email", post(accept))
                .with_state(captured.clone()),
        )
        .await;

        let notifier =
            HttpNotifier::new(url, Some("k-123".into()), Duration::from_secs(2)).unwrap();
        notifier.deliver(&email()).await.unwrap();

        let bodies = captured.bodies.lock().await;
        assert_eq!(bodies[0]["type"], "confirmation");
        assert_eq!(bodies[0]["total_price"], 2400.0);
        assert_eq!(captured.auth.lock().await.as_deref(), Some("Bearer k-123"));
    }

    #[tokio::test]
    async fn server_errors_are_transient_rejections() {
        let url = serve(Router::new().route("/send-booking-email", post(unavailable))).await;
        let notifier = HttpNotifier::new(url, None, Duration::from_secs(2)).unwrap();

        let err = notifier.deliver(&email()).await.unwrap_err();
        match &err {
            NotificationError::Rejected { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "mail relay down");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let notifier =
            HttpNotifier::new("http://127.0.0.1:9/nowhere", None, Duration::from_millis(500))
                .unwrap();
        let err = notifier.deliver(&email()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
