//! Outbound port: delivery of booking emails to the notification collaborator
//!
//! Delivery is best-effort and always happens after the ledger write has
//! committed. Failures are retried by the notification worker and never reach
//! the booking caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Which email to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Confirmation,
    Cancellation,
}

/// Payload accepted by the email collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingEmail {
    pub to_email: String,
    pub to_name: String,
    pub booking_id: Uuid,
    pub tour_title: String,
    pub start_date: NaiveDate,
    pub guests_count: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Collaborator rejected notification with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notification delivery timed out")]
    Timeout,

    #[error("No contact details for user {0}")]
    RecipientUnknown(String),
}

impl NotificationError {
    /// Server-side and network failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::RecipientUnknown(_) => false,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, email: &BookingEmail) -> Result<(), NotificationError>;
}

pub type SharedNotifier = Arc<dyn Notifier>;
