//! Notifier that only logs, used when no email endpoint is configured.

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{BookingEmail, NotificationError, Notifier};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, email: &BookingEmail) -> Result<(), NotificationError> {
        info!(
            to = %email.to_email,
            booking_id = %email.booking_id,
            kind = ?email.kind,
            tour = %email.tour_title,
            start_date = %email.start_date,
            "📨 Booking email (log only)"
        );
        Ok(())
    }
}
