//! Ports the application layer calls out through

pub mod outbound;

pub use outbound::{BookingEmail, NotificationError, NotificationKind, Notifier, SharedNotifier};
