//! Adapters for the outbound `Notifier` port

pub mod http;
pub mod log_notifier;

pub use http::HttpNotifier;
pub use log_notifier::LogNotifier;
