//! Notifications module
//!
//! Booking lifecycle events are published on an in-process event bus after the
//! ledger write commits. Subscribers run outside the request path:
//!
//! - [`NotificationWorker`] turns confirmations and cancellations into emails
//! - `CapacityMonitor` (application layer) raises sold-out alerts
//!
//! # Usage
//! ```ignore
//! use tour_booking::notifications::{create_event_bus, Event};
//!
//! let event_bus = create_event_bus();
//! let mut subscriber = event_bus.subscribe();
//! event_bus.publish(Event::BookingConfirmed(snapshot));
//! ```

pub mod event_bus;
pub mod events;
pub mod worker;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
pub use worker::NotificationWorker;
