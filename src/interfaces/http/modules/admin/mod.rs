//! Operator endpoints: ledger listing, payment hook, capacity and catalog

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
