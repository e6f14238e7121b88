//! Liveness and storage reachability

pub mod handlers;

pub use handlers::*;
