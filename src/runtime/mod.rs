//! Runtime orchestration.
//!
//! - [`CartSystem`] - Starts the in-process cart service and the store that talks to it
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod cart_system;
pub mod tracing;

pub use cart_system::*;
pub use self::tracing::*;
