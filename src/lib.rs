#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Cart Sync
//!
//! > **Client-side shopping cart state, kept consistent with a remote cart service.**
//!
//! The cart is owned by a REST backend. This crate keeps a local snapshot of it for a UI:
//! aggregates are read synchronously, writes go to the backend, and the snapshot is
//! reconciled afterwards. Selection toggles are applied optimistically and rolled back
//! when the backend refuses them.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! - **Key items**: [`CartLine`](model::CartLine), [`CartSnapshot`](model::CartSnapshot),
//!   [`CartLinePatch`](model::CartLinePatch).
//!
//! ### 2. The Backend Seam ([`service`])
//! The store only ever talks to the [`CartService`](service::CartService) trait.
//! - [`HttpCartService`](service::HttpCartService) speaks the REST protocol.
//! - [`CartServiceActor`](service::CartServiceActor) is an in-process backend, reached
//!   through a [`ChannelCartService`](service::ChannelCartService).
//! - [`MockCartService`](service::mock::MockCartService) answers from expectations in tests.
//!
//! ### 3. The Store ([`store`])
//! [`CartStore`](store::CartStore) holds the snapshot and implements every cart operation.
//! Failures surface twice: as a [`CartError`](store::CartError) return value and as a
//! message on the [`Notifier`](store::Notifier).
//!
//! ### 4. The Runtime ([`runtime`], [`config`])
//! - **Key items**: [`CartSystem`](runtime::CartSystem), [`setup_tracing`](runtime::setup_tracing),
//!   [`CartConfig`](config::CartConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo against the in-process backend
//! RUST_LOG=info cargo run
//! ```

pub mod config;
pub mod model;
pub mod runtime;
pub mod service;
pub mod store;
