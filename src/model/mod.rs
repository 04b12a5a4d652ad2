//! Cart data: lines, update payloads, and the client-side snapshot.

pub mod cart_line;
pub mod snapshot;

pub use cart_line::*;
pub use snapshot::*;
