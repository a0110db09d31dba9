//! Network side of the console: the TCP listener and per-connection sessions.
//!
//! Each accepted connection gets its own tokio task owning a [`Session`], so
//! nothing but the read-only command registry is shared between sessions.

mod listener;
mod session;
#[cfg(test)]
mod tests;

pub use listener::{Server, TOO_MANY_CLIENTS};
pub use session::{Session, SessionId};
