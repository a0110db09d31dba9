//! Utility modules for common functionality.
//!
//! Logging setup and small helpers shared by the server.

pub mod guard;
pub mod logger;
