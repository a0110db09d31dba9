//! RustyConsole - an operator console reachable over telnet
//!
//! This library provides an interactive line console meant to be embedded in a
//! larger process for runtime inspection and administration:
//! - Telnet character-mode line editing with echo, backspace and history recall
//! - A command registry filled by the embedding application
//! - Dispatch with argument-count checks and "repeat last command on enter"
//! - A non-interactive entry point sharing the same command table
//!
//! # Example
//!
//! ```no_run
//! use rusty_console::{CommandRegistry, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = CommandRegistry::new();
//!     registry.register("echo", 16, 1, false, |args: &[String]| Ok(args[1..].join(" ")))?;
//!
//!     let server = Server::new(ServerConfig::default(), registry);
//!
//!     // Out-of-band callers reuse the same commands.
//!     assert_eq!(server.run_command("echo hello"), "hello");
//!
//!     server
//!         .run(async { tokio::signal::ctrl_c().await.unwrap_or(()) })
//!         .await
//! }
//! ```

pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use command::{run_command, CommandRegistry, CommandSpec, Handler};
pub use config::ServerConfig;
pub use error::ConsoleError;
pub use server::{Server, Session, SessionId};
