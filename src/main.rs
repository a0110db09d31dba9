//! Demo entry point for RustyConsole.
//!
//! Registers a few example commands and serves them until Ctrl+C. An optional
//! JSON config file path may be given as the first argument; `CONSOLE_*`
//! environment variables override it. Try it with `telnet 127.0.0.1 6789`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;

use rusty_console::utils;
use rusty_console::{CommandRegistry, Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => ServerConfig::load(&PathBuf::from(path))?,
        None => ServerConfig::default(),
    }
    .with_env_overrides()?;

    // Initialize logging before anything else
    utils::logger::init_logging(config.log_dir.as_deref());

    let server = Server::new(config, demo_commands()?);
    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await
}

fn demo_commands() -> Result<CommandRegistry> {
    let started = Instant::now();
    let mut reg = CommandRegistry::new();

    reg.register("echo", 32, 1, false, |args: &[String]| Ok(args[1..].join(" ")))?;

    reg.register("sum", 32, 2, false, |args: &[String]| -> Result<String> {
        let mut total: i64 = 0;
        for arg in &args[1..] {
            total += arg
                .parse::<i64>()
                .with_context(|| format!("not a number: {}", arg))?;
        }
        Ok(total.to_string())
    })?;

    reg.register("time", 1, 1, true, |_: &[String]| {
        Ok(Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    })?;

    reg.register("uptime", 1, 1, true, move |_: &[String]| {
        Ok(format!("{}s", started.elapsed().as_secs()))
    })?;

    let mut names = reg.names();
    names.push("help".to_string());
    names.sort();
    reg.register("help", 1, 1, false, move |_: &[String]| {
        Ok(format!("{}\r\nexit, quit or bye to leave", names.join(" ")))
    })?;

    Ok(reg)
}
