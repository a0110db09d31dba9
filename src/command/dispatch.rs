//! Resolving a tokenized line against the command table.
//!
//! [`Dispatcher`] serves interactive sessions: it knows about the exit
//! keywords and replays the last repeatable command on an empty line.
//! [`run_command`] is the stateless entry point for out-of-band callers.

use std::sync::Arc;

use tracing::{debug, warn};

use super::registry::{CommandRegistry, CommandSpec};
use super::tokenizer::split_line;
use crate::console::telnet::CRLF;

/// First tokens that end an interactive session.
const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "bye"];

/// What the session should do after a line was dispatched.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Nothing to write.
    Silent,
    /// User feedback (unknown command, bad argument count), CRLF-terminated.
    Reply(String),
    /// A handler ran. `output` is CRLF-terminated; `error` carries the
    /// handler's failure for the caller to log.
    Executed {
        output: String,
        error: Option<anyhow::Error>,
    },
    /// The user asked to leave; close the connection.
    Close,
}

/// Per-session dispatcher holding the "repeat on empty line" memory.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    last: Option<(Arc<CommandSpec>, Vec<String>)>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            last: None,
        }
    }

    /// Name of the command an empty line would replay.
    pub fn last_command(&self) -> Option<&str> {
        self.last.as_ref().map(|(spec, _)| spec.name())
    }

    pub fn dispatch(&mut self, tokens: Vec<String>) -> DispatchOutcome {
        let Some(first) = tokens.first() else {
            return DispatchOutcome::Silent;
        };

        if EXIT_KEYWORDS.contains(&first.as_str()) {
            return DispatchOutcome::Close;
        }

        if first.is_empty() {
            return match &self.last {
                Some((spec, args)) => {
                    debug!(command = spec.name(), "repeating last command");
                    execute(spec, args)
                }
                None => DispatchOutcome::Silent,
            };
        }

        let spec = match resolve(&self.registry, &tokens) {
            Ok(spec) => spec.clone(),
            Err(message) => return DispatchOutcome::Reply(format!("{message}{CRLF}")),
        };

        let outcome = execute(&spec, &tokens);
        self.last = spec.repeatable().then(|| (spec, tokens));
        outcome
    }
}

/// Run one command line without a session.
///
/// No exit keywords, no repeat on empty input and no history. Returns the
/// handler's text, the user-facing message for an unknown command or bad
/// argument count, or the handler's error message if it failed.
pub fn run_command(registry: &CommandRegistry, line: &str) -> String {
    let tokens = split_line(line);
    match tokens.first() {
        None => return String::new(),
        Some(first) if first.is_empty() => return String::new(),
        Some(_) => {}
    }

    let spec = match resolve(registry, &tokens) {
        Ok(spec) => spec,
        Err(message) => return message,
    };

    match spec.invoke(&tokens) {
        Ok(text) => text,
        Err(e) => {
            warn!(command = spec.name(), error = %e, "command failed");
            format!("{e:#}")
        }
    }
}

/// Look up `tokens[0]` and check the argument count.
fn resolve<'r>(
    registry: &'r CommandRegistry,
    tokens: &[String],
) -> Result<&'r Arc<CommandSpec>, String> {
    let name = tokens[0].as_str();
    let Some(spec) = registry.get(name) else {
        return Err(format!("Not found term command {name}"));
    };

    if !spec.accepts(tokens.len()) {
        return Err(format!(
            "Params of command {} should be {} - {}",
            name,
            spec.min_params(),
            spec.max_params()
        ));
    }

    Ok(spec)
}

fn execute(spec: &CommandSpec, args: &[String]) -> DispatchOutcome {
    debug!(command = spec.name(), argc = args.len(), "dispatching");
    let (text, error) = match spec.invoke(args) {
        Ok(text) => (text, None),
        Err(e) => (String::new(), Some(e)),
    };
    DispatchOutcome::Executed {
        output: format!("{text}{CRLF}"),
        error,
    }
}
