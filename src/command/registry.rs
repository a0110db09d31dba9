//! Command table shared by every session.
//!
//! The embedding application fills a [`CommandRegistry`] once at startup and
//! hands it to the server, which shares it read-only across sessions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConsoleError, Result};

/// A command handler. Receives the full argument vector (the command name is
/// `args[0]`) and returns the text to print.
///
/// An `Err` discards any partial output: a session prints an empty result
/// line and logs the error, while [`run_command`](super::run_command) returns
/// the error message.
pub type Handler = Arc<dyn Fn(&[String]) -> anyhow::Result<String> + Send + Sync>;

/// One registered command.
///
/// Both parameter bounds count the command name itself.
#[derive(Clone)]
pub struct CommandSpec {
    name: String,
    min_params: usize,
    max_params: usize,
    repeatable: bool,
    handler: Handler,
}

impl CommandSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_params(&self) -> usize {
        self.min_params
    }

    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// Whether an empty input line replays this command.
    pub fn repeatable(&self) -> bool {
        self.repeatable
    }

    /// Check an argument count against the registered bounds.
    pub fn accepts(&self, argc: usize) -> bool {
        (self.min_params..=self.max_params).contains(&argc)
    }

    pub fn invoke(&self, args: &[String]) -> anyhow::Result<String> {
        (self.handler)(args)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("min_params", &self.min_params)
            .field("max_params", &self.max_params)
            .field("repeatable", &self.repeatable)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<CommandSpec>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// # Arguments
    /// * `name` - Command name, matched against the first token of a line
    /// * `max_params` - Largest accepted token count, command name included
    /// * `min_params` - Smallest accepted token count, command name included
    /// * `repeatable` - Replay this command when the user submits an empty line
    /// * `handler` - Function run with the full token vector
    ///
    /// Registering an existing name replaces the previous command.
    pub fn register<F>(
        &mut self,
        name: &str,
        max_params: usize,
        min_params: usize,
        repeatable: bool,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(&[String]) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        if min_params > max_params {
            return Err(ConsoleError::InvalidParams {
                name: name.to_string(),
                min: min_params,
                max: max_params,
            });
        }

        let spec = CommandSpec {
            name: name.to_string(),
            min_params,
            max_params,
            repeatable,
            handler: Arc::new(handler),
        };
        if self.commands.insert(name.to_string(), Arc::new(spec)).is_some() {
            debug!(command = name, "replaced existing command");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CommandSpec>> {
        self.commands.get(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
