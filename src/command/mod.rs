//! Console commands: the registry the embedding application fills, the
//! line tokenizer and the dispatcher that ties them together.

mod dispatch;
mod registry;
mod tokenizer;

pub use dispatch::{run_command, DispatchOutcome, Dispatcher};
pub use registry::{CommandRegistry, CommandSpec, Handler};
pub use tokenizer::split_line;
