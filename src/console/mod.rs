//! The interactive side of a console connection: telnet byte handling,
//! line editing and per-session history.

mod editor;
mod history;
pub mod telnet;

pub use editor::{LineEditor, Step, MAX_LINE_BYTES};
pub use history::{HistoryBuffer, MAX_HISTORY_LINES};
