//! One console connection: prompt, read a line, dispatch, repeat.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::command::{split_line, CommandRegistry, DispatchOutcome, Dispatcher};
use crate::console::telnet::{PROMPT, SERVER_WILL};
use crate::console::{HistoryBuffer, LineEditor};
use crate::error::Result;

pub type SessionId = u64;

/// Owns a connection together with its history and "last command" memory.
pub struct Session<S> {
    id: SessionId,
    stream: S,
    editor: LineEditor,
    history: HistoryBuffer,
    dispatcher: Dispatcher,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(id: SessionId, stream: S, registry: Arc<CommandRegistry>) -> Self {
        Self {
            id,
            stream,
            editor: LineEditor::new(),
            history: HistoryBuffer::new(),
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Run until the user leaves or the connection fails.
    ///
    /// Returns `Ok(())` after an exit keyword. Peer disconnects and I/O
    /// failures come back as [`crate::ConsoleError::Connection`]; handler
    /// errors are logged and do not end the session.
    pub async fn run(self) -> Result<()> {
        let Session {
            id,
            stream,
            mut editor,
            mut history,
            mut dispatcher,
        } = self;
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        writer.write_all(&SERVER_WILL).await?;

        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let line = editor
                .read_line(&mut reader, &mut writer, &mut history)
                .await?;

            match dispatcher.dispatch(split_line(&line)) {
                DispatchOutcome::Silent => {}
                DispatchOutcome::Reply(text) => writer.write_all(text.as_bytes()).await?,
                DispatchOutcome::Executed { output, error } => {
                    if let Some(e) = error {
                        warn!(session = id, error = %format!("{e:#}"), "command failed");
                    }
                    writer.write_all(output.as_bytes()).await?;
                }
                DispatchOutcome::Close => {
                    debug!(session = id, "exit requested");
                    writer.shutdown().await?;
                    return Ok(());
                }
            }
        }
    }
}
