//! Byte-level line editing for a telnet peer.
//!
//! The peer runs in character mode, so every keystroke arrives on its own and
//! the server is responsible for echo. [`LineEditor::feed`] is a pure state
//! machine: one byte in, echo bytes appended to a buffer, and a finished line
//! out once CR or LF is seen. [`LineEditor::read_line`] drives it from an
//! async stream.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

use super::history::HistoryBuffer;
use super::telnet::{
    self, BACKSPACE, CR, CRLF, CSI_BRACKET, ESC, IAC, KEY_DOWN, KEY_LEFT, KEY_RIGHT, KEY_UP, LF,
    NEGOTIATION_LEN, NUL, TAB,
};
use crate::error::{ConsoleError, Result};

/// Hard ceiling on bytes consumed for one line.
pub const MAX_LINE_BYTES: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputState {
    Normal,
    /// Swallowing the payload of an IAC sequence.
    ControlSkip { remaining: usize },
    /// Saw ESC, expecting `[`.
    EscapeIntro,
    /// Saw `ESC [`, next byte names the key.
    EscapeKey,
}

/// Result of feeding one byte.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Pending,
    Line(String),
}

#[derive(Debug)]
pub struct LineEditor {
    state: InputState,
    line: Vec<u8>,
    /// The line came from history recall and has not been edited since.
    recalled: bool,
    /// Bytes counted against `MAX_LINE_BYTES`.
    consumed: usize,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            state: InputState::Normal,
            line: Vec::with_capacity(64),
            recalled: false,
            consumed: 0,
        }
    }

    /// The line as edited so far.
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// Read bytes until a full line is available, echoing to `writer`.
    ///
    /// Finished lines are recorded in `history` unless they were recalled
    /// from it unchanged. Any read or write failure is returned as
    /// [`ConsoleError::Connection`] and the partial line is dropped.
    pub async fn read_line<R, W>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        history: &mut HistoryBuffer,
    ) -> Result<String>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut echo = Vec::with_capacity(64);
        loop {
            match self.pump(reader, writer, history, &mut echo).await {
                Ok(Step::Pending) => {}
                Ok(Step::Line(line)) => return Ok(line),
                Err(e) => {
                    self.clear();
                    return Err(e);
                }
            }
        }
    }

    /// Read, process and echo one byte.
    async fn pump<R, W>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        history: &mut HistoryBuffer,
        echo: &mut Vec<u8>,
    ) -> Result<Step>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let byte = reader.read_u8().await?;
        let step = self.feed(byte, history, echo)?;
        if !echo.is_empty() {
            writer.write_all(echo).await?;
            writer.flush().await?;
            echo.clear();
        }
        Ok(step)
    }

    /// Process a single input byte.
    pub fn feed(
        &mut self,
        byte: u8,
        history: &mut HistoryBuffer,
        echo: &mut Vec<u8>,
    ) -> Result<Step> {
        match self.state {
            InputState::ControlSkip { remaining } => {
                if remaining > 1 {
                    self.state = InputState::ControlSkip {
                        remaining: remaining - 1,
                    };
                } else {
                    // Negotiation in the middle of a line flushes it. A pending
                    // recall still resets the browse position on Enter.
                    self.state = InputState::Normal;
                    self.line.clear();
                    self.consumed = 0;
                }
                return Ok(Step::Pending);
            }
            InputState::EscapeIntro => {
                self.consumed += 1;
                self.state = if byte == CSI_BRACKET {
                    InputState::EscapeKey
                } else {
                    warn!("invalid escape sequence: 0x{:02x}", byte);
                    InputState::Normal
                };
            }
            InputState::EscapeKey => {
                self.consumed += 1;
                self.state = InputState::Normal;
                match byte {
                    KEY_UP => {
                        let entry = history.recall_up().to_string();
                        self.show_recalled(entry, echo);
                    }
                    KEY_DOWN => {
                        let entry = history.recall_down().to_string();
                        self.show_recalled(entry, echo);
                    }
                    KEY_LEFT | KEY_RIGHT => {}
                    other => trace!("ignored escape key 0x{:02x}", other),
                }
            }
            InputState::Normal => match byte {
                IAC => {
                    self.state = InputState::ControlSkip {
                        remaining: NEGOTIATION_LEN,
                    };
                }
                NUL => self.consumed += 1,
                ESC => {
                    self.consumed += 1;
                    self.state = InputState::EscapeIntro;
                }
                CR | LF => {
                    echo.extend_from_slice(CRLF.as_bytes());
                    return Ok(Step::Line(self.finish(history)));
                }
                BACKSPACE => {
                    if self.line.pop().is_some() {
                        telnet::erase(1, echo);
                        self.recalled = false;
                        self.consumed = self.consumed.saturating_sub(1);
                    }
                }
                // Reserved for completion.
                TAB => self.consumed += 1,
                _ => {
                    self.line.push(byte);
                    echo.push(byte);
                    self.recalled = false;
                    self.consumed += 1;
                }
            },
        }

        if self.consumed >= MAX_LINE_BYTES {
            self.clear();
            return Err(ConsoleError::LineTooLong(MAX_LINE_BYTES));
        }
        Ok(Step::Pending)
    }

    /// Replace the peer's view of the line with a history entry.
    fn show_recalled(&mut self, entry: String, echo: &mut Vec<u8>) {
        telnet::erase(self.line.len(), echo);
        self.line = entry.into_bytes();
        echo.extend_from_slice(&self.line);
        self.recalled = true;
        self.consumed = self.line.len();
    }

    fn finish(&mut self, history: &mut HistoryBuffer) -> String {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        if self.recalled {
            history.reset_after_recall();
        } else {
            history.commit(&line);
        }
        self.clear();
        line
    }

    fn clear(&mut self) {
        self.line.clear();
        self.recalled = false;
        self.consumed = 0;
    }
}
