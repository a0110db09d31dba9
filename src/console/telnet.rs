//! Telnet and ANSI byte values used by the console.

pub const NUL: u8 = 0;
pub const BACKSPACE: u8 = 8;
pub const TAB: u8 = b'\t';
pub const LF: u8 = b'\n';
pub const CR: u8 = b'\r';
pub const ESC: u8 = 27;
/// Second byte of an ANSI CSI sequence (`ESC [`).
pub const CSI_BRACKET: u8 = b'[';

pub const KEY_UP: u8 = b'A';
pub const KEY_DOWN: u8 = b'B';
pub const KEY_RIGHT: u8 = b'C';
pub const KEY_LEFT: u8 = b'D';

/// Interpret As Command: the telnet control introducer.
pub const IAC: u8 = 255;
pub const WILL: u8 = 251;
pub const OPT_ECHO: u8 = 1;
pub const OPT_SUPPRESS_GO_AHEAD: u8 = 3;

/// Bytes following IAC that are skipped as one option negotiation.
pub const NEGOTIATION_LEN: usize = 2;

pub const CRLF: &str = "\r\n";
pub const PROMPT: &str = "->";

/// Announcements sent right after accept: the server suppresses go-ahead and
/// does its own echo, which puts most clients into character mode.
pub const SERVER_WILL: [u8; 6] = [
    IAC,
    WILL,
    OPT_SUPPRESS_GO_AHEAD,
    IAC,
    WILL,
    OPT_ECHO,
];

/// Erase `n` characters left of the cursor: move left, blank them, move back.
pub fn erase(n: usize, out: &mut Vec<u8>) {
    if n == 0 {
        return;
    }
    let left = format!("\x1b[{n}D");
    out.extend_from_slice(left.as_bytes());
    out.extend(std::iter::repeat_n(b' ', n));
    out.extend_from_slice(left.as_bytes());
}
