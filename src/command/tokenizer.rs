//! Quote-aware splitting of a console line into arguments.

const SPACE: char = ' ';
const QUOTE: char = '"';

/// Split a console line into tokens.
///
/// The line is trimmed first. Tokens are separated by runs of spaces, except
/// inside double quotes, where the quoted text (quotes removed) forms a single
/// token. An unterminated quote runs to the end of the line.
///
/// A blank line yields a single empty token so the dispatcher can tell
/// "enter on an empty prompt" apart from a line that produced nothing, such
/// as `""`.
pub fn split_line(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            QUOTE => {
                // Both an opening and a closing quote end whatever came before.
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = !quoted;
            }
            SPACE if !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
