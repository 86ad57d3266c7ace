//! Text helpers for terminal output
//!
//! Session logs contain whatever tools printed, including color codes and
//! screen-control sequences. Every command that prints record text or project
//! metadata passes it through [`strip_ansi_codes`] first.

/// Removes ANSI CSI sequences and control characters from log text
///
/// # Examples
///
/// ```
/// use ai_history_search::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
///
/// Tab, newline and carriage return survive; every other control character
/// (bell, backspace, a lone ESC) is dropped.
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            // CSI: ESC [ params... final letter
            '\x1b' if chars.peek() == Some(&'[') => {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            '\t' | '\n' | '\r' => result.push(ch),
            c if c.is_control() => {}
            c => result.push(c),
        }
    }

    result
}

/// Truncate to at most `max_chars` characters, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Truncate for display, marking the cut with `...`
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    let truncated = truncate_chars(text, max_chars);
    if truncated.len() < text.len() { format!("{}...", truncated) } else { truncated }
}
