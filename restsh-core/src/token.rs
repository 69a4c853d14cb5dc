//! Quote-aware tokenizer for command lines.

use crate::error::{Error, Result};

/// Characters that can open and close a quoted region.
const QUOTE_CHARS: [char; 3] = ['\'', '"', '`'];

/// Split a line into argument tokens.
///
/// Tokens are separated by single spaces, but a segment that begins with
/// `'`, `"` or a backtick opens a quoted region that keeps absorbing
/// segments until one ends with the same quote character. The quote
/// characters are stripped from the finished token; the content is passed
/// through otherwise unmodified (no escape processing). Empty tokens from
/// consecutive spaces are dropped.
///
/// A line that ends while a quoted region is still open is rejected with
/// [`Error::Tokenize`] and yields no tokens at all. Both the interactive
/// loop and the replay engine tokenize their lines through this function.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut quote: Option<char> = None;
    let mut block = String::new();

    for seg in line.split(' ') {
        match quote {
            None => match seg.chars().next().filter(|c| QUOTE_CHARS.contains(c)) {
                Some(q) if seg.ends_with(q) => {
                    push_token(&mut tokens, seg.trim_matches(q));
                }
                Some(q) => {
                    quote = Some(q);
                    block.push_str(seg.trim_start_matches(q));
                    block.push(' ');
                }
                None => push_token(&mut tokens, seg),
            },
            Some(q) => {
                if seg.ends_with(q) {
                    block.push_str(seg);
                    push_token(&mut tokens, block.trim_matches(q));
                    block.clear();
                    quote = None;
                } else {
                    block.push_str(seg);
                    block.push(' ');
                }
            }
        }
    }

    if quote.is_some() {
        return Err(Error::Tokenize);
    }
    Ok(tokens)
}

fn push_token(tokens: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        tokens.push(trimmed.to_string());
    }
}
