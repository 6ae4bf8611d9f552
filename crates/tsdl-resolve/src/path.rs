//! # Reference Tokenizer
//!
//! Splits a dotted reference such as `stream.packet.context.len` into its
//! tokens. Every token must be non-empty: a leading, trailing or doubled
//! dot is a syntax error reported with the byte offset of the empty token.

use crate::error::PathSyntaxError;

/// Split `path` on `.`.
///
/// # Errors
///
/// Returns [`PathSyntaxError`] if `path` is empty or any token is empty.
pub fn tokenize(path: &str) -> Result<Vec<&str>, PathSyntaxError> {
    let mut tokens = Vec::new();
    let mut position = 0;
    for token in path.split('.') {
        if token.is_empty() {
            return Err(PathSyntaxError {
                path: path.to_owned(),
                position,
            });
        }
        tokens.push(token);
        position += token.len() + 1;
    }
    Ok(tokens)
}
