//! Tokenizer for IPPcode22 source lines.

/// Split a line into whitespace-separated words.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `#` and extend to end of line.
pub(crate) fn tokenize_line(line: &str) -> Vec<&str> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.split_whitespace().collect()
}
