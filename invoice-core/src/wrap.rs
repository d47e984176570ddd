//! Greedy word wrapping for table cells.
//!
//! The wrapper is measurement-driven: it never looks at font data itself,
//! only at a caller-supplied width function, so the same code serves any
//! face and size. Tokens are words plus standalone breakable punctuation;
//! a token wider than the whole column is emergency-split character by
//! character, which guarantees progress for pathological unbroken strings
//! such as long URLs.

/// Width kept free at the end of every line, in the measure's units.
pub const WRAP_SAFETY: f64 = 0.5;

/// Punctuation the wrapper may break after, kept as standalone tokens.
const BREAKABLE: [char; 5] = ['-', ',', '/', ';', ':'];

/// Split `text` into tokens: maximal runs of ordinary characters, with
/// every whitespace or breakable-punctuation character as its own token.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() || BREAKABLE.contains(&ch) {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Wrap `text` into lines that each measure at most `max_width`.
///
/// Tokens accumulate greedily; a token that would push the line past
/// `max_width − WRAP_SAFETY` closes the line and starts the next one
/// (with leading whitespace stripped). Always returns at least one line;
/// empty input yields a single empty line.
pub fn wrap<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let limit = max_width - WRAP_SAFETY;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for token in tokenize(text) {
        let mut candidate = current.clone();
        candidate.push_str(&token);
        if measure(&candidate) <= limit {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(current.trim_end().to_string());
            current.clear();
        }

        // Fresh line: drop whitespace, place the token, splitting it
        // character by character if it cannot fit on a line of its own.
        let token = token.trim_start();
        if token.is_empty() {
            continue;
        }
        if measure(token) <= limit {
            current.push_str(token);
        } else {
            for ch in token.chars() {
                let mut with_ch = current.clone();
                with_ch.push(ch);
                if current.is_empty() || measure(&with_ch) <= limit {
                    current = with_ch;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}
