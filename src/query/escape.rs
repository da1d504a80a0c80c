//! Quoting for identifiers and string literals.

/// Wrap `s` in `quote`, doubling any embedded occurrence of the quote character.
pub fn wrap_doubling(s: &str, quote: char) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push(quote);
    for c in s.chars() {
        if c == quote {
            result.push(quote);
        }
        result.push(c);
    }
    result.push(quote);
    result
}

/// Quote an identifier with backticks: `name` -> `` `name` ``.
#[inline]
pub fn quote_identifier(s: &str) -> String {
    wrap_doubling(s, '`')
}

/// Quote a string literal with double quotes: `it's "x"` -> `"it's ""x"""`.
#[inline]
pub fn quote_string(s: &str) -> String {
    wrap_doubling(s, '"')
}

/// Whether `s` is already a quoted identifier or string.
pub fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('`') && s.ends_with('`')) || (s.starts_with('"') && s.ends_with('"')))
}
