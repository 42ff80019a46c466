/// Serializes a display string as template-literal source text.
///
/// Only the backtick delimiter and the `${` expression opener are escaped;
/// raw newlines, quotes and control characters pass through untouched, since
/// the display string is already human-readable text.
pub fn to_template_literal(output: &str) -> String {
    let mut encoded = String::with_capacity(output.len() + 2);
    encoded.push('`');

    let mut chars = output.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '`' => encoded.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                encoded.push_str("\\${");
            }
            other => encoded.push(other),
        }
    }

    encoded.push('`');
    encoded
}

/// Encodes `output` for splicing into a located argument range. When
/// `insertion` is true the range was zero-width, so the literal is prefixed
/// with a comma separator to become a new trailing argument instead of
/// overwriting zero characters.
pub fn encode_argument(output: &str, insertion: bool) -> String {
    let literal = to_template_literal(output);
    if insertion {
        format!(", {literal}")
    } else {
        literal
    }
}
