fn entity(ch: char) -> Option<&'static str> {
    Some(match ch {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        '\'' => "&apos;",
        _ => return None,
    })
}

/// Escape text for SVG attribute values and text nodes. Runs without markup
/// characters are copied as whole slices.
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    let mut copied = 0;
    for (at, ch) in input.char_indices() {
        if let Some(replacement) = entity(ch) {
            escaped.push_str(&input[copied..at]);
            escaped.push_str(replacement);
            copied = at + ch.len_utf8();
        }
    }
    escaped.push_str(&input[copied..]);
    escaped
}
