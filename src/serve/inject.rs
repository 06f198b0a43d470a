//! Live-update script injection into HTML responses.

/// Inject `tag` before the last `</body>`, or append when there is none.
pub fn inject_before_body_end(content: &[u8], tag: &str) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let mut result = Vec::with_capacity(content.len() + tag.len());
    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            result.extend_from_slice(&content[..pos]);
            result.extend_from_slice(tag.as_bytes());
            result.extend_from_slice(&content[pos..]);
        }
        // browsers cope with a trailing script
        None => {
            result.extend_from_slice(content);
            result.extend_from_slice(tag.as_bytes());
        }
    }
    result
}
