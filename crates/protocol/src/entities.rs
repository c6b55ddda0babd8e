//! HTML entity unescaping for clue text.
//!
//! The puzzle source escapes quotes and ampersands before they reach the
//! wire. Only the three entities the source produces are recognised.

const ENTITIES: &[(&str, &str)] = &[("&quot;", "\""), ("&#39;", "'"), ("&amp;", "&")];

/// Replace `&quot;`, `&#39;` and `&amp;` with the characters they stand for.
///
/// Scans left to right so `&amp;quot;` becomes `&quot;`, not `"`.
pub fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
