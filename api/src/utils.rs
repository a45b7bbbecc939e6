pub const PREVIEW_CHARS: usize = 500;

/// First `max_chars` characters of `text`, never splitting a character.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
