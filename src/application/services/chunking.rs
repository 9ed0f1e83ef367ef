/// Largest chunk Telegram accepts with some headroom below its 4096 limit.
pub const MAX_CHUNK_SIZE: usize = 4000;

/// Splits `text` into consecutive slices of at most `max_chars` characters.
///
/// Plain fixed-width cut: no word wrapping, and the slices concatenate back
/// to `text`. An empty text yields no chunks.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}
