//! Outbound length limits and chunking.
//!
//! Telegram rejects messages over 4096 characters. Oversized text is split
//! on fixed 4000-character boundaries (headroom below the hard ceiling).
//! Splitting is purely length-based; fragments are sent independently and
//! in order.

/// Hard platform ceiling per message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Chunk size used when re-splitting oversized text.
pub const CHUNK_SIZE: usize = 4000;

/// Split `text` into an ordered sequence of sendable fragments.
///
/// Text at or under [`MESSAGE_LIMIT`] passes through as a single fragment.
/// Counts characters, not bytes, so multi-byte text never splits inside a
/// code point. Empty input yields no fragments.
pub fn split_message(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= MESSAGE_LIMIT {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(CHUNK_SIZE)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_fragment() {
        let parts = split_message("hello");
        assert_eq!(parts, vec!["hello".to_string()]);
    }

    #[test]
    fn test_empty_text_has_no_fragments() {
        assert!(split_message("").is_empty());
    }

    #[test]
    fn test_text_at_limit_is_not_split() {
        let text = "a".repeat(MESSAGE_LIMIT);
        let parts = split_message(&text);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_text_over_limit_splits_on_chunk_size() {
        let text = "a".repeat(MESSAGE_LIMIT + 1);
        let parts = split_message(&text);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].chars().count(), CHUNK_SIZE);
        assert_eq!(parts[1].chars().count(), MESSAGE_LIMIT + 1 - CHUNK_SIZE);
    }

    #[test]
    fn test_round_trip_reproduces_input() {
        let text = "xyz".repeat(5000);
        let parts = split_message(&text);
        assert!(parts.len() > 1);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_every_fragment_within_limit_and_non_empty() {
        let text = "q".repeat(3 * CHUNK_SIZE + 17);
        for part in split_message(&text) {
            let len = part.chars().count();
            assert!(len > 0);
            assert!(len <= MESSAGE_LIMIT);
        }
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        // 4 bytes per char; byte-indexed slicing would panic here
        let text = "\u{1F600}".repeat(CHUNK_SIZE + 100);
        let parts = split_message(&text);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.concat(), text);
        assert_eq!(parts[0].chars().count(), CHUNK_SIZE);
    }
}
