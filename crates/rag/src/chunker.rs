//! Paragraph-aware text chunking.

use std::mem;

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_OVERLAP: usize = 120;

/// Split `text` into chunks of at most `chunk_size` characters.
///
/// Non-empty paragraphs are packed greedily, joined by `\n`. A packed chunk
/// that still exceeds `chunk_size` (one huge paragraph) is cut into windows
/// of `chunk_size` characters, consecutive windows sharing `overlap`
/// characters. Sizes are counted in `char`s.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let text = text.replace('\r', "");

    let mut packed = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for paragraph in text.split('\n').map(str::trim).filter(|p| !p.is_empty()) {
        let len = paragraph.chars().count();
        if buf_len + len + 1 <= chunk_size {
            if !buf.is_empty() {
                buf.push('\n');
                buf_len += 1;
            }
            buf.push_str(paragraph);
            buf_len += len;
        } else {
            if !buf.is_empty() {
                packed.push(mem::take(&mut buf));
            }
            buf.push_str(paragraph);
            buf_len = len;
        }
    }
    if !buf.is_empty() {
        packed.push(buf);
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::with_capacity(packed.len());
    for chunk in packed {
        let chars: Vec<char> = chunk.chars().collect();
        if chars.len() <= chunk_size {
            chunks.push(chunk);
            continue;
        }

        let mut start = 0;
        while start < chars.len() {
            let end = (start + chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            start += step;
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_paragraphs_are_packed_together() {
        let chunks = split_text("first line\r\n\n  second line  \nthird", 800, 120);
        assert_eq!(chunks, vec!["first line\nsecond line\nthird"]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert!(split_text("", 800, 120).is_empty());
        assert!(split_text("\n \n\t\n", 800, 120).is_empty());
    }

    #[test]
    fn test_buffer_is_flushed_when_full() {
        let a = "a".repeat(6);
        let b = "b".repeat(4);
        let c = "c".repeat(3);
        let text = format!("{}\n{}\n{}", a, b, c);

        // 6 + 4 + 1 = 11 > 10, so `b` starts a new chunk; 4 + 3 + 1 = 8 fits.
        let chunks = split_text(&text, 10, 2);
        assert_eq!(chunks, vec![a, format!("{}\n{}", b, c)]);
    }

    #[test]
    fn test_paragraph_of_exactly_chunk_size() {
        let p = "x".repeat(10);
        let chunks = split_text(&p, 10, 2);
        assert_eq!(chunks, vec![p]);
    }

    #[test]
    fn test_huge_paragraph_is_windowed_with_overlap() {
        let text = "a".repeat(2000);
        let chunks = split_text(&text, 800, 120);
        let lens: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lens, vec![800, 800, 640]);
    }

    #[test]
    fn test_window_ending_at_text_end_still_emits_tail() {
        let text = "x".repeat(1480);
        let chunks = split_text(&text, 800, 120);
        let lens: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lens, vec![800, 800, 120]);
    }

    #[test]
    fn test_windows_share_overlap() {
        let text: String = ('a'..='z').collect();
        let chunks = split_text(&text, 10, 4);
        assert_eq!(chunks[0], "abcdefghij");
        assert_eq!(chunks[1], "ghijklmnop");
        assert!(chunks[1].starts_with(&chunks[0][6..]));
        assert_eq!(chunks[3], "stuvwxyz");
        assert_eq!(chunks.last().unwrap(), "yz");
        assert_eq!(chunks.len(), 5);
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let text = "é".repeat(15);
        let chunks = split_text(&text, 10, 0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 10);
        assert_eq!(chunks[1].chars().count(), 5);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_still_terminates() {
        let chunks = split_text(&"z".repeat(5), 2, 5);
        assert_eq!(chunks.len(), 5);
    }
}
