use crate::domain::ScoredChunk;

/// Join ranked chunks into the context string handed to the generator.
///
/// Order is preserved exactly (best match first) and chunks are separated by a
/// single space. When `max_chars` is set the result is cut to at most that many
/// characters, never splitting a UTF-8 sequence.
pub fn assemble_context(ranked: &[ScoredChunk], max_chars: Option<usize>) -> String {
    let joined = ranked
        .iter()
        .map(|hit| hit.chunk.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    match max_chars {
        Some(limit) => truncate_chars(&joined, limit).to_string(),
        None => joined,
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// First `max_chars` characters with a trailing ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Chunk;
    use pretty_assertions::assert_eq;

    fn hit(index: usize, text: &str) -> ScoredChunk {
        ScoredChunk {
            index,
            score: 0.5,
            chunk: Chunk::new(text).unwrap(),
        }
    }

    #[test]
    fn joins_in_ranked_order_with_single_spaces() {
        let ranked = vec![hit(2, "second source"), hit(0, "first source")];
        assert_eq!(assemble_context(&ranked, None), "second source first source");
        assert_eq!(assemble_context(&[], None), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let ranked = vec![hit(0, "héllo wörld")];
        assert_eq!(assemble_context(&ranked, Some(4)), "héll");
        assert_eq!(assemble_context(&ranked, Some(100)), "héllo wörld");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn preview_marks_cut_text() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }
}
