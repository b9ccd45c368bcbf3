//! Text chunking for large documents
//!
//! Paragraphs (blank-line separated blocks) are packed greedily up to the size
//! limit. A paragraph that is too big on its own falls back to sentence
//! boundaries, and a sentence that is still too big is cut at the longest
//! prefix that fits. Every chunk is a trimmed, contiguous slice of the input.

use crate::config::{ExtractorConfig, SizeMetric};
use casebook_domain::Chunk;
use std::collections::VecDeque;
use std::iter::Peekable;
use std::ops::Range;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Measures a candidate chunk
pub type SizeFn = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Splits text into bounded chunks
#[derive(Clone)]
pub struct TextChunker {
    size: SizeFn,
    max_size: usize,
}

impl std::fmt::Debug for TextChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextChunker")
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

impl TextChunker {
    /// Create a chunker measuring with a built-in metric
    pub fn new(metric: SizeMetric, max_size: usize) -> Self {
        Self::with_size_fn(max_size, move |text| metric.measure(text))
    }

    /// Create a chunker with a custom size function
    ///
    /// The function must not shrink when text is appended. A `max_size` of
    /// zero is treated as one.
    pub fn with_size_fn<F>(max_size: usize, size: F) -> Self
    where
        F: Fn(&str) -> usize + Send + Sync + 'static,
    {
        Self {
            size: Arc::new(size),
            max_size: max_size.max(1),
        }
    }

    /// Create a chunker from extractor settings
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.size_metric, config.max_chunk_tokens)
    }

    /// Upper bound on chunk size
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Size of `text` as this chunker measures it
    pub fn measure(&self, text: &str) -> usize {
        (self.size)(text)
    }

    /// Lazily chunk `text`; call again to start over
    pub fn chunk<'a>(&'a self, text: &'a str) -> Chunks<'a> {
        Chunks {
            chunker: self,
            text,
            paragraphs: Paragraphs { text, pos: 0 }.peekable(),
            pending: VecDeque::new(),
            next_index: 0,
        }
    }

    fn fits(&self, text: &str) -> bool {
        self.measure(text) <= self.max_size
    }

    /// Pack the sentences of an oversized paragraph
    fn split_oversized(&self, text: &str, paragraph: Range<usize>) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        let mut current: Option<Range<usize>> = None;

        for (offset, sentence) in text[paragraph.clone()].split_sentence_bound_indices() {
            let start = paragraph.start + offset;
            let range = trimmed_range(text, start..start + sentence.len());
            if range.is_empty() {
                continue;
            }

            if !self.fits(&text[range.clone()]) {
                out.extend(current.take());
                out.extend(self.hard_split(text, range));
                continue;
            }

            current = match current.take() {
                None => Some(range),
                Some(open) => {
                    let candidate = open.start..range.end;
                    if self.fits(&text[candidate.clone()]) {
                        Some(candidate)
                    } else {
                        out.push(open);
                        Some(range)
                    }
                }
            };
        }

        out.extend(current);
        out
    }

    /// Cut at the longest fitting prefix, at least one character at a time
    fn hard_split(&self, text: &str, range: Range<usize>) -> Vec<Range<usize>> {
        let ends: Vec<usize> = text[range.clone()]
            .char_indices()
            .map(|(i, c)| range.start + i + c.len_utf8())
            .collect();

        let mut out = Vec::new();
        let mut start = range.start;
        let mut consumed = 0;

        while consumed < ends.len() {
            let remaining = &ends[consumed..];
            let fitting = remaining.partition_point(|&end| self.fits(&text[start..end]));
            let take = fitting.max(1);
            let end = remaining[take - 1];

            let piece = trimmed_range(text, start..end);
            if !piece.is_empty() {
                out.push(piece);
            }

            start = end;
            consumed += take;
        }

        out
    }
}

/// Lazy iterator over the chunks of one text
#[derive(Clone)]
pub struct Chunks<'a> {
    chunker: &'a TextChunker,
    text: &'a str,
    paragraphs: Peekable<Paragraphs<'a>>,
    pending: VecDeque<Range<usize>>,
    next_index: usize,
}

impl Chunks<'_> {
    fn next_range(&mut self) -> Option<Range<usize>> {
        loop {
            if let Some(range) = self.pending.pop_front() {
                return Some(range);
            }

            let first = self.paragraphs.next()?;
            if !self.chunker.fits(&self.text[first.clone()]) {
                let pieces = self.chunker.split_oversized(self.text, first);
                self.pending.extend(pieces);
                continue;
            }

            let mut current = first;
            while let Some(next_end) = self.paragraphs.peek().map(|p| p.end) {
                let candidate = current.start..next_end;
                if !self.chunker.fits(&self.text[candidate.clone()]) {
                    break;
                }
                current = candidate;
                self.paragraphs.next();
            }
            return Some(current);
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let range = self.next_range()?;
        let chunk = Chunk::new(self.next_index, &self.text[range]);
        self.next_index += 1;
        Some(chunk)
    }
}

/// Trimmed byte ranges of blank-line separated blocks
#[derive(Debug, Clone)]
struct Paragraphs<'a> {
    text: &'a str,
    pos: usize,
}

impl Iterator for Paragraphs<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let mut start = None;
        let mut end = self.pos;

        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
            let line_start = self.pos;
            self.pos += line_len;

            if rest[..line_len].trim().is_empty() {
                if start.is_some() {
                    break;
                }
                continue;
            }

            start.get_or_insert(line_start);
            end = line_start + line_len;
        }

        let start = start?;
        Some(trimmed_range(self.text, start..end))
    }
}

fn trimmed_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let trimmed = slice.trim_start();
    if trimmed.is_empty() {
        return range.start..range.start;
    }
    let start = range.start + (slice.len() - trimmed.len());
    let end = start + trimmed.trim_end().len();
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(chunker: &TextChunker, text: &str) -> Vec<String> {
        chunker.chunk(text).map(|c| c.text).collect()
    }

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_small_text_is_one_chunk() {
        let chunker = TextChunker::new(SizeMetric::Characters, 100);
        let chunks: Vec<Chunk> = chunker.chunk("  Short text here.\n").collect();
        assert_eq!(chunks, vec![Chunk::new(0, "Short text here.")]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        let chunker = TextChunker::new(SizeMetric::Characters, 100);
        assert_eq!(chunker.chunk("").count(), 0);
        assert_eq!(chunker.chunk("  \n\n \t\n").count(), 0);
    }

    #[test]
    fn test_three_paragraphs_under_ten_tokens() {
        let chunker = TextChunker::new(SizeMetric::ApproxTokens, 10);
        let text = "The clerk opens a new claim file.\n\n\
                    The adjuster reviews the claim file.\n\n\
                    The manager approves the final payout.";
        let chunks: Vec<Chunk> = chunker.chunk(text).collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[2].index, 2);
        assert_eq!(chunks[1].text, "The adjuster reviews the claim file.");
    }

    #[test]
    fn test_paragraphs_are_packed_with_separators() {
        let chunker = TextChunker::new(SizeMetric::Characters, 30);
        let text = "First para.\n\nSecond para.\n\n\nThird paragraph here.";
        assert_eq!(
            texts(&chunker, text),
            vec!["First para.\n\nSecond para.", "Third paragraph here."]
        );
    }

    #[test]
    fn test_multi_line_paragraph_stays_together() {
        let chunker = TextChunker::new(SizeMetric::Characters, 100);
        let text = "line one\nline two\n\nline three";
        assert_eq!(texts(&chunker, text), vec![text.to_string()]);
    }

    #[test]
    fn test_oversized_paragraph_splits_on_sentences() {
        let chunker = TextChunker::new(SizeMetric::Characters, 25);
        let text = "One short sentence. Another one here. And a third.";
        let chunks = texts(&chunker, text);

        assert_eq!(
            chunks,
            vec!["One short sentence.", "Another one here.", "And a third."]
        );
    }

    #[test]
    fn test_sentences_are_packed() {
        let chunker = TextChunker::new(SizeMetric::Characters, 40);
        let text = "Alpha. Beta. Gamma. Delta is a much longer sentence now.";
        let chunks = texts(&chunker, text);

        assert_eq!(chunks[0], "Alpha. Beta. Gamma.");
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
    }

    #[test]
    fn test_oversized_sentence_is_hard_split() {
        let chunker = TextChunker::new(SizeMetric::Characters, 20);
        let text = "a".repeat(100);
        let chunks = texts(&chunker, &text);

        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.len() == 20));
    }

    #[test]
    fn test_hard_split_respects_char_boundaries() {
        let chunker = TextChunker::new(SizeMetric::Characters, 3);
        let chunks = texts(&chunker, "ééééééé");
        assert_eq!(chunks, vec!["ééé", "ééé", "é"]);
    }

    #[test]
    fn test_word_metric() {
        let chunker = TextChunker::new(SizeMetric::Words, 4);
        let text = "one two\n\nthree four\n\nfive six seven";
        assert_eq!(
            texts(&chunker, text),
            vec!["one two\n\nthree four", "five six seven"]
        );
    }

    #[test]
    fn test_custom_size_fn() {
        let chunker = TextChunker::with_size_fn(2, |t| t.matches('x').count());
        let chunks = texts(&chunker, "x\n\nx\n\nx");
        assert_eq!(chunks, vec!["x\n\nx", "x"]);
        assert_eq!(chunker.max_size(), 2);
    }

    #[test]
    fn test_zero_max_size_is_clamped() {
        let chunker = TextChunker::new(SizeMetric::Characters, 0);
        assert_eq!(chunker.max_size(), 1);
        assert_eq!(texts(&chunker, "ab"), vec!["a", "b"]);
    }

    #[test]
    fn test_chunking_restarts() {
        let chunker = TextChunker::new(SizeMetric::Characters, 12);
        let text = "First one.\n\nSecond one.";
        let first: Vec<Chunk> = chunker.chunk(text).collect();
        let second: Vec<Chunk> = chunker.chunk(text).collect();
        assert_eq!(first, second);

        let mut iter = chunker.chunk(text);
        let copy = iter.clone();
        iter.next();
        assert_eq!(copy.count(), 2);
    }

    proptest! {
        #[test]
        fn prop_chunks_partition_input(
            text in "[a-z .!?\n]{0,400}",
            max in 1usize..60,
        ) {
            let chunker = TextChunker::new(SizeMetric::Characters, max);
            let joined: String = chunker.chunk(&text).map(|c| c.text).collect();
            prop_assert_eq!(non_whitespace(&joined), non_whitespace(&text));
        }

        #[test]
        fn prop_chunks_respect_size_bound(
            text in "[a-zé .\n]{0,400}",
            max in 1usize..40,
        ) {
            let chunker = TextChunker::new(SizeMetric::ApproxTokens, max);
            for (i, chunk) in chunker.chunk(&text).enumerate() {
                prop_assert_eq!(chunk.index, i);
                prop_assert!(!chunk.text.is_empty());
                prop_assert_eq!(chunk.text.trim(), chunk.text.as_str());
                prop_assert!(
                    chunker.measure(&chunk.text) <= max || chunk.text.chars().count() == 1
                );
            }
        }
    }
}
