use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, Document};

/// Boundaries a cut may land on, most preferred first.
#[derive(Debug, Clone, Copy)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Whitespace,
}

const BOUNDARY_PRIORITY: [Boundary; 4] = [
    Boundary::Paragraph,
    Boundary::Line,
    Boundary::Sentence,
    Boundary::Whitespace,
];

const SENTENCE_TERMINATORS: [char; 8] = ['.', '!', '?', ';', '。', '！', '？', '；'];

/// A piece of a page produced by [`RecursiveCharacterSplitter::split_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Offset of the first character, in Unicode scalar values.
    pub offset: usize,
    pub text: String,
}

/// Splits text into windows of at most `chunk_size` characters. Each window
/// after the first starts `chunk_overlap` characters before the end of the
/// previous one, so dropping that prefix from every later chunk gives back
/// the input exactly.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, TextSplitterError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(TextSplitterError::InvalidParameters {
                chunk_size,
                chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split_text(&self, text: &str) -> Vec<TextSpan> {
        let chars: Vec<char> = text.chars().collect();
        let total_len = chars.len();
        let mut spans = Vec::new();

        if total_len == 0 {
            return spans;
        }

        let mut start = 0;
        loop {
            if total_len - start <= self.chunk_size {
                spans.push(TextSpan {
                    offset: start,
                    text: chars[start..].iter().collect(),
                });
                return spans;
            }

            let end = self.find_cut(&chars, start);
            spans.push(TextSpan {
                offset: start,
                text: chars[start..end].iter().collect(),
            });
            start = end - self.chunk_overlap;
        }
    }

    /// Picks the end of the window starting at `start`. Candidates are limited
    /// to the second half of the window and always lie past the overlap, so
    /// the next window starts strictly after `start`.
    fn find_cut(&self, chars: &[char], start: usize) -> usize {
        let window_end = start + self.chunk_size;
        let earliest = start + (self.chunk_size / 2).max(self.chunk_overlap + 1);

        for boundary in BOUNDARY_PRIORITY {
            if let Some(cut) = (earliest..=window_end)
                .rev()
                .find(|&cut| ends_with_boundary(chars, cut, boundary))
            {
                return cut;
            }
        }

        window_end
    }
}

fn ends_with_boundary(chars: &[char], cut: usize, boundary: Boundary) -> bool {
    let last = chars[cut - 1];
    match boundary {
        Boundary::Paragraph => cut >= 2 && last == '\n' && chars[cut - 2] == '\n',
        Boundary::Line => last == '\n',
        Boundary::Sentence => SENTENCE_TERMINATORS.contains(&last),
        Boundary::Whitespace => last.is_whitespace(),
    }
}

#[async_trait]
impl TextSplitter for RecursiveCharacterSplitter {
    async fn split(&self, document: &Document) -> Result<Vec<Chunk>, TextSplitterError> {
        let mut chunks = Vec::new();

        for page in &document.pages {
            for span in self.split_text(&page.text) {
                chunks.push(Chunk::new(
                    span.text,
                    document.id(),
                    document.filename(),
                    Some(page.number),
                    span.offset,
                ));
            }
        }

        Ok(chunks)
    }
}
