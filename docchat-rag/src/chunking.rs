//! Document chunking.
//!
//! [`RecursiveChunker`] cuts text into overlapping windows whose ends are
//! pulled back to the strongest nearby boundary: paragraph, line, sentence,
//! then word. Every chunk is an exact substring of the document and records
//! its character offset, so the document can be rebuilt from its chunks by
//! dropping the overlapping prefixes.

use chrono::NaiveDate;

use crate::config::RagConfig;
use crate::document::{Chunk, DocumentMeta, TEXT_PLAIN, UploadedFile};
use crate::error::{RagError, Result};

/// Boundaries tried when ending a window, strongest first.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// A piece of text and its character offset in the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Offset of the first character, counted in `char`s.
    pub start: usize,
    /// The span's text.
    pub text: String,
}

/// A strategy for splitting document text into chunks.
pub trait Chunker: Send + Sync {
    /// Split text into spans ordered by offset. Returns an empty `Vec` for empty text.
    fn split(&self, text: &str) -> Vec<TextSpan>;

    /// Split text and wrap every span in an unembedded [`Chunk`] carrying `meta`.
    fn chunk(&self, meta: &DocumentMeta, text: &str) -> Vec<Chunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(i, span)| Chunk::new(meta, span.text, i, span.start))
            .collect()
    }
}

/// Splits text into windows of at most `chunk_size` characters that overlap
/// by at most `chunk_overlap` characters.
///
/// A window ends after the last separator found in its second half, trying
/// `"\n\n"`, `"\n"`, `". "`, `"! "`, `"? "` and `" "` in that order, and is
/// cut hard when none is present. The next window starts `chunk_overlap`
/// characters before that end, moved forward to a word start when the
/// overlap contains one. Once the rest of the text fits in a single window,
/// the last window is aligned to the end of the text.
///
/// # Example
///
/// ```rust
/// use docchat_rag::{Chunker, RecursiveChunker};
///
/// let chunker = RecursiveChunker::new(1200, 600);
/// let spans = chunker.split(&"a".repeat(2500));
/// let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
/// assert_eq!(starts, [0, 600, 1300]);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// `chunk_size` is raised to at least 1 and `chunk_overlap` is capped
    /// below `chunk_size` so that every window makes progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self { chunk_size, chunk_overlap: chunk_overlap.min(chunk_size - 1) }
    }

    /// Create a chunker using the sizes from `config`.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Find where the window starting at `start` ends. Requires `start + chunk_size < n`.
    fn window_end(&self, text: &str, bounds: &[usize], start: usize) -> usize {
        let hi = start + self.chunk_size;
        let lo = start + (self.chunk_overlap + 1).max(self.chunk_size / 2);
        if lo >= hi {
            return hi;
        }

        let window = &text[bounds[lo]..bounds[hi]];
        for separator in SEPARATORS {
            if let Some(pos) = window.rfind(separator) {
                let byte_end = bounds[lo] + pos + separator.len();
                return char_index(bounds, byte_end);
            }
        }
        hi
    }
}

/// Byte offset of every char, plus the total length as a final entry.
fn char_bounds(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect()
}

fn char_index(bounds: &[usize], byte: usize) -> usize {
    match bounds.binary_search(&byte) {
        Ok(i) | Err(i) => i,
    }
}

/// Move `from` forward to the first word start before `limit`, or keep it.
fn word_start(text: &str, bounds: &[usize], from: usize, limit: usize) -> usize {
    if from == 0 {
        return 0;
    }
    let preceded_by_space =
        |i: usize| text[bounds[i - 1]..bounds[i]].chars().all(char::is_whitespace);
    (from..limit).find(|&i| preceded_by_space(i)).unwrap_or(from)
}

impl Chunker for RecursiveChunker {
    fn split(&self, text: &str) -> Vec<TextSpan> {
        if text.is_empty() {
            return Vec::new();
        }

        let bounds = char_bounds(text);
        let n = bounds.len() - 1;
        let span = |start: usize, end: usize| TextSpan {
            start,
            text: text[bounds[start]..bounds[end]].to_string(),
        };

        let mut spans = Vec::new();
        let mut start = 0;
        loop {
            if n - start <= self.chunk_size {
                spans.push(span(start, n));
                break;
            }

            let end = self.window_end(text, &bounds, start);
            spans.push(span(start, end));

            let next = end - self.chunk_overlap;
            if n - end <= self.chunk_size {
                let last = word_start(text, &bounds, next.max(n - self.chunk_size), end);
                spans.push(span(last, n));
                break;
            }
            start = word_start(text, &bounds, next, end);
        }
        spans
    }
}

/// Turn one uploaded file into chunks for `partition_key`.
///
/// Every chunk gets a fresh id and shares one freshly generated `doc_id`.
/// `today` is used when the upload carries no date.
///
/// # Errors
///
/// Returns [`RagError::DecodeError`] when the mime type is not `text/plain`
/// or the bytes are not valid UTF-8.
pub fn split_upload(
    chunker: &dyn Chunker,
    file: &UploadedFile,
    partition_key: &str,
    today: NaiveDate,
) -> Result<Vec<Chunk>> {
    let essence = file.mime_type.split(';').next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case(TEXT_PLAIN) {
        return Err(RagError::DecodeError {
            file: file.name.clone(),
            message: format!("unsupported mime type '{}'", file.mime_type),
        });
    }

    let text = std::str::from_utf8(&file.bytes).map_err(|e| RagError::DecodeError {
        file: file.name.clone(),
        message: format!("not valid UTF-8: {e}"),
    })?;

    let meta = DocumentMeta::new(
        partition_key,
        &file.name,
        file.bytes.len() as u64,
        file.date.unwrap_or(today),
    );
    Ok(chunker.chunk(&meta, text))
}
