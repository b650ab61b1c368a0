use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A bounded window of words taken from one source paragraph.
///
/// Chunks are never empty: the only constructors are the chunker and
/// [`Chunk::new`], which rejects blank text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Chunk(String);

impl TryFrom<String> for Chunk {
    type Error = AppError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Chunk::new(text).ok_or_else(|| AppError::new("CHUNK_EMPTY", "Chunk text must not be blank"))
    }
}

impl From<Chunk> for String {
    fn from(chunk: Chunk) -> Self {
        chunk.0
    }
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self(text))
    }

    /// Caller guarantees `text` is non-blank.
    pub(crate) fn from_words(text: String) -> Self {
        debug_assert!(!text.trim().is_empty());
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Every chunk gathered for one query, in source article order.
///
/// No de-duplication is performed. An empty knowledge base is a valid state and
/// means the source had nothing usable for the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(Chunk::as_str).collect()
    }
}

impl From<Vec<Chunk>> for KnowledgeBase {
    fn from(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }
}

impl Extend<Chunk> for KnowledgeBase {
    fn extend<T: IntoIterator<Item = Chunk>>(&mut self, iter: T) {
        self.chunks.extend(iter);
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

/// A knowledge-base chunk with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Position of the chunk in the knowledge base it was ranked from.
    pub index: usize,
    pub score: f32,
    pub chunk: Chunk,
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    /// The exact context string handed to the generator (empty when nothing was found).
    pub context: String,
    pub confidence: f32,
}

impl AnswerResult {
    pub fn no_context(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            context: String::new(),
            confidence: 0.0,
        }
    }
}
