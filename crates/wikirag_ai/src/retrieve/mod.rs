use wikirag_core::domain::{KnowledgeBase, ScoredChunk};
use wikirag_core::error::AppError;

use crate::embeddings::Embedder;

mod similarity;

pub use similarity::{cosine_similarity, l2_norm, rank_top_k};

/// Ranks knowledge-base chunks against a query by embedding cosine similarity.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    model: String,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder, model: impl Into<String>) -> Self {
        Self {
            embedder,
            model: model.into(),
        }
    }

    /// The `min(k, |kb|)` chunks most similar to `query`, best first.
    ///
    /// Ties keep knowledge-base order. A zero embedding scores 0 against
    /// anything, so a zero query vector ranks chunks in knowledge-base order.
    /// The knowledge base must not be empty.
    pub fn top_k(
        &self,
        query: &str,
        kb: &KnowledgeBase,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, AppError> {
        let q = query.trim();
        if q.is_empty() {
            return Err(AppError::new("AI_RETRIEVAL_FAILED", "Query must not be empty"));
        }
        if kb.is_empty() {
            return Err(AppError::new(
                "AI_RETRIEVAL_FAILED",
                "Knowledge base must not be empty",
            ));
        }

        let vectors = self
            .embedder
            .embed_batch(&self.model, &kb.texts())
            .map_err(|e| wrap_embed_error("Failed to embed knowledge base", e))?;
        if vectors.len() != kb.len() {
            return Err(AppError::new(
                "AI_EMBEDDINGS_FAILED",
                "Embedder returned the wrong number of vectors",
            )
            .with_details(format!("chunks={}; vectors={}", kb.len(), vectors.len())));
        }

        let qv = self
            .embedder
            .embed(&self.model, q)
            .map_err(|e| wrap_embed_error("Failed to embed query", e))?;
        let qnorm = l2_norm(&qv);
        if qnorm == 0.0 {
            tracing::debug!("query embedding norm is zero; every chunk scores 0");
        }

        let mut scores = Vec::with_capacity(vectors.len());
        for (idx, v) in vectors.iter().enumerate() {
            if v.len() != qv.len() {
                return Err(AppError::new(
                    "AI_RETRIEVAL_FAILED",
                    "Chunk embedding dims do not match query dims",
                )
                .with_details(format!("index={idx}; expected={}; got={}", qv.len(), v.len())));
            }
            let vnorm = l2_norm(v);
            let score = if qnorm == 0.0 || vnorm == 0.0 {
                0.0
            } else {
                cosine_similarity(&qv, v, qnorm, vnorm)
            };
            scores.push(score);
        }

        let ranked = rank_top_k(&scores, k)
            .into_iter()
            .filter_map(|index| {
                kb.get(index).map(|chunk| ScoredChunk {
                    index,
                    score: scores[index],
                    chunk: chunk.clone(),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            candidates = kb.len(),
            returned = ranked.len(),
            best = ?ranked.first().map(|h| h.score),
            "ranked chunks"
        );
        Ok(ranked)
    }
}

fn wrap_embed_error(message: &str, e: AppError) -> AppError {
    AppError::new("AI_EMBEDDINGS_FAILED", message)
        .with_details(e.to_string())
        .with_retryable(e.retryable)
}
