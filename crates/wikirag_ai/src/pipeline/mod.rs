use wikirag_core::config::PipelineConfig;
use wikirag_core::context::assemble_context;
use wikirag_core::domain::AnswerResult;
use wikirag_core::error::AppError;

use crate::embeddings::Embedder;
use crate::generate::{AnswerModel, Generator};
use crate::knowledge::{KnowledgeFetcher, KnowledgeSource};
use crate::retrieve::Retriever;

/// End-to-end question answering: fetch, rank, assemble, generate.
///
/// Capabilities are borrowed so that expensive clients are built once per
/// process and shared by every `run`. Each run is independent; nothing is
/// cached between queries.
pub struct RagPipeline<'a> {
    fetcher: KnowledgeFetcher<'a>,
    retriever: Retriever<'a>,
    generator: Generator<'a>,
    config: PipelineConfig,
}

impl<'a> RagPipeline<'a> {
    pub fn new(
        source: &'a dyn KnowledgeSource,
        embedder: &'a dyn Embedder,
        embed_model: impl Into<String>,
        answerer: &'a dyn AnswerModel,
        config: PipelineConfig,
    ) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            fetcher: KnowledgeFetcher::new(source, &config)?,
            retriever: Retriever::new(embedder, embed_model),
            generator: Generator::new(answerer),
            config,
        })
    }

    /// Answer `query` from freshly fetched knowledge.
    ///
    /// `top_k` overrides the configured value for this call and must be at
    /// least 1. When the source
    /// yields nothing, returns the configured no-context answer with an empty
    /// context and zero confidence without touching the models. Retrieval and
    /// generation errors are returned to the caller as-is.
    pub fn run(&self, query: &str, top_k: Option<usize>) -> Result<AnswerResult, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::new("RAG_QUERY_EMPTY", "Query must not be empty"));
        }
        let top_k = top_k.unwrap_or(self.config.top_k);
        if top_k == 0 {
            return Err(AppError::new("CONFIG_INVALID", "top_k must be at least 1"));
        }

        let report = self.fetcher.fetch(query);
        if report.knowledge_base.is_empty() {
            tracing::info!(
                search_failed = report.search_failed,
                articles = report.outcomes.len(),
                "no context found"
            );
            return Ok(AnswerResult::no_context(self.config.no_context_answer.clone()));
        }

        let ranked = self.retriever.top_k(query, &report.knowledge_base, top_k)?;
        let context = assemble_context(&ranked, self.config.max_context_length);
        let (answer, confidence) = self.generator.answer(query, &context)?;

        tracing::info!(
            chunks = report.knowledge_base.len(),
            used = ranked.len(),
            context_chars = context.chars().count(),
            confidence,
            "answered query"
        );
        Ok(AnswerResult {
            answer,
            context,
            confidence,
        })
    }

    /// Answer text only, for callers that do not show context or confidence.
    pub fn ask(&self, query: &str) -> Result<String, AppError> {
        self.run(query, None).map(|r| r.answer)
    }
}
