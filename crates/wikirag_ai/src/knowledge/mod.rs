use serde::{Deserialize, Serialize};
use wikirag_core::chunking::{split_paragraphs, ChunkWindow};
use wikirag_core::config::PipelineConfig;
use wikirag_core::domain::KnowledgeBase;
use wikirag_core::error::AppError;

pub mod wikipedia;

/// An external corpus that can be searched by term and read by title.
///
/// `fetch_article` reports per-title problems through error codes:
/// `SOURCE_AMBIGUOUS` for disambiguation pages, `SOURCE_NOT_FOUND` for missing
/// pages and `SOURCE_FETCH_FAILED` for everything else.
pub trait KnowledgeSource {
    fn search(&self, term: &str, limit: usize) -> Result<Vec<String>, AppError>;
    fn fetch_article(&self, title: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Ambiguous,
    NotFound,
    FetchFailed,
}

impl SkipReason {
    pub fn from_error(err: &AppError) -> Self {
        match err.code.as_str() {
            "SOURCE_AMBIGUOUS" => SkipReason::Ambiguous,
            "SOURCE_NOT_FOUND" => SkipReason::NotFound,
            _ => SkipReason::FetchFailed,
        }
    }
}

/// What happened to one search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArticleOutcome {
    Fetched {
        title: String,
        paragraphs: usize,
        chunks: usize,
    },
    Skipped {
        title: String,
        reason: SkipReason,
        detail: String,
    },
}

impl ArticleOutcome {
    pub fn title(&self) -> &str {
        match self {
            ArticleOutcome::Fetched { title, .. } | ArticleOutcome::Skipped { title, .. } => title,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ArticleOutcome::Skipped { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub knowledge_base: KnowledgeBase,
    pub outcomes: Vec<ArticleOutcome>,
    /// The search call itself failed; `knowledge_base` is empty.
    pub search_failed: bool,
}

impl FetchReport {
    pub fn skipped(&self) -> impl Iterator<Item = &ArticleOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }
}

/// Builds a knowledge base for a query from a [`KnowledgeSource`].
///
/// Never fails once constructed: search failures degrade to an empty
/// knowledge base and per-article failures are recorded as skipped outcomes.
pub struct KnowledgeFetcher<'a> {
    source: &'a dyn KnowledgeSource,
    window: ChunkWindow,
    max_articles: usize,
    min_paragraph_length: usize,
}

impl<'a> KnowledgeFetcher<'a> {
    pub fn new(source: &'a dyn KnowledgeSource, config: &PipelineConfig) -> Result<Self, AppError> {
        Ok(Self {
            source,
            window: config.chunk_window()?,
            max_articles: config.max_articles,
            min_paragraph_length: config.min_paragraph_length,
        })
    }

    pub fn fetch(&self, query: &str) -> FetchReport {
        let titles = match self.source.search(query, self.max_articles) {
            Ok(titles) => titles,
            Err(e) => {
                tracing::warn!(error = %e, "knowledge search failed; continuing without context");
                return FetchReport {
                    search_failed: true,
                    ..FetchReport::default()
                };
            }
        };
        tracing::debug!(count = titles.len(), "search returned titles");

        let mut report = FetchReport::default();
        for title in titles.into_iter().take(self.max_articles) {
            let outcome = match self.source.fetch_article(&title) {
                Ok(content) => {
                    let paragraphs = split_paragraphs(&content, self.min_paragraph_length);
                    let before = report.knowledge_base.len();
                    for p in paragraphs.iter() {
                        report.knowledge_base.extend(self.window.split(p));
                    }
                    ArticleOutcome::Fetched {
                        title,
                        paragraphs: paragraphs.len(),
                        chunks: report.knowledge_base.len() - before,
                    }
                }
                Err(e) => {
                    let reason = SkipReason::from_error(&e);
                    tracing::warn!(title = %title, ?reason, error = %e, "skipping article");
                    ArticleOutcome::Skipped {
                        title,
                        reason,
                        detail: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        tracing::debug!(
            chunks = report.knowledge_base.len(),
            skipped = report.skipped().count(),
            "knowledge base assembled"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FailingSearch;

    impl KnowledgeSource for FailingSearch {
        fn search(&self, _term: &str, _limit: usize) -> Result<Vec<String>, AppError> {
            Err(AppError::new("SOURCE_SEARCH_FAILED", "offline").with_retryable(true))
        }

        fn fetch_article(&self, _title: &str) -> Result<String, AppError> {
            unreachable!("fetch must not run after a failed search")
        }
    }

    struct ManyTitles;

    impl KnowledgeSource for ManyTitles {
        fn search(&self, _term: &str, _limit: usize) -> Result<Vec<String>, AppError> {
            // Ignores the limit on purpose.
            Ok((0..10).map(|i| format!("Title {i}")).collect())
        }

        fn fetch_article(&self, title: &str) -> Result<String, AppError> {
            Ok(format!("{title} has a paragraph that is comfortably long enough to keep"))
        }
    }

    #[test]
    fn failed_search_yields_empty_report() {
        let fetcher = KnowledgeFetcher::new(&FailingSearch, &PipelineConfig::script()).unwrap();
        let report = fetcher.fetch("anything");
        assert!(report.search_failed);
        assert!(report.knowledge_base.is_empty());
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn never_reads_more_than_max_articles() {
        let cfg = PipelineConfig::chat();
        let fetcher = KnowledgeFetcher::new(&ManyTitles, &cfg).unwrap();
        let report = fetcher.fetch("q");
        assert_eq!(report.outcomes.len(), cfg.max_articles);
        assert_eq!(report.knowledge_base.len(), cfg.max_articles);
    }

    #[test]
    fn rejects_invalid_window_before_fetching() {
        let cfg = PipelineConfig {
            overlap: 150,
            ..PipelineConfig::script()
        };
        let err = KnowledgeFetcher::new(&FailingSearch, &cfg).err().expect("invalid");
        assert_eq!(err.code, "CONFIG_INVALID");
    }

    #[test]
    fn skip_reasons_map_from_error_codes() {
        let reason = |code: &str| SkipReason::from_error(&AppError::new(code, "x"));
        assert_eq!(reason("SOURCE_AMBIGUOUS"), SkipReason::Ambiguous);
        assert_eq!(reason("SOURCE_NOT_FOUND"), SkipReason::NotFound);
        assert_eq!(reason("SOURCE_FETCH_FAILED"), SkipReason::FetchFailed);
        assert_eq!(reason("SOMETHING_ELSE"), SkipReason::FetchFailed);
    }
}
