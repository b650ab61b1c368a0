use std::cell::RefCell;

use pretty_assertions::assert_eq;
use wikirag_ai::knowledge::{ArticleOutcome, KnowledgeFetcher, KnowledgeSource, SkipReason};
use wikirag_core::config::PipelineConfig;
use wikirag_core::error::AppError;

/// Serves fixed articles; titles listed in `failures` fail with the given code.
struct ScriptedSource {
    titles: Vec<&'static str>,
    failures: Vec<(&'static str, &'static str)>,
    fetched: RefCell<Vec<String>>,
}

impl ScriptedSource {
    fn new(titles: &[&'static str], failures: &[(&'static str, &'static str)]) -> Self {
        Self {
            titles: titles.to_vec(),
            failures: failures.to_vec(),
            fetched: RefCell::new(Vec::new()),
        }
    }
}

impl KnowledgeSource for ScriptedSource {
    fn search(&self, _term: &str, limit: usize) -> Result<Vec<String>, AppError> {
        Ok(self.titles.iter().take(limit).map(|t| t.to_string()).collect())
    }

    fn fetch_article(&self, title: &str) -> Result<String, AppError> {
        self.fetched.borrow_mut().push(title.to_string());
        if let Some((_, code)) = self.failures.iter().find(|(t, _)| *t == title) {
            return Err(AppError::new(*code, "scripted failure").with_details(format!("title={title}")));
        }
        Ok(format!(
            "{title} opening paragraph with plenty of words in it.\nshort\n\n{title} second paragraph, also comfortably long."
        ))
    }
}

fn chunk_texts(fetcher: &KnowledgeFetcher<'_>, query: &str) -> Vec<String> {
    fetcher
        .fetch(query)
        .knowledge_base
        .iter()
        .map(|c| c.as_str().to_string())
        .collect()
}

#[test]
fn ambiguous_article_is_skipped_and_the_rest_are_kept() {
    let source = ScriptedSource::new(&["Alpha", "Mercury", "Gamma"], &[("Mercury", "SOURCE_AMBIGUOUS")]);
    let fetcher = KnowledgeFetcher::new(&source, &PipelineConfig::script()).unwrap();

    let report = fetcher.fetch("planets");
    let texts: Vec<&str> = report.knowledge_base.iter().map(|c| c.as_str()).collect();
    assert_eq!(texts.len(), 4);
    assert!(texts[..2].iter().all(|t| t.starts_with("Alpha")));
    assert!(texts[2..].iter().all(|t| t.starts_with("Gamma")));
    assert!(!texts.iter().any(|t| t.contains("Mercury")));

    assert_eq!(source.fetched.borrow().as_slice(), ["Alpha", "Mercury", "Gamma"]);
    assert_eq!(
        report.outcomes.iter().map(|o| o.title()).collect::<Vec<_>>(),
        vec!["Alpha", "Mercury", "Gamma"]
    );
    assert!(matches!(
        &report.outcomes[1],
        ArticleOutcome::Skipped { title, reason: SkipReason::Ambiguous, .. } if title == "Mercury"
    ));
    assert!(!report.search_failed);
}

#[test]
fn every_failure_kind_is_isolated_per_title() {
    let source = ScriptedSource::new(
        &["Gone", "Flaky", "Alpha"],
        &[("Gone", "SOURCE_NOT_FOUND"), ("Flaky", "SOURCE_FETCH_FAILED")],
    );
    let fetcher = KnowledgeFetcher::new(&source, &PipelineConfig::script()).unwrap();
    let report = fetcher.fetch("q");

    let reasons: Vec<SkipReason> = report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            ArticleOutcome::Skipped { reason, .. } => Some(*reason),
            ArticleOutcome::Fetched { .. } => None,
        })
        .collect();
    assert_eq!(reasons, vec![SkipReason::NotFound, SkipReason::FetchFailed]);
    assert_eq!(
        report.outcomes[2],
        ArticleOutcome::Fetched {
            title: "Alpha".to_string(),
            paragraphs: 2,
            chunks: 2,
        }
    );
}

#[test]
fn all_articles_failing_is_an_empty_knowledge_base() {
    let source = ScriptedSource::new(&["Mercury"], &[("Mercury", "SOURCE_AMBIGUOUS")]);
    let fetcher = KnowledgeFetcher::new(&source, &PipelineConfig::script()).unwrap();
    assert!(chunk_texts(&fetcher, "q").is_empty());
}

#[test]
fn paragraph_threshold_and_window_come_from_config() {
    let source = ScriptedSource::new(&["Alpha"], &[]);
    let strict = PipelineConfig {
        min_paragraph_length: 50,
        chunk_size: 4,
        overlap: 1,
        ..PipelineConfig::script()
    };
    let fetcher = KnowledgeFetcher::new(&source, &strict).unwrap();

    // Only the first paragraph (51 chars) passes the 50 char threshold.
    assert_eq!(
        chunk_texts(&fetcher, "q"),
        vec![
            "Alpha opening paragraph with",
            "with plenty of words",
            "words in it.",
        ]
    );
}
