use std::time::Duration;

use serde::Deserialize;
use wikirag_core::config::WikipediaConfig;
use wikirag_core::error::AppError;

use super::KnowledgeSource;

/// Blocking MediaWiki API client for full plain-text articles.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    api_url: String,
    user_agent: String,
    timeout: Duration,
}

impl WikipediaClient {
    pub fn new(config: &WikipediaConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn get(&self, params: &[(&str, &str)], code: &str) -> Result<ureq::Response, AppError> {
        let mut req = ureq::get(&self.api_url)
            .timeout(self.timeout)
            .set("User-Agent", &self.user_agent)
            .query("format", "json")
            .query("formatversion", "2");
        for (k, v) in params {
            req = req.query(k, v);
        }
        match req.call() {
            Ok(r) => Ok(r),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(code, "Wikipedia request failed")
                .with_details(format!("status={status}"))
                .with_retryable(status == 429 || status >= 500)),
            Err(e) => Err(AppError::new(code, "Failed to reach Wikipedia")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    query: Option<PageQuery>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

pub(crate) fn parse_search_titles(body: &str) -> Result<Vec<String>, AppError> {
    let resp: SearchResponse = serde_json::from_str(body).map_err(|e| {
        AppError::new("SOURCE_SEARCH_FAILED", "Failed to decode Wikipedia search response")
            .with_details(e.to_string())
    })?;
    if let Some(err) = resp.error {
        return Err(AppError::new("SOURCE_SEARCH_FAILED", "Wikipedia search was rejected")
            .with_details(format!("code={}; info={}", err.code, err.info)));
    }
    Ok(resp
        .query
        .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
        .unwrap_or_default())
}

pub(crate) fn parse_article(title: &str, body: &str) -> Result<String, AppError> {
    let resp: PageResponse = serde_json::from_str(body).map_err(|e| {
        AppError::new("SOURCE_FETCH_FAILED", "Failed to decode Wikipedia page response")
            .with_details(format!("title={title}; err={e}"))
    })?;
    if let Some(err) = resp.error {
        return Err(AppError::new("SOURCE_FETCH_FAILED", "Wikipedia page request was rejected")
            .with_details(format!("title={title}; code={}; info={}", err.code, err.info)));
    }
    let page = resp
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| {
            AppError::new("SOURCE_NOT_FOUND", "Wikipedia returned no page")
                .with_details(format!("title={title}"))
        })?;

    if page.missing || page.invalid {
        return Err(AppError::new("SOURCE_NOT_FOUND", "Wikipedia page does not exist")
            .with_details(format!("title={}", page.title)));
    }
    if page.pageprops.and_then(|p| p.disambiguation).is_some() {
        return Err(AppError::new("SOURCE_AMBIGUOUS", "Title is a disambiguation page")
            .with_details(format!("title={}", page.title)));
    }
    Ok(page.extract.unwrap_or_default())
}

fn read_body(resp: ureq::Response, code: &str) -> Result<String, AppError> {
    resp.into_string().map_err(|e| {
        AppError::new(code, "Failed to read Wikipedia response").with_details(e.to_string())
    })
}

impl KnowledgeSource for WikipediaClient {
    fn search(&self, term: &str, limit: usize) -> Result<Vec<String>, AppError> {
        let limit = limit.to_string();
        let resp = self.get(
            &[
                ("action", "query"),
                ("list", "search"),
                ("srprop", ""),
                ("srsearch", term),
                ("srlimit", limit.as_str()),
            ],
            "SOURCE_SEARCH_FAILED",
        )?;
        parse_search_titles(&read_body(resp, "SOURCE_SEARCH_FAILED")?)
    }

    fn fetch_article(&self, title: &str) -> Result<String, AppError> {
        let resp = self.get(
            &[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("explaintext", "1"),
                ("ppprop", "disambiguation"),
                ("redirects", "1"),
                ("titles", title),
            ],
            "SOURCE_FETCH_FAILED",
        )?;
        parse_article(title, &read_body(resp, "SOURCE_FETCH_FAILED")?)
    }
}
