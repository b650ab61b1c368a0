use serde::{Deserialize, Serialize};
use wikirag_core::context::truncate_chars;
use wikirag_core::error::AppError;

use super::Embedder;
use crate::ollama::OllamaClient;

const MAX_INPUT_CHARS: usize = 12_000;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.client.base_url(), path);
        let resp = ureq::post(&url).timeout(self.client.timeout()).send_json(body);

        match resp {
            Ok(r) if r.status() == 200 => r.into_json().map_err(|e| {
                AppError::new("AI_EMBEDDINGS_FAILED", "Failed to decode embeddings response")
                    .with_details(e.to_string())
            }),
            Ok(r) => Err(
                AppError::new("AI_EMBEDDINGS_FAILED", "Embeddings request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::new("AI_EMBEDDINGS_FAILED", "Embeddings request failed")
                    .with_details(format!("status={status}"))
                    .with_retryable(status >= 500),
            ),
            Err(e) => Err(
                AppError::new("AI_EMBEDDINGS_FAILED", "Failed to call embeddings endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedBatchRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedBatchResponse {
    embeddings: Vec<Vec<f32>>,
}

fn encode<T: Serialize>(req: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(req).map_err(|e| {
        AppError::new("AI_EMBEDDINGS_FAILED", "Failed to encode embeddings request")
            .with_details(e.to_string())
    })
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        // Chunks are bounded by word count, but a single huge "word" is not.
        let prompt = truncate_chars(input, MAX_INPUT_CHARS);
        let v: EmbeddingsResponse =
            self.post("/api/embeddings", encode(&EmbeddingsRequest { model, prompt })?)?;
        if v.embedding.is_empty() {
            return Err(AppError::new(
                "AI_EMBEDDINGS_FAILED",
                "Embeddings response was empty",
            ));
        }
        Ok(v.embedding)
    }

    fn embed_batch(&self, model: &str, inputs: &[&str]) -> Result<Vec<Vec<f32>>, AppError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let input = inputs
            .iter()
            .map(|s| truncate_chars(s, MAX_INPUT_CHARS))
            .collect();
        let v: EmbedBatchResponse =
            self.post("/api/embed", encode(&EmbedBatchRequest { model, input })?)?;
        if v.embeddings.len() != inputs.len() {
            return Err(AppError::new(
                "AI_EMBEDDINGS_FAILED",
                "Batch embeddings count does not match inputs",
            )
            .with_details(format!(
                "inputs={}; embeddings={}",
                inputs.len(),
                v.embeddings.len()
            )));
        }
        if v.embeddings.iter().any(|e| e.is_empty()) {
            return Err(AppError::new(
                "AI_EMBEDDINGS_FAILED",
                "Embeddings response was empty",
            ));
        }
        Ok(v.embeddings)
    }
}
