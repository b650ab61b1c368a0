use wikirag_core::error::AppError;

/// Turns text into fixed-size vectors. Implementations must be deterministic
/// for identical input.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;

    /// Embed several inputs, preserving order. The default issues one call per input.
    fn embed_batch(&self, model: &str, inputs: &[&str]) -> Result<Vec<Vec<f32>>, AppError> {
        inputs.iter().map(|input| self.embed(model, input)).collect()
    }
}

pub mod ollama_embed;
