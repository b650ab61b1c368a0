pub mod embeddings;
pub mod generate;
pub mod knowledge;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod retrieve;
