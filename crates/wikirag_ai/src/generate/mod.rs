use serde::{Deserialize, Serialize};
use wikirag_core::error::AppError;

use crate::llm::Llm;

mod prompts;

/// Raw output of a question-answering capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    pub answer: String,
    /// Confidence reported by the capability, if it reports one.
    #[serde(default)]
    pub score: Option<f32>,
}

/// Answers a question from a context string.
pub trait AnswerModel {
    fn infer(&self, question: &str, context: &str) -> Result<Inference, AppError>;
}

/// Single-shot answer synthesis over an [`AnswerModel`]. No retries.
pub struct Generator<'a> {
    model: &'a dyn AnswerModel,
}

impl<'a> Generator<'a> {
    pub fn new(model: &'a dyn AnswerModel) -> Self {
        Self { model }
    }

    /// Returns the answer text and a confidence in `[0, 1]` (0 when unreported).
    pub fn answer(&self, question: &str, context: &str) -> Result<(String, f32), AppError> {
        let inference = self.model.infer(question, context).map_err(|e| {
            if e.is("AI_GENERATION_FAILED") {
                e
            } else {
                AppError::new("AI_GENERATION_FAILED", "Answer generation failed")
                    .with_details(e.to_string())
                    .with_retryable(e.retryable)
            }
        })?;
        let confidence = normalize_score(inference.score);
        tracing::debug!(confidence, reported = inference.score.is_some(), "generated answer");
        Ok((inference.answer, confidence))
    }
}

fn normalize_score(score: Option<f32>) -> f32 {
    match score {
        Some(s) if s.is_finite() => s.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Adapts a free-text [`Llm`] into an [`AnswerModel`] by prompting for a JSON
/// `{"answer", "score"}` object.
///
/// Output that is not such an object is taken verbatim as the answer, without a score.
pub struct LlmAnswerModel<L> {
    llm: L,
    model: String,
}

impl<L: Llm> LlmAnswerModel<L> {
    pub fn new(llm: L, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

impl<L: Llm> AnswerModel for LlmAnswerModel<L> {
    fn infer(&self, question: &str, context: &str) -> Result<Inference, AppError> {
        let prompt = prompts::grounded_answer_prompt(question, context);
        let raw = self.llm.generate(&self.model, &prompt)?;
        Ok(parse_inference(&raw))
    }
}

pub(crate) fn parse_inference(raw: &str) -> Inference {
    let body = strip_code_fence(raw.trim());
    match serde_json::from_str::<Inference>(body) {
        Ok(parsed) if !parsed.answer.trim().is_empty() => Inference {
            answer: parsed.answer.trim().to_string(),
            score: parsed.score,
        },
        _ => Inference {
            answer: raw.trim().to_string(),
            score: None,
        },
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
