pub fn grounded_answer_prompt(question: &str, context: &str) -> String {
    // The contract the parser relies on:
    // - Answer from the context only.
    // - Reply with a single JSON object {"answer": ..., "score": ...}.
    format!(
        r#"You are answering a question using passages retrieved from Wikipedia.

Rules (non-negotiable):
1) Use ONLY the context below. Do not invent facts.
2) Keep the answer short: a phrase or one sentence, like an extractive answer span.
3) If the context does not contain the answer, answer "unknown" with score 0.
4) "score" is your confidence that the answer is supported by the context, from 0.0 to 1.0.

Question:
{question}

Context:
{context}

Output:
- Return a single JSON object and nothing else: {{"answer": "<answer>", "score": <number>}}
"#
    )
}
