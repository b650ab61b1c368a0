use wikirag_core::error::AppError;

pub const GREETING: &str = "Hello! Ask me anything.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Ai,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// In-memory chat history for one interactive session.
///
/// At most one prompt is in flight: `submit` is refused while a previous prompt
/// is pending, and `resolve` always clears the pending slot, so a failed query
/// never leaves the session stuck or adds a half-finished reply.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pending: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::Ai,
                text: GREETING.to_string(),
            }],
            pending: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Record the user's prompt and mark it pending. Returns the trimmed prompt.
    pub fn submit(&mut self, input: &str) -> Result<String, AppError> {
        if self.pending.is_some() {
            return Err(AppError::new(
                "SESSION_BUSY",
                "Wait for the current answer before asking again",
            ));
        }
        let prompt = input.trim();
        if prompt.is_empty() {
            return Err(AppError::new("SESSION_INPUT_EMPTY", "Nothing to ask"));
        }
        self.messages.push(ChatMessage {
            role: Role::User,
            text: prompt.to_string(),
        });
        self.pending = Some(prompt.to_string());
        Ok(prompt.to_string())
    }

    /// Finish the pending prompt. Only a successful answer is added to the history.
    pub fn resolve(&mut self, outcome: Result<String, AppError>) -> Result<&ChatMessage, AppError> {
        if self.pending.take().is_none() {
            return Err(AppError::new("SESSION_IDLE", "No prompt is pending"));
        }
        let text = outcome?;
        self.messages.push(ChatMessage { role: Role::Ai, text });
        Ok(&self.messages[self.messages.len() - 1])
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
