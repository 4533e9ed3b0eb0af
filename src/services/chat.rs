use crate::error::{DecoError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Result of one chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Prompt tokens billed for the call.
    pub prompt_tokens: u32,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send a system prompt plus one user message and return the reply.
    async fn complete(&self, system_prompt: &str, user_text: &str, model: &str)
    -> Result<Completion>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// One recorded chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCall {
    pub system_prompt: String,
    pub user_text: String,
    pub model: String,
}

#[derive(Debug, Clone, Default)]
enum Reply {
    /// Echo the user text back.
    #[default]
    Echo,
    /// Replies handed out in order; the last one repeats.
    Scripted(Vec<String>),
    Fail,
}

/// Mock chat service for testing
#[derive(Debug, Default)]
pub struct MockChat {
    reply: Reply,
    calls: Mutex<Vec<ChatCall>>,
}

impl MockChat {
    /// Mock that echoes the user text.
    pub fn echo() -> Self {
        Self::default()
    }

    /// Mock that returns `replies` in order, repeating the last one.
    pub fn scripted(replies: &[&str]) -> Self {
        Self {
            reply: Reply::Scripted(replies.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        }
    }

    /// Mock that fails every call.
    pub fn failing() -> Self {
        Self {
            reply: Reply::Fail,
            ..Default::default()
        }
    }

    /// Requests seen so far, in call order.
    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatService for MockChat {
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        model: &str,
    ) -> Result<Completion> {
        let index = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(ChatCall {
                    system_prompt: system_prompt.to_string(),
                    user_text: user_text.to_string(),
                    model: model.to_string(),
                });
                calls.len() - 1
            }
            Err(_) => 0,
        };

        let text = match &self.reply {
            Reply::Echo => user_text.to_string(),
            Reply::Scripted(replies) => replies
                .get(index)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or_default(),
            Reply::Fail => {
                return Err(DecoError::provider("mock chat", 429, "rate limited"));
            }
        };

        Ok(Completion {
            text,
            prompt_tokens: (system_prompt.split_whitespace().count()
                + user_text.split_whitespace().count()) as u32,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
