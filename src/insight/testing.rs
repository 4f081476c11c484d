use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::ChatModel;

/// In-memory chat model that replays scripted replies and records prompts.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    repeat: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// Replies in order; once exhausted every call fails.
    pub fn replies(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeat: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::replies(Vec::new())
    }

    pub fn always(reply: &str) -> Self {
        Self {
            repeat: Some(reply.to_string()),
            ..Self::failing()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _system: &str, user: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(user.to_string());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.repeat {
            Some(reply) => Ok(reply.clone()),
            None => Err(anyhow::anyhow!("model unavailable")),
        }
    }
}
