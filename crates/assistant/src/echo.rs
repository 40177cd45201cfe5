//! Echo assistant - answers with a deterministic transform of the input.

use async_trait::async_trait;

use crate::error::AssistantError;
use crate::prompt::{Action, Prompt, Reply};
use crate::trait_def::Assistant;

/// A local assistant that echoes the user's text back.
///
/// `send` yields `"Echo: <text>"` and `regenerate` yields
/// `"Echo (regen): <text>"`. Replies are tagged `source = "local"` and
/// with the action they answer.
#[derive(Debug, Clone, Default)]
pub struct EchoAssistant;

impl EchoAssistant {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Assistant for EchoAssistant {
    async fn respond(&self, prompt: Prompt) -> Result<Reply, AssistantError> {
        let text = match prompt.action {
            Action::Send => format!("Echo: {}", prompt.text),
            Action::Regenerate => format!("Echo (regen): {}", prompt.text),
        };

        Ok(Reply::new(text)
            .with_meta("source", "local")
            .with_meta("action", prompt.action.as_str()))
    }

    fn name(&self) -> &str {
        "EchoAssistant"
    }
}
