//! The Assistant trait definition.

use async_trait::async_trait;

use crate::error::AssistantError;
use crate::prompt::{Prompt, Reply};

/// A strategy that turns a prompt into an assistant reply.
///
/// Implementations can range from deterministic transforms to remote
/// model backends. This trait is object-safe and can be used with
/// `Arc<dyn Assistant>`.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Produce a reply for `prompt`.
    ///
    /// Called while the dispatcher holds the store's write transaction, so
    /// every other writer waits on it. Keep it fast; an implementation
    /// backed by a slow remote model should enforce its own timeout.
    async fn respond(&self, prompt: Prompt) -> Result<Reply, AssistantError>;

    /// Get a human-readable name for this implementation.
    fn name(&self) -> &str;

    /// Check if the assistant is ready to answer.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
