//! Response strategies for billable chat actions.
//!
//! The dispatcher asks an [`Assistant`] for the reply to a send or
//! regenerate action. This crate provides the trait and a deterministic
//! local implementation:
//! - `EchoAssistant` - Echoes the user's text back
//!
//! # Example
//!
//! ```rust
//! use assistant::{Action, Assistant, EchoAssistant, Prompt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), assistant::AssistantError> {
//!     let assistant = EchoAssistant::new();
//!
//!     let reply = assistant.respond(Prompt::new(Action::Send, "Hello!", "V1")).await?;
//!     assert_eq!(reply.text, "Echo: Hello!");
//!     Ok(())
//! }
//! ```

mod echo;
mod error;
mod prompt;
mod trait_def;

pub use async_trait::async_trait;
pub use echo::EchoAssistant;
pub use error::AssistantError;
pub use prompt::{Action, Prompt, Reply};
pub use trait_def::Assistant;
