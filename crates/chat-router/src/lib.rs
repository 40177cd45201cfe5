//! Credit-metered dispatch of chat actions.
//!
//! A [`Dispatcher`] takes an action request from an authenticated
//! principal, debits one credit from the counter its tier selects, and asks
//! the configured [`assistant::Assistant`] for a reply. Sends that name a
//! conversation persist both the user turn and the reply; everything else
//! returns a synthesized, unsaved reply.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assistant::EchoAssistant;
//! use chat_router::{ActionRequest, Dispatcher};
//! use database::{account, user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:data.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let alice = user::create_user(db.pool(), "alice@example.com", "$argon2id$...")
//!         .await?
//!         .principal();
//!     account::ensure_account(db.pool(), &alice).await?;
//!
//!     let dispatcher = Dispatcher::new(db.pool().clone(), Arc::new(EchoAssistant::new()));
//!     let request = ActionRequest {
//!         action: Some("send".into()),
//!         tier: Some("V1".into()),
//!         text: Some("Hello!".into()),
//!         ..Default::default()
//!     };
//!     let response = dispatcher.dispatch(&alice, request).await?;
//!     println!("{} (v1 left: {})", response.assistant_turn.content.text, response.credits.v1);
//!     Ok(())
//! }
//! ```

mod dispatcher;
mod error;
mod request;

pub use dispatcher::{Dispatcher, Phase};
pub use error::DispatchError;
pub use request::{ActionRequest, DispatchResponse, Tier};
