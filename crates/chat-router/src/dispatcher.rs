//! The action dispatcher: debit a credit, then run the assistant.

use std::sync::Arc;

use assistant::{Action, Assistant, AssistantError, Prompt};
use chrono::NaiveDate;
use database::credits::{self, DebitOutcome};
use database::models::{Principal, Role, Turn, TurnContent};
use database::{time, turn};
use serde_json::Map;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::request::{ActionRequest, DispatchResponse, Tier};

/// Lifecycle of one billable request.
///
/// ```text
/// Idle -> CreditChecked -> Executed -> Responded
///   \            \
///    +-> Rejected +-> Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// The debit succeeded.
    CreditChecked,
    /// The assistant answered and any turns are written.
    Executed,
    Responded,
    Rejected,
}

impl Phase {
    /// Whether `self -> to` is a legal transition.
    pub fn allows(self, to: Phase) -> bool {
        matches!(
            (self, to),
            (Phase::Idle, Phase::CreditChecked)
                | (Phase::Idle, Phase::Rejected)
                | (Phase::CreditChecked, Phase::Executed)
                | (Phase::CreditChecked, Phase::Rejected)
                | (Phase::Executed, Phase::Responded)
        )
    }
}

/// Tracks the phase of a single dispatch and logs each transition.
struct Run<'a> {
    user_id: &'a str,
    phase: Phase,
}

impl<'a> Run<'a> {
    fn new(user_id: &'a str) -> Self {
        Self {
            user_id,
            phase: Phase::Idle,
        }
    }

    fn advance(&mut self, to: Phase) {
        debug_assert!(self.phase.allows(to), "{:?} -> {:?}", self.phase, to);
        debug!(user_id = self.user_id, from = ?self.phase, to = ?to, "Dispatch transition");
        self.phase = to;
    }

    fn reject(&mut self, err: DispatchError) -> DispatchError {
        info!(user_id = self.user_id, phase = ?self.phase, reason = %err, "Dispatch rejected");
        self.advance(Phase::Rejected);
        err
    }
}

/// A request that passed validation.
struct Validated {
    action: Action,
    tier: Tier,
    conversation: Option<String>,
    text: String,
}

fn validate(request: ActionRequest) -> Result<Validated, DispatchError> {
    let action = request
        .action
        .ok_or_else(|| DispatchError::Validation("action is required".to_string()))?;
    let action = Action::parse(&action).ok_or(DispatchError::UnsupportedAction(action))?;

    let tier = request
        .tier
        .ok_or_else(|| DispatchError::Validation("tier is required".to_string()))?;
    let tier = Tier::parse(&tier)
        .ok_or_else(|| DispatchError::Validation(format!("unknown tier: {tier}")))?;

    let text = match action {
        Action::Send => request.text,
        Action::Regenerate => request.last_user_text,
    }
    .unwrap_or_default();

    Ok(Validated {
        action,
        tier,
        conversation: request.conversation_ref.filter(|c| !c.is_empty()),
        text,
    })
}

/// Dispatches billable chat actions.
///
/// Every dispatch runs in one store transaction: ledger bootstrap and
/// rollover, the debit, and any persisted turns either all land or none
/// do. The one exception is an assistant failure after the debit, which
/// keeps the debit and any user turn already written.
#[derive(Clone)]
pub struct Dispatcher {
    pool: SqlitePool,
    assistant: Arc<dyn Assistant>,
}

impl Dispatcher {
    pub fn new(pool: SqlitePool, assistant: Arc<dyn Assistant>) -> Self {
        Self { pool, assistant }
    }

    /// Name of the configured assistant.
    pub fn assistant_name(&self) -> &str {
        self.assistant.name()
    }

    /// Dispatch `request` on behalf of `principal`.
    pub async fn dispatch(
        &self,
        principal: &Principal,
        request: ActionRequest,
    ) -> Result<DispatchResponse, DispatchError> {
        self.dispatch_on(principal, request, time::today()).await
    }

    /// Dispatch as if the current date were `today`.
    pub async fn dispatch_on(
        &self,
        principal: &Principal,
        request: ActionRequest,
        today: NaiveDate,
    ) -> Result<DispatchResponse, DispatchError> {
        let user_id = principal.id.as_str();
        let mut run = Run::new(user_id);

        let request = validate(request).map_err(|e| run.reject(e))?;

        if !self.assistant.is_ready().await {
            let err = AssistantError::Unavailable(format!("{} is not ready", self.assistant.name()));
            return Err(run.reject(err.into()));
        }

        let mut tx = self.pool.begin().await?;

        credits::ensure(&mut tx, user_id, today).await?;
        let counter = request.tier.counter();
        credits::rollover_if_needed(&mut tx, user_id, counter.group(), today).await?;

        let persist_to = match (request.action, &request.conversation) {
            (Action::Send, Some(chat_id)) => {
                if !turn::chat_owned_by(&mut tx, chat_id, user_id).await? {
                    return Err(run.reject(DispatchError::NotFound(chat_id.clone())));
                }
                Some(chat_id.as_str())
            }
            _ => None,
        };

        match credits::try_debit(&mut tx, user_id, counter, 1).await? {
            DebitOutcome::Debited => run.advance(Phase::CreditChecked),
            DebitOutcome::InsufficientCredits => {
                let credits = credits::get(&mut tx, user_id).await?.action_credits();
                // Keep the bootstrap and rollover; nothing was debited.
                tx.commit().await?;
                return Err(run.reject(DispatchError::InsufficientCredits {
                    tier: request.tier,
                    credits,
                }));
            }
        }

        if let Some(chat_id) = persist_to {
            let content = TurnContent {
                text: request.text.clone(),
                tier: request.tier.label().to_string(),
                meta: Map::new(),
            };
            turn::append_turn(&mut tx, chat_id, user_id, Role::User, &content).await?;
        }

        let prompt = Prompt::new(request.action, request.text, request.tier.label());
        let reply = match self.assistant.respond(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    user_id,
                    assistant = self.assistant.name(),
                    error = %e,
                    "Assistant failed after debit"
                );
                tx.commit().await?;
                return Err(run.reject(e.into()));
            }
        };

        let content = TurnContent {
            text: reply.text,
            tier: request.tier.label().to_string(),
            meta: reply.meta,
        };
        let assistant_turn = match persist_to {
            Some(chat_id) => {
                turn::append_turn(&mut tx, chat_id, user_id, Role::Assistant, &content).await?
            }
            None => Turn {
                id: Uuid::new_v4().to_string(),
                chat_id: request.conversation.clone(),
                user_id: user_id.to_string(),
                role: Role::Assistant,
                content,
                created_at: time::now_iso(),
            },
        };
        run.advance(Phase::Executed);

        let credits = credits::get(&mut tx, user_id).await?.action_credits();
        tx.commit().await?;

        run.advance(Phase::Responded);
        info!(
            user_id,
            action = request.action.as_str(),
            tier = %request.tier,
            persisted = persist_to.is_some(),
            "Action dispatched"
        );

        Ok(DispatchResponse {
            assistant_turn,
            credits,
        })
    }
}
