//! Database models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// An authenticated identity, as handed to the gateway and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Stable principal identifier (UUID).
    pub id: String,
    /// Login email, lowercased.
    pub email: String,
}

/// A stored principal including its credential hash.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    /// The identity part of this user.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

/// A plan: the template of default credit allotments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub price_cents: Option<i64>,
    pub credits_v1: Option<i64>,
    pub credits_v2: Option<i64>,
    pub credits_v3: Option<i64>,
    pub ocr_bill_limit: Option<i64>,
    pub ocr_bank_limit: Option<i64>,
}

/// Per-principal credit counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CreditLedger {
    /// Owning principal.
    pub user_id: String,
    pub v1: i64,
    pub v2: i64,
    pub v3: i64,
    pub ocr_bill: i64,
    pub ocr_bank: i64,
    /// First day of the month the action counters were last reset.
    pub last_reset_month: NaiveDate,
    /// First day of the month the document counters were last reset.
    pub ocr_last_reset_month: NaiveDate,
}

/// Remaining action credits, as returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCredits {
    pub v1: i64,
    pub v2: i64,
    pub v3: i64,
}

/// Remaining document-extraction credits, as returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCredits {
    pub ocr_bill: i64,
    pub ocr_bank: i64,
}

impl CreditLedger {
    pub fn action_credits(&self) -> ActionCredits {
        ActionCredits {
            v1: self.v1,
            v2: self.v2,
            v3: self.v3,
        }
    }

    pub fn document_credits(&self) -> DocumentCredits {
        DocumentCredits {
            ocr_bill: self.ocr_bill,
            ocr_bank: self.ocr_bank,
        }
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Column value for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Structured payload of a turn: text plus metadata, tagged with the tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnContent {
    pub text: String,
    /// Tier label the turn was produced under (e.g. "V2").
    #[serde(rename = "version")]
    pub tier: String,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// One message-like record of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    /// Owning conversation; `None` for synthesized, unsaved turns.
    pub chat_id: Option<String>,
    pub user_id: String,
    pub role: Role,
    pub content: TurnContent,
    /// ISO-8601 creation time.
    pub created_at: String,
}
