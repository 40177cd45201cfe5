//! Wire types of the action endpoint.

use std::fmt;

use database::{ActionCredits, Counter, Turn};
use serde::{Deserialize, Serialize};

/// Body of an action request.
///
/// Every field is optional on the wire so that missing fields surface as
/// dispatch errors rather than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    /// `send` or `regenerate`.
    pub action: Option<String>,
    /// Tier selector, `V1`, `V2` or `V3`.
    #[serde(alias = "version")]
    pub tier: Option<String>,
    /// Conversation to append to. Absent for ephemeral previews.
    #[serde(alias = "chatId")]
    pub conversation_ref: Option<String>,
    pub text: Option<String>,
    pub last_user_text: Option<String>,
}

/// Which action counter a request is billed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    V1,
    V2,
    V3,
}

impl Tier {
    /// Parse a tier selector, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "V1" => Some(Tier::V1),
            "V2" => Some(Tier::V2),
            "V3" => Some(Tier::V3),
            _ => None,
        }
    }

    /// Canonical label, stored on every turn.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::V1 => "V1",
            Tier::V2 => "V2",
            Tier::V3 => "V3",
        }
    }

    /// The ledger counter this tier debits.
    pub fn counter(&self) -> Counter {
        match self {
            Tier::V1 => Counter::V1,
            Tier::V2 => Counter::V2,
            Tier::V3 => Counter::V3,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Successful dispatch result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub assistant_turn: Turn,
    /// Action counters after the debit.
    pub credits: ActionCredits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tier_parse() {
        assert_eq!(Tier::parse("V2"), Some(Tier::V2));
        assert_eq!(Tier::parse("v3"), Some(Tier::V3));
        assert_eq!(Tier::parse("V4"), None);
        assert_eq!(Tier::parse(""), None);
        assert_eq!(Tier::V1.counter(), Counter::V1);
    }

    #[test]
    fn test_request_aliases() {
        let request: ActionRequest = serde_json::from_value(json!({
            "action": "send",
            "version": "V1",
            "chatId": "c1",
            "text": "hi"
        }))
        .unwrap();
        assert_eq!(request.tier.as_deref(), Some("V1"));
        assert_eq!(request.conversation_ref.as_deref(), Some("c1"));

        let request: ActionRequest = serde_json::from_value(json!({
            "action": "regenerate",
            "tier": "V2",
            "conversationRef": "c2",
            "lastUserText": "again"
        }))
        .unwrap();
        assert_eq!(request.tier.as_deref(), Some("V2"));
        assert_eq!(request.conversation_ref.as_deref(), Some("c2"));
        assert_eq!(request.last_user_text.as_deref(), Some("again"));
    }

    #[test]
    fn test_empty_request_deserializes() {
        let request: ActionRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request, ActionRequest::default());
    }
}
