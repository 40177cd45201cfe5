//! Inputs and outputs of a response strategy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The billable action a prompt was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// A new user turn in a conversation.
    Send,
    /// Another answer to the last user turn.
    Regenerate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Send => "send",
            Action::Regenerate => "regenerate",
        }
    }

    /// Parse an action name as sent by clients. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "send" => Some(Action::Send),
            "regenerate" => Some(Action::Regenerate),
            _ => None,
        }
    }
}

/// What the assistant is asked to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub action: Action,
    /// The user's text (for regenerate, the last user text).
    pub text: String,
    /// Tier label the request is billed under, e.g. `V2`.
    pub tier: String,
}

impl Prompt {
    pub fn new(action: Action, text: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            action,
            text: text.into(),
            tier: tier.into(),
        }
    }
}

/// The assistant's answer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    pub text: String,
    /// Free-form metadata stored alongside the reply.
    pub meta: Map<String, Value>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: Map::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_is_exact() {
        assert_eq!(Action::parse("send"), Some(Action::Send));
        assert_eq!(Action::parse("regenerate"), Some(Action::Regenerate));
        assert_eq!(Action::parse("Send"), None);
        assert_eq!(Action::parse("delete"), None);
    }

    #[test]
    fn test_reply_meta() {
        let reply = Reply::new("ok").with_meta("source", "local");
        assert_eq!(reply.meta["source"], Value::from("local"));
    }
}
