//! Conversation turns.
//!
//! A request owns one `Conversation`: the prior history sent by the client
//! plus everything the agent loop appends while it works. Order is the model
//! context, so the log is append-only.

use serde::{Deserialize, Serialize};

use crate::tool::{ToolCallRequest, ToolResponse};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (and tool responses fed back on the user's side).
    User,
    /// The model.
    #[serde(alias = "model", alias = "assistant")]
    Agent,
}

/// What a turn carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnContent {
    /// Plain natural-language text.
    Text(String),
    /// The model asked for these tool invocations, in this order.
    ToolCalls(Vec<ToolCallRequest>),
    /// Results for a whole round of tool calls, in request order.
    ToolResponses(Vec<ToolResponse>),
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Agent,
            content: TurnContent::ToolCalls(calls),
        }
    }

    pub fn tool_responses(responses: Vec<ToolResponse>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::ToolResponses(responses),
        }
    }

    /// The text of a `Text` turn.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Append-only, ordered log of turns for one in-flight request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start from the history the client sent along with its message.
    pub fn from_history(history: Vec<Turn>) -> Self {
        Self { turns: history }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolResult;

    #[test]
    fn role_accepts_model_alias() {
        let role: Role = serde_json::from_str(r#""model""#).unwrap();
        assert_eq!(role, Role::Agent);
        let role: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, Role::Agent);
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), r#""agent""#);
    }

    #[test]
    fn conversation_preserves_order() {
        let mut conv = Conversation::from_history(vec![Turn::user("hi"), Turn::agent("hello")]);
        conv.push(Turn::user("search my inbox"));
        assert_eq!(conv.len(), 3);
        assert_eq!(conv.turns()[0].text(), Some("hi"));
        assert_eq!(conv.last().and_then(Turn::text), Some("search my inbox"));
    }

    #[test]
    fn tool_turns_have_expected_roles() {
        let call = ToolCallRequest::new("searchEmails", serde_json::Map::new());
        let response = ToolResponse {
            call_id: call.id.clone(),
            name: call.name.clone(),
            result: ToolResult::failure("boom"),
        };
        assert_eq!(Turn::tool_calls(vec![call]).role, Role::Agent);
        let turn = Turn::tool_responses(vec![response]);
        assert_eq!(turn.role, Role::User);
        assert!(turn.text().is_none());
    }
}
