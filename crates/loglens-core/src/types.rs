use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A question typed or selected by the user.
    User,
    /// An answer (or error report) produced on behalf of the agent.
    Assistant,
}

impl Role {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

// =============================================================================
// Message
// =============================================================================

/// One entry in a conversation transcript.
///
/// Messages are immutable once appended to a session's history: nothing
/// edits or removes an individual message, only `reset_conversation` drops
/// the whole transcript.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID.
    pub id: Uuid,
    /// Who authored the message.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// PNG-encoded chart captured from the agent invocation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Vec<u8>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, None)
    }

    /// Create an assistant message without a chart.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    /// Create an assistant message carrying a rendered chart.
    pub fn assistant_with_chart(content: impl Into<String>, chart: Vec<u8>) -> Self {
        Self::new(Role::Assistant, content, Some(chart))
    }

    fn new(role: Role, content: impl Into<String>, chart: Option<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            chart,
            created_at: Utc::now(),
        }
    }

    /// Whether this message carries a chart payload.
    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
        let role: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_user_message() {
        let msg = Message::user("how many rows?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "how many rows?");
        assert!(!msg.has_chart());
    }

    #[test]
    fn test_assistant_message_with_chart() {
        let msg = Message::assistant_with_chart("here is a plot", vec![1, 2, 3]);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.has_chart());
        assert_eq!(msg.chart.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("a");
        let b = Message::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_message_serializes_without_chart_field_when_absent() {
        let msg = Message::assistant("plain answer");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("chart"));
    }
}
