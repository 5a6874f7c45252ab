//! Participant identifiers.
//!
//! Participants are keyed by the id the chat platform gives them (a Slack
//! user id such as `U04ABCDEF`). The id is opaque: it is compared, stored and
//! echoed back in mentions, never parsed.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_string() {
        let id = ParticipantId::new("U04ABCDEF");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"U04ABCDEF\"");

        let back: ParticipantId = serde_json::from_str("\"U04ABCDEF\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_display_is_raw_id() {
        assert_eq!(ParticipantId::from("U1").to_string(), "U1");
    }
}
