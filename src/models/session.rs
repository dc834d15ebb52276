use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat-agent session as reported by the remote session service.
///
/// Sessions are pass-through data: the object is kept exactly as received
/// and re-serialized unchanged. The accessors below read the fields the
/// dashboard knows about and return `None` when a field is missing or has
/// an unexpected type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Map<String, Value>);

impl Session {
    pub fn key(&self) -> Option<&str> {
        self.str_field("key")
    }

    pub fn kind(&self) -> Option<&str> {
        self.str_field("kind")
    }

    /// Transport the session arrived on (e.g. a chat platform identifier).
    pub fn channel(&self) -> Option<&str> {
        self.str_field("channel")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_field("displayName")
    }

    pub fn model(&self) -> Option<&str> {
        self.str_field("model")
    }

    pub fn session_id(&self) -> Option<&str> {
        self.str_field("sessionId")
    }

    /// Token count, accepting integral floats such as `1200.0`.
    pub fn total_tokens(&self) -> Option<u64> {
        let value = self.0.get("totalTokens")?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
    }

    /// Epoch milliseconds.
    pub fn updated_at(&self) -> Option<i64> {
        self.0.get("updatedAt").and_then(Value::as_i64)
    }

    /// Raw access to any field, named or not.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Session {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Success body of `GET /api/sessions` on the remote service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_pass_through() {
        let raw = json!({
            "key": "agent:main",
            "kind": "direct",
            "channel": "telegram",
            "displayName": "Ops",
            "totalTokens": 1200,
            "updatedAt": 1706745600000_i64,
            "sessionId": "abc",
            "abortedLastRun": false,
        });

        let session: Session = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(session.channel(), Some("telegram"));
        assert_eq!(session.total_tokens(), Some(1200));
        assert_eq!(session.get("abortedLastRun"), Some(&json!(false)));
        assert_eq!(serde_json::to_value(&session).unwrap(), raw);
    }

    #[test]
    fn sparse_sessions_are_not_filled_in() {
        let raw = r#"{"key":"k"}"#;
        let session: Session = serde_json::from_str(raw).unwrap();

        assert_eq!(session.key(), Some("k"));
        assert!(session.display_name().is_none());
        assert!(session.updated_at().is_none());
        assert_eq!(serde_json::to_string(&session).unwrap(), raw);
    }

    #[test]
    fn null_fields_are_kept_rather_than_rejected() {
        let raw = json!({ "key": null, "channel": null, "updatedAt": null });
        let session: Session = serde_json::from_value(raw.clone()).unwrap();

        assert!(session.key().is_none());
        assert!(session.updated_at().is_none());
        assert_eq!(serde_json::to_value(&session).unwrap(), raw);
    }

    #[test]
    fn float_token_counts_are_accepted() {
        let list: SessionList =
            serde_json::from_str(r#"{"sessions":[{"key":"k","totalTokens":1200.0}]}"#).unwrap();

        assert_eq!(list.sessions[0].total_tokens(), Some(1200));
        assert_eq!(list.sessions[0].get("totalTokens"), Some(&json!(1200.0)));
    }

    #[test]
    fn session_list_ignores_envelope_extras() {
        let list: SessionList =
            serde_json::from_str(r#"{"count":1,"sessions":[{"key":"k"}],"path":"/x"}"#).unwrap();
        assert_eq!(list.sessions.len(), 1);
    }
}
