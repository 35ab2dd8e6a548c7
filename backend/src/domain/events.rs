//! Row-change events forwarded to realtime subscribers.
//!
//! Services publish one event per successful mutation; the change hub fans
//! them out to WebSocket sessions in arrival order. Events are not buffered
//! or replayed for late subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::profile::UserId;

/// Which record family changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Profile,
    Link,
    Notification,
    Tip,
    Payment,
}

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// A single row change, scoped to the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub user_id: UserId,
    pub record: RecordKind,
    pub action: ChangeAction,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_data: Option<Value>,
}

impl ChangeEvent {
    pub fn insert<T: Serialize>(user_id: UserId, record: RecordKind, data: &T) -> Self {
        Self {
            user_id,
            record,
            action: ChangeAction::Insert,
            data: payload(data),
            old_data: None,
        }
    }

    pub fn update<T: Serialize>(
        user_id: UserId,
        record: RecordKind,
        data: &T,
        old_data: Option<&T>,
    ) -> Self {
        Self {
            user_id,
            record,
            action: ChangeAction::Update,
            data: payload(data),
            old_data: old_data.map(payload),
        }
    }

    pub fn delete<T: Serialize>(user_id: UserId, record: RecordKind, old_data: &T) -> Self {
        Self {
            user_id,
            record,
            action: ChangeAction::Delete,
            data: Value::Null,
            old_data: Some(payload(old_data)),
        }
    }
}

fn payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|error| {
        warn!(%error, "change event payload failed to serialise");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewLink, UserId};
    use rstest::rstest;

    #[rstest]
    fn insert_events_carry_no_old_data() {
        let event = ChangeEvent::insert(
            UserId::random(),
            RecordKind::Link,
            &serde_json::json!({ "title": "t" }),
        );
        assert_eq!(event.action, ChangeAction::Insert);
        assert!(event.old_data.is_none());
    }

    #[rstest]
    fn delete_events_carry_only_old_data() {
        let link = NewLink::new("Title", "https://example.com", 0).expect("valid");
        let event = ChangeEvent::delete(UserId::random(), RecordKind::Link, &link.title);
        assert_eq!(event.data, Value::Null);
        assert_eq!(event.old_data, Some(Value::String("Title".into())));
    }

    #[rstest]
    fn events_serialise_with_camel_case_keys() {
        let event = ChangeEvent::insert(UserId::random(), RecordKind::Tip, &42);
        let value = serde_json::to_value(&event).expect("serializes");
        assert!(value.get("userId").is_some());
        assert_eq!(value["record"], "tip");
        assert_eq!(value["action"], "insert");
    }
}
