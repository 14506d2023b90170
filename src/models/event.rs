use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::config::FieldNaming;
use crate::utils::error::AppError;

const INVALID_PAYLOAD: &str = "Invalid JSON payload";

/// A calendar entry as stored in the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub background_color: String,
    /// `YYYY-MM-DD`, stored verbatim.
    pub start: String,
    pub end: String,
    pub description: Option<String>,
}

impl Event {
    pub fn to_wire(self, naming: FieldNaming) -> WireEvent {
        WireEvent {
            event: self,
            naming,
        }
    }
}

/// An [`Event`] paired with the field naming it is rendered under.
#[derive(Debug, Clone)]
pub struct WireEvent {
    event: Event,
    naming: FieldNaming,
}

impl Serialize for WireEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("id", &self.event.id)?;
        map.serialize_entry("title", &self.event.title)?;
        map.serialize_entry(self.naming.background_color(), &self.event.background_color)?;
        map.serialize_entry("start", &self.event.start)?;
        map.serialize_entry("end", &self.event.end)?;
        map.serialize_entry("description", &self.event.description)?;
        map.end()
    }
}

/// Fields for a new event; the id is minted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub background_color: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
}

impl NewEvent {
    pub fn from_json(payload: Value, naming: FieldNaming) -> Result<Self, AppError> {
        let mut body = object_payload(payload)?;
        let color_key = naming.background_color();

        Ok(Self {
            title: take_required(&mut body, "title")?,
            background_color: take_required(&mut body, color_key)?,
            start: take_required(&mut body, "start")?,
            end: take_required(&mut body, "end")?,
            description: match body.remove("description") {
                Some(value) => nullable_string("description", value)?,
                None => None,
            },
        })
    }
}

/// A partial update. `None` leaves the stored value alone; for
/// `description`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub background_color: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<Option<String>>,
}

impl EventPatch {
    pub fn from_json(payload: Value, naming: FieldNaming) -> Result<Self, AppError> {
        Self::from_object(object_payload(payload)?, naming)
    }

    /// Field-level validation of a body already known to be a non-empty object.
    pub fn from_object(mut body: Map<String, Value>, naming: FieldNaming) -> Result<Self, AppError> {
        let color_key = naming.background_color();

        let patch = Self {
            title: take_updatable(&mut body, "title")?,
            background_color: take_updatable(&mut body, color_key)?,
            start: take_updatable(&mut body, "start")?,
            end: take_updatable(&mut body, "end")?,
            description: body
                .remove("description")
                .map(|value| nullable_string("description", value))
                .transpose()?,
        };

        if patch.is_empty() {
            return Err(AppError::ValidationError(
                "No fields to update provided".to_string(),
            ));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.background_color.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
    }
}

/// Accepts only a non-empty JSON object as a request body.
pub fn object_payload(payload: Value) -> Result<Map<String, Value>, AppError> {
    match payload {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(AppError::ValidationError(INVALID_PAYLOAD.to_string())),
    }
}

fn take_required(body: &mut Map<String, Value>, key: &str) -> Result<String, AppError> {
    match body.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(AppError::ValidationError(format!(
            "Missing or empty required field: {key}"
        ))),
        Some(_) => Err(AppError::ValidationError(format!("Field '{key}' must be a string"))),
    }
}

fn take_updatable(body: &mut Map<String, Value>, key: &str) -> Result<Option<String>, AppError> {
    match body.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
        Some(Value::String(_)) | Some(Value::Null) => Err(AppError::ValidationError(format!(
            "Field '{key}' cannot be empty"
        ))),
        Some(_) => Err(AppError::ValidationError(format!("Field '{key}' must be a string"))),
    }
}

fn nullable_string(key: &str, value: Value) -> Result<Option<String>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(AppError::ValidationError(format!(
            "Field '{key}' must be a string or null"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::ValidationError(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_event_with_camel_naming() {
        let payload = json!({
            "title": "Lake Week",
            "backgroundColor": "#123456",
            "start": "2025-07-10",
            "end": "2025-07-17",
            "id": "ignored"
        });

        let new_event = NewEvent::from_json(payload, FieldNaming::Camel).unwrap();
        assert_eq!(new_event.title, "Lake Week");
        assert_eq!(new_event.background_color, "#123456");
        assert_eq!(new_event.description, None);
    }

    #[test]
    fn test_new_event_respects_snake_naming() {
        let snake = json!({
            "title": "Lake Week",
            "background_color": "#123456",
            "start": "2025-07-10",
            "end": "2025-07-17",
            "description": "bring kayaks"
        });
        let new_event = NewEvent::from_json(snake.clone(), FieldNaming::Snake).unwrap();
        assert_eq!(new_event.description.as_deref(), Some("bring kayaks"));

        let err = NewEvent::from_json(snake, FieldNaming::Camel).unwrap_err();
        assert_eq!(
            validation_message(err),
            "Missing or empty required field: backgroundColor"
        );
    }

    #[test]
    fn test_new_event_rejects_empty_title() {
        let payload = json!({
            "title": "",
            "backgroundColor": "#123456",
            "start": "2025-07-10",
            "end": "2025-07-17"
        });
        let err = NewEvent::from_json(payload, FieldNaming::Camel).unwrap_err();
        assert_eq!(validation_message(err), "Missing or empty required field: title");
    }

    #[test]
    fn test_new_event_rejects_non_string_fields() {
        let payload = json!({
            "title": "x",
            "backgroundColor": "#123456",
            "start": 20250710,
            "end": "2025-07-17"
        });
        assert!(NewEvent::from_json(payload, FieldNaming::Camel).is_err());

        let payload = json!({
            "title": "x",
            "backgroundColor": "#123456",
            "start": "2025-07-10",
            "end": "2025-07-17",
            "description": ["a"]
        });
        assert!(NewEvent::from_json(payload, FieldNaming::Camel).is_err());
    }

    #[test]
    fn test_non_object_payloads_are_invalid() {
        for payload in [json!([]), json!("text"), json!(null), json!({})] {
            let err = NewEvent::from_json(payload, FieldNaming::Camel).unwrap_err();
            assert_eq!(validation_message(err), INVALID_PAYLOAD);
        }
    }

    #[test]
    fn test_patch_distinguishes_absent_and_null_description() {
        let patch = EventPatch::from_json(json!({ "title": "New" }), FieldNaming::Camel).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.description, None);

        let patch =
            EventPatch::from_json(json!({ "description": null }), FieldNaming::Camel).unwrap();
        assert_eq!(patch.description, Some(None));
        assert!(patch.title.is_none());
    }

    #[test]
    fn test_patch_without_recognized_fields() {
        let err = EventPatch::from_json(json!({ "colour": "red" }), FieldNaming::Camel).unwrap_err();
        assert_eq!(validation_message(err), "No fields to update provided");
    }

    #[test]
    fn test_patch_rejects_clearing_required_fields() {
        assert!(EventPatch::from_json(json!({ "title": null }), FieldNaming::Camel).is_err());
        assert!(EventPatch::from_json(json!({ "end": "" }), FieldNaming::Camel).is_err());
    }

    #[test]
    fn test_wire_event_uses_configured_color_key() {
        let event = Event {
            id: "abc".to_string(),
            title: "Opening Weekend".to_string(),
            background_color: "#2365A1".to_string(),
            start: "2025-07-04".to_string(),
            end: "2025-07-06".to_string(),
            description: None,
        };

        let camel = serde_json::to_value(event.clone().to_wire(FieldNaming::Camel)).unwrap();
        assert_eq!(camel["backgroundColor"], "#2365A1");
        assert!(camel.get("background_color").is_none());
        assert_eq!(camel["description"], Value::Null);

        let snake = serde_json::to_value(event.to_wire(FieldNaming::Snake)).unwrap();
        assert_eq!(snake["background_color"], "#2365A1");
        assert_eq!(snake["id"], "abc");
    }
}
