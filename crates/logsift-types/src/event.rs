//! The unit of data flowing through a pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One structured record moving through the pipeline.
///
/// An event is a JSON object; processors mutate it in place. An event with no
/// fields is *empty*; the engine never forwards empty events to processors
/// or to the output connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    /// Create an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build an event from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the value back if it is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }

    /// Returns `true` if the event carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Remove every field, leaving the event empty.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns `true` if the top-level field exists.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a top-level field, returning any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Remove a top-level field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Borrow the underlying object map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Copy the event into a `serde_json::Value`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consume the event into a `serde_json::Value`.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Event {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> Event {
        Event::from_value(value).expect("object literal")
    }

    #[test]
    fn new_event_is_empty() {
        let ev = Event::new();
        assert!(ev.is_empty());
        assert_eq!(ev.len(), 0);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        let rejected = Event::from_value(json!(["not", "an", "object"]));
        assert_eq!(rejected.unwrap_err(), json!(["not", "an", "object"]));
    }

    #[test]
    fn clear_empties_the_event() {
        let mut ev = event(json!({"message": "hello", "level": "info"}));
        assert!(!ev.is_empty());
        ev.clear();
        assert!(ev.is_empty());
    }

    #[test]
    fn insert_does_not_clobber_silently() {
        let mut ev = event(json!({"message": "hello"}));
        let previous = ev.insert("message", json!("replaced"));
        assert_eq!(previous, Some(json!("hello")));
        assert_eq!(ev.get("message"), Some(&json!("replaced")));
    }

    #[test]
    fn value_roundtrip_preserves_fields() {
        let ev = event(json!({"a": 1, "b": {"nested": true}}));
        let back = Event::from_value(ev.to_value()).unwrap();
        assert_eq!(ev, back);
    }

    #[test]
    fn serde_transparent() {
        let ev = event(json!({"message": "hello"}));
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"message":"hello"}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
