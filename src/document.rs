//! Serialization adapter between bindings and an opaque document tree.
//!
//! Grounded on `load_binding`/`load_bindings`/`save_bindings_helper`/
//! `save_hotkey`/`save_context_hotkeys` in the original hotkey
//! subsystem's save/load code, including the field shape (`shift`/
//! `control`/`alt`/`command` booleans present only when set, plus a
//! `key` name) and the "drop the fully-empty combination" loader rule.
//!
//! The generic [`Document`] interface is implemented here by
//! [`JsonDocument`], a thin wrapper over `serde_json::Value`; the
//! registry itself stores preloaded per-context documents as plain
//! `serde_json::Value` since this crate has exactly one document
//! backing store.

use serde_json::{
    Map,
    Value,
};

use crate::key::{
    key_from_name,
    name_of,
    KeyCombination,
    Modifiers,
};
use crate::registry::{
    Binding,
    HotkeyId,
};

/// The get/set/array operations needed against an opaque document node.
/// Implemented here only by [`JsonDocument`]; a caller with a different
/// backing document format implements this trait themselves.
pub trait Document {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&mut self, key: &str, value: bool);
    fn get_str(&self, key: &str) -> Option<&str>;
    fn set_str(&mut self, key: &str, value: &str);
    fn get_array(&self, key: &str) -> Option<&[Value]>;
    fn array_push(&mut self, key: &str, item: Value);
}

/// `serde_json::Value`-backed [`Document`] implementation.
#[derive(Clone, Debug, Default)]
pub struct JsonDocument(Value);

impl JsonDocument {
    pub fn new_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }
}

impl Document for JsonDocument {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), Value::Bool(value));
        }
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn set_str(&mut self, key: &str, value: &str) {
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.0.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    fn array_push(&mut self, key: &str, item: Value) {
        if let Value::Object(map) = &mut self.0 {
            match map.get_mut(key) {
                Some(Value::Array(arr)) => arr.push(item),
                _ => {
                    map.insert(key.to_string(), Value::Array(vec![item]));
                }
            }
        }
    }
}

/// Builds a [`KeyCombination`] from one saved-binding JSON object,
/// mirroring `load_modifier`/`load_binding`. Missing or wrong-typed
/// fields degrade to "not set" rather than erroring.
fn combination_from_value(value: &Value) -> KeyCombination {
    let mut modifiers = Modifiers::NONE;
    if value.get("shift").and_then(Value::as_bool).unwrap_or(false) {
        modifiers = modifiers + Modifiers::SHIFT;
    }
    if value.get("control").and_then(Value::as_bool).unwrap_or(false) {
        modifiers = modifiers + Modifiers::CONTROL;
    }
    if value.get("alt").and_then(Value::as_bool).unwrap_or(false) {
        modifiers = modifiers + Modifiers::ALT;
    }
    if value.get("command").and_then(Value::as_bool).unwrap_or(false) {
        modifiers = modifiers + Modifiers::COMMAND;
    }
    let key = value
        .get("key")
        .and_then(Value::as_str)
        .map(key_from_name)
        .unwrap_or_default();
    KeyCombination::new(modifiers, key)
}

/// Loads every non-empty combination out of a saved-binding array,
/// dropping entries whose combination is fully empty: such a binding
/// could never fire, so it is never created in the first place.
pub fn load_combinations(array: &Value) -> Vec<KeyCombination> {
    let Some(items) = array.as_array() else {
        tracing::debug!("load_combinations: expected a JSON array, skipping");
        return Vec::new();
    };
    items
        .iter()
        .map(combination_from_value)
        .filter(|combo| !combo.is_empty())
        .collect()
}

/// One saved-binding object: `{"shift": bool?, ..., "key": string}`,
/// each modifier field present only when set.
fn combination_to_value(combination: KeyCombination) -> Value {
    let mut map = Map::new();
    if combination.modifiers.contains(Modifiers::SHIFT) {
        map.insert("shift".to_string(), Value::Bool(true));
    }
    if combination.modifiers.contains(Modifiers::CONTROL) {
        map.insert("control".to_string(), Value::Bool(true));
    }
    if combination.modifiers.contains(Modifiers::ALT) {
        map.insert("alt".to_string(), Value::Bool(true));
    }
    if combination.modifiers.contains(Modifiers::COMMAND) {
        map.insert("command".to_string(), Value::Bool(true));
    }
    map.insert(
        "key".to_string(),
        Value::String(name_of(combination.key).to_string()),
    );
    Value::Object(map)
}

/// Saves every binding owning `id` as a JSON array, per
/// `save_bindings_helper`/`save_hotkey`.
pub fn save_hotkey<'a>(id: HotkeyId, bindings: impl Iterator<Item = &'a Binding>) -> Value {
    let items: Vec<Value> = bindings
        .filter(|b| b.hotkey_id == id)
        .map(|b| combination_to_value(b.combination))
        .collect();
    Value::Array(items)
}

/// Saves a registerer context's bindings as `{name: [binding, ...], ...}`,
/// or `Value::Null` if the context owns nothing, per
/// `save_context_hotkeys`.
pub fn save_registerer_context<'a>(
    owned: impl Iterator<Item = (&'a str, HotkeyId)>,
    bindings: &'a [Binding],
) -> Value {
    let mut map = Map::new();
    for (name, id) in owned {
        let array = save_hotkey(id, bindings.iter());
        map.insert(name.to_string(), array);
    }
    if map.is_empty() {
        Value::Null
    } else {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PortableKey;
    use serde_json::json;

    #[test]
    fn empty_combination_is_dropped_on_load() {
        let array = json!([{"key": "OBS_KEY_NONE"}, {"control": true, "key": "OBS_KEY_A"}]);
        let combos = load_combinations(&array);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].key, PortableKey::A);
        assert!(combos[0].modifiers.contains(Modifiers::CONTROL));
    }

    #[test]
    fn save_omits_unset_modifier_fields() {
        let combo = combination_to_value(KeyCombination::new(Modifiers::NONE, PortableKey::F1));
        assert_eq!(combo, json!({"key": "OBS_KEY_F1"}));
    }

    #[test]
    fn save_includes_only_set_modifiers() {
        let combo = combination_to_value(KeyCombination::new(
            Modifiers::SHIFT + Modifiers::ALT,
            PortableKey::A,
        ));
        assert_eq!(combo, json!({"shift": true, "alt": true, "key": "OBS_KEY_A"}));
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let array = json!([{"key": 42}, {"key": "OBS_KEY_B"}]);
        let combos = load_combinations(&array);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].key, PortableKey::B);
    }

    #[test]
    fn round_trip_preserves_combination_set() {
        let original = vec![
            KeyCombination::new(Modifiers::CONTROL, PortableKey::A),
            KeyCombination::new(Modifiers::NONE, PortableKey::F1),
        ];
        let saved = Value::Array(original.iter().copied().map(combination_to_value).collect());
        let loaded = load_combinations(&saved);
        assert_eq!(loaded, original);
    }
}
