//! Event context: the named key/value bag a task carries.
//!
//! Actions, trigger conditions, priorities and request validators all read
//! from and write to the context of the task they run as. It is the only
//! channel through which those pieces exchange data.
//!
//! ## Example
//!
//! ```
//! use ccg_sync::core::{ContextValue, EventContext};
//!
//! let mut ctx = EventContext::new("Damage")
//!     .with("amount", 3)
//!     .with("lethal", false);
//!
//! assert_eq!(ctx.get_int("amount"), Some(3));
//! assert_eq!(ctx.get_bool("lethal"), Some(false));
//! assert_eq!(ctx.get_int("missing"), None);
//!
//! ctx.set("amount", 5);
//! assert_eq!(ctx.get_int_or("amount", 0), 5);
//! assert_eq!(ctx.get("amount"), Some(&ContextValue::Int(5)));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// A single context value.
///
/// State values are kept small and comparable so that contexts can be
/// journaled and compared between peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextValue {
    Int(i64),
    Bool(bool),
    Text(String),
    Player(PlayerId),
    List(Vec<ContextValue>),
}

impl ContextValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_player(&self) -> Option<PlayerId> {
        match self {
            Self::Player(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[ContextValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ContextValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<PlayerId> for ContextValue {
    fn from(v: PlayerId) -> Self {
        Self::Player(v)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// A named, mutable key/value bag.
///
/// The name doubles as the event name when the context is passed to
/// `do_event`: triggers are looked up under it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    name: String,
    values: FxHashMap<String, ContextValue>,
}

impl EventContext {
    /// Create an empty context with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: FxHashMap::default(),
        }
    }

    /// Set a value (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.set(key, value);
        self
    }

    /// The event/task label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set a value, returning the previous one if any.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get an integer value. Absent keys and other value kinds yield `None`.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ContextValue::as_int)
    }

    /// Get an integer value with default.
    #[must_use]
    pub fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ContextValue::as_bool)
    }

    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ContextValue::as_text)
    }

    #[must_use]
    pub fn get_player(&self, key: &str) -> Option<PlayerId> {
        self.get(key).and_then(ContextValue::as_player)
    }

    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[ContextValue]> {
        self.get(key).and_then(ContextValue::as_list)
    }

    /// Add `delta` to an integer value (absent counts as 0).
    pub fn add_int(&mut self, key: &str, delta: i64) -> i64 {
        let value = self.get_int_or(key, 0) + delta;
        self.values.insert(key.to_string(), ContextValue::Int(value));
        value
    }

    /// Copy every entry of `other` into this context, overwriting shared keys.
    ///
    /// The name of `self` is kept.
    pub fn merge(&mut self, other: &EventContext) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let ctx = EventContext::new("Play")
            .with("card", 4)
            .with("target", PlayerId::new(1))
            .with("label", "fireball")
            .with("cards", vec![1, 2, 3]);

        assert_eq!(ctx.name(), "Play");
        assert_eq!(ctx.get_int("card"), Some(4));
        assert_eq!(ctx.get_player("target"), Some(PlayerId::new(1)));
        assert_eq!(ctx.get_text("label"), Some("fireball"));
        assert_eq!(ctx.get_list("cards").map(<[ContextValue]>::len), Some(3));
    }

    #[test]
    fn test_wrong_kind_is_absent() {
        let ctx = EventContext::new("Play").with("card", 4);
        assert_eq!(ctx.get_bool("card"), None);
        assert_eq!(ctx.get_text("card"), None);
        assert_eq!(ctx.get_int_or("nope", -1), -1);
    }

    #[test]
    fn test_merge_overwrites_and_keeps_name() {
        let mut request = EventContext::new("Choose").with("a", 1).with("b", 2);
        let response = EventContext::new("Answer").with("b", 20).with("c", 30);

        request.merge(&response);

        assert_eq!(request.name(), "Choose");
        assert_eq!(request.get_int("a"), Some(1));
        assert_eq!(request.get_int("b"), Some(20));
        assert_eq!(request.get_int("c"), Some(30));
        assert_eq!(request.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_add_int() {
        let mut ctx = EventContext::new("Count");
        assert_eq!(ctx.add_int("hits", 2), 2);
        assert_eq!(ctx.add_int("hits", 3), 5);
    }

    #[test]
    fn test_serialization() {
        let ctx = EventContext::new("Play").with("card", 4).with("ok", true);
        let json = serde_json::to_string(&ctx).unwrap();
        let back: EventContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }
}
