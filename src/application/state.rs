//! # Bot State
//!
//! Per-user and per-conversation property bags on top of a `StateStore`.
//! A bag is loaded once at the start of a turn, mutated in memory by the handlers
//! and written back by `save_changes` at the end of the turn.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::StateStore;
use crate::domain::types::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    User,
    Conversation,
}

impl StateScope {
    pub fn storage_key(&self, activity: &Activity) -> String {
        match self {
            StateScope::User => format!("user/{}/{}", activity.conversation_id, activity.from),
            StateScope::Conversation => format!("conversation/{}", activity.conversation_id),
        }
    }
}

/// The cached properties of one scope for the current turn.
#[derive(Debug, Clone)]
pub struct PropertyBag {
    key: String,
    values: Map<String, Value>,
    changed: bool,
}

impl PropertyBag {
    pub fn new(key: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            values,
            changed: false,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.values
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Reads `name`, storing `default` first if it is absent.
    pub fn get_or<T: Serialize + DeserializeOwned>(&mut self, name: &str, default: T) -> BotResult<T> {
        if let Some(value) = self.get(name) {
            return Ok(value);
        }
        self.set(name, &default)?;
        Ok(default)
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> BotResult<()> {
        let value = serde_json::to_value(value).map_err(|e| BotError::Storage(e.to_string()))?;
        if self.values.get(name) != Some(&value) {
            self.values.insert(name.to_string(), value);
            self.changed = true;
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) {
        if self.values.remove(name).is_some() {
            self.changed = true;
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.changed = true;
    }
}

/// Loads and saves property bags for one scope.
#[derive(Clone)]
pub struct BotState {
    store: Arc<dyn StateStore>,
    scope: StateScope,
}

impl BotState {
    pub fn new(store: Arc<dyn StateStore>, scope: StateScope) -> Self {
        Self { store, scope }
    }

    pub fn user(store: Arc<dyn StateStore>) -> Self {
        Self::new(store, StateScope::User)
    }

    pub fn conversation(store: Arc<dyn StateStore>) -> Self {
        Self::new(store, StateScope::Conversation)
    }

    pub async fn load(&self, activity: &Activity) -> BotResult<PropertyBag> {
        let key = self.scope.storage_key(activity);
        let values = match self.store.read(&key).await? {
            Some(Value::Object(map)) => map,
            Some(other) => {
                tracing::warn!("Discarding non-object state under {}: {}", key, other);
                Map::new()
            }
            None => Map::new(),
        };
        Ok(PropertyBag::new(key, values))
    }

    /// Writes the bag back if it changed. An emptied bag deletes its key.
    pub async fn save_changes(&self, bag: &mut PropertyBag) -> BotResult<()> {
        if !bag.is_changed() {
            return Ok(());
        }
        if bag.values.is_empty() {
            self.store.delete(&bag.key).await?;
        } else {
            self.store
                .write(&bag.key, Value::Object(bag.values.clone()))
                .await?;
        }
        bag.changed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use serde_json::json;

    fn activity() -> Activity {
        Activity::message("!room:example.org", "@ann:example.org", "@bot:example.org", "hi")
    }

    #[test]
    fn test_storage_keys() {
        let a = activity();
        assert_eq!(
            StateScope::User.storage_key(&a),
            "user/!room:example.org/@ann:example.org"
        );
        assert_eq!(
            StateScope::Conversation.storage_key(&a),
            "conversation/!room:example.org"
        );
    }

    #[test]
    fn test_get_or_stores_default() {
        let mut bag = PropertyBag::new("k", Map::new());
        assert!(bag.get_or("wants_info", true).unwrap());
        assert!(bag.is_changed());
        assert_eq!(bag.get::<bool>("wants_info"), Some(true));

        bag.set("wants_info", &false).unwrap();
        assert!(!bag.get_or("wants_info", true).unwrap());
    }

    #[test]
    fn test_set_same_value_is_not_a_change() {
        let mut values = Map::new();
        values.insert("wants_info".to_string(), json!(true));
        let mut bag = PropertyBag::new("k", values);
        bag.set("wants_info", &true).unwrap();
        assert!(!bag.is_changed());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let store = Arc::new(MemoryStore::new());
        let state = BotState::user(store.clone());
        let a = activity();

        let mut bag = state.load(&a).await.unwrap();
        bag.set("user_name", "Ann").unwrap();
        state.save_changes(&mut bag).await.unwrap();
        assert!(!bag.is_changed());

        let reloaded = state.load(&a).await.unwrap();
        assert_eq!(reloaded.get::<String>("user_name").as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_cleared_bag_deletes_key() {
        let store = Arc::new(MemoryStore::new());
        let state = BotState::conversation(store.clone());
        let a = activity();

        let mut bag = state.load(&a).await.unwrap();
        bag.set("dialog_state", &json!([{"id": "what_data"}])).unwrap();
        state.save_changes(&mut bag).await.unwrap();
        assert_eq!(store.keys().await, vec!["conversation/!room:example.org"]);

        bag.clear();
        state.save_changes(&mut bag).await.unwrap();
        assert!(store.keys().await.is_empty());
    }
}
