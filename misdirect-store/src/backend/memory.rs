//! In-memory implementation of the MappingStore trait. Rules live in a map
//! keyed by their id; ids are assigned sequentially on create so recency
//! ordering holds.
use crate::rule::{MappingRule, PageId, RedirectType, RuleId};
use crate::{MappingStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct InMemoryMappingStore {
    pub rules: Mutex<HashMap<RuleId, MappingRule>>,
    counter: Mutex<RuleId>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(HashMap::new()),
            counter: Mutex::new(0),
        }
    }
}

impl Default for InMemoryMappingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn list_ordered(&self) -> Result<Vec<MappingRule>, StoreError> {
        let rules = self
            .rules
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut ordered: Vec<MappingRule> = rules.values().cloned().collect();
        ordered.sort_by(|a, b| {
            b.priority.cmp(&a.priority).then(b.id.cmp(&a.id))
        });
        Ok(ordered)
    }

    async fn get(&self, id: RuleId) -> Result<MappingRule, StoreError> {
        let rules = self
            .rules
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rules.get(&id).cloned().ok_or(StoreError::RuleNotFound(id))
    }

    async fn create(&self, mut rule: MappingRule) -> Result<RuleId, StoreError> {
        let mut counter = self
            .counter
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut rules = self
            .rules
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        *counter += 1;
        rule.id = *counter;
        let id = rule.id;
        rules.insert(id, rule);
        Ok(id)
    }

    async fn update(&self, rule: &MappingRule) -> Result<(), StoreError> {
        let mut rules = self
            .rules
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if !rules.contains_key(&rule.id) {
            return Err(StoreError::RuleNotFound(rule.id));
        }
        rules.insert(rule.id, rule.clone());
        Ok(())
    }

    async fn delete(&self, id: RuleId) -> Result<(), StoreError> {
        let mut rules = self
            .rules
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        rules.remove(&id).ok_or(StoreError::RuleNotFound(id))?;
        Ok(())
    }

    async fn find_by_page(
        &self,
        page_id: PageId,
        redirect_type: RedirectType,
    ) -> Result<Vec<MappingRule>, StoreError> {
        let rules = self
            .rules
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut found: Vec<MappingRule> = rules
            .values()
            .filter(|rule| {
                rule.redirect_type == redirect_type
                    && rule.redirect_page_id == Some(page_id)
            })
            .cloned()
            .collect();
        found.sort_by_key(|rule| rule.id);
        Ok(found)
    }
}

impl std::fmt::Debug for InMemoryMappingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules = self.rules.lock().unwrap();
        f.debug_struct("InMemoryMappingStore")
            .field("rules_count", &rules.len())
            .finish()
    }
}
