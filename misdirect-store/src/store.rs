//! This module provides a trait for interacting with mapping rule storage.
//! A resolution pass reads one consistent ordered snapshot through it, and
//! the synchronizer drives its create/update/delete operations.

use async_trait::async_trait;
use std::sync::Arc;

use crate::rule::{MappingRule, PageId, RedirectType, RuleId};
use crate::StoreError;

#[async_trait]
pub trait MappingStore {
    /// All rules ordered by priority descending, then id descending.
    async fn list_ordered(&self) -> Result<Vec<MappingRule>, StoreError>;
    async fn get(&self, id: RuleId) -> Result<MappingRule, StoreError>;
    /// Assigns and returns the new rule id.
    async fn create(&self, rule: MappingRule) -> Result<RuleId, StoreError>;
    async fn update(&self, rule: &MappingRule) -> Result<(), StoreError>;
    async fn delete(&self, id: RuleId) -> Result<(), StoreError>;
    /// Rules of the given redirect type referencing a page, id ascending.
    async fn find_by_page(
        &self,
        page_id: PageId,
        redirect_type: RedirectType,
    ) -> Result<Vec<MappingRule>, StoreError>;
}

pub type AbstractMappingStore = Arc<dyn MappingStore + Send + Sync>;
