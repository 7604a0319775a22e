pub mod backend;
pub mod rule;
pub mod store;

pub use crate::backend::InMemoryMappingStore;
pub use crate::rule::{
    LinkType, MappingRule, MappingRuleBuilder, MappingRuleBuilderError, PageId,
    RedirectType, RuleId, DEFAULT_RESPONSE_CODE,
};
pub use crate::store::{AbstractMappingStore, MappingStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Backend(String),
    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),
}
