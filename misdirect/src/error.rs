use misdirect_store::{PageId, RuleId, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MisdirectionError {
    /// A stored pattern failed to compile at match time. This aborts the
    /// whole resolution pass: a broken rule is an authoring defect that must
    /// surface, not be skipped over. Callers may catch, log and fall
    /// through to default routing.
    #[error("Invalid pattern {pattern:?} in rule {id}")]
    InvalidPattern {
        id: RuleId,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Vanity mapping for page {0} could not be established")]
    AmbiguousVanityState(PageId),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
