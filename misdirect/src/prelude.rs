//! Convenience re-exports for consumers of the crate.

pub use crate::config::{ConfigError, SiteConfig};
pub use crate::engine::{MisdirectionEngine, ResolvedTarget};
pub use crate::error::MisdirectionError;
pub use crate::pages::{
    AbstractPageTree, InMemoryPageTree, PageInfo, PageTree,
};
pub use crate::sync::{MappingSynchronizer, PageState, VANITY_PRIORITY};
pub use misdirect_store::{
    AbstractMappingStore, InMemoryMappingStore, LinkType, MappingRule,
    MappingRuleBuilder, MappingStore, PageId, RedirectType, RuleId, StoreError,
};
pub use misdirect_urls::{
    external_host, is_external_url, join_links, make_relative, UrlNormalizer,
};
