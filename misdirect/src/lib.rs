//! # Misdirect - link mapping and redirect resolution
//!
//! `misdirect` resolves incoming request URLs to redirect targets by
//! matching them against a prioritized, ordered set of link-mapping rules,
//! each either an exact-match rule or a regular-expression rule, and each
//! pointing at a literal URL or at a page resource owned by a page tree.
//!
//! ## Features
//!
//! - **Deterministic resolution**: rules are scanned by priority, then
//!   recency; the first match wins, and resolution is single-hop.
//! - **Exact and pattern rules**: case-insensitive exact matching over
//!   unified links, or unanchored case-insensitive patterns with capture
//!   substitution into the redirect target.
//! - **Hostname scoping**: per-rule hostname subjects and legacy hostname
//!   restrictions.
//! - **Page-backed targets**: rules may point at pages; their current link
//!   is resolved at request time, with home-page normalization.
//! - **Vanity and derived mappings**: a synchronizer keeps per-page vanity
//!   rules and auto-derived "previous path" rules consistent across page
//!   renames, moves and removal, including whole-subtree updates.
//! - **Pluggable storage**: the rule store and page tree are narrow async
//!   traits; in-memory implementations ship in the box.
//!
//! ## Getting started
//!
//! ```toml
//! [dependencies]
//! misdirect = "0.1"
//! ```
//!
//! ## Modules
//!
//! - `config`: typed site configuration, loadable from YAML.
//! - `engine`: the mapping resolution engine.
//! - `pages`: the page-tree capability interface.
//! - `sync`: the vanity/derived mapping synchronizer.
pub mod config;
pub mod engine;
pub mod error;
pub mod pages;
pub mod prelude;
pub mod sync;

pub use misdirect_store as store;
pub use misdirect_urls as urls;

pub use config::{ConfigError, SiteConfig};
pub use engine::{MisdirectionEngine, ResolvedTarget};
pub use error::MisdirectionError;
pub use pages::{AbstractPageTree, InMemoryPageTree, PageInfo, PageTree};
pub use sync::{MappingSynchronizer, PageState, VANITY_PRIORITY};

// re-export
pub use async_trait;
pub use regex;
pub use serde;
pub use serde_yaml;
pub use thiserror;
pub use tracing;
pub use tracing_subscriber;
