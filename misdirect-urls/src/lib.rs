//! Link unification and classification utilities.
//!
//! This crate provides the canonical "unified" form link mappings are
//! stored and compared in, helpers for joining and relativizing path
//! fragments, and the strict external-URL classification used to decide
//! whether a redirect target leaves the site.

pub mod classify;
pub mod normalize;

pub use classify::{external_host, is_external_url};
pub use normalize::{join_links, make_relative, UrlNormalizer};

// Re-export
pub use url;
