//! The resolution core: scans the ordered rule snapshot for the first
//! matching candidate and computes its redirect target.

use misdirect_store::{AbstractMappingStore, LinkType, MappingRule, RedirectType};
use misdirect_urls::{external_host, is_external_url, join_links, UrlNormalizer};
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::error::MisdirectionError;
use crate::pages::AbstractPageTree;

/// Redirect outcome handed to the transport layer, which owns the status
/// line, `Location` header and POST-forwarding mechanics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target_url: String,
    /// Host component when the target is external, `None` for site-local
    /// targets.
    pub target_host: Option<String>,
    pub response_code: u16,
    pub forward_post: bool,
}

pub struct MisdirectionEngine {
    store: AbstractMappingStore,
    pages: AbstractPageTree,
    config: SiteConfig,
    normalizer: UrlNormalizer,
}

impl MisdirectionEngine {
    pub fn new(
        store: AbstractMappingStore,
        pages: AbstractPageTree,
        config: SiteConfig,
    ) -> Self {
        let normalizer = UrlNormalizer::new(config.site_host.clone());
        Self {
            store,
            pages,
            config,
            normalizer,
        }
    }

    /// Resolve a requested path against the stored link mappings.
    ///
    /// Candidates are scanned in priority-descending, id-descending order
    /// and the first match wins; there is no "more specific path wins"
    /// logic beyond what authors encode via priority. Resolution is
    /// single-hop: a caller wanting chained redirects re-invokes on the new
    /// target.
    ///
    /// A matching rule whose target cannot be computed (missing page, empty
    /// substitution result) is a soft non-match and the scan continues. A
    /// stored pattern that fails to compile aborts the pass with
    /// [`MisdirectionError::InvalidPattern`].
    pub async fn resolve(
        &self,
        path: &str,
        hostname: Option<&str>,
    ) -> Result<Option<ResolvedTarget>, MisdirectionError> {
        let requested = self.normalizer.normalize(path);
        let mut candidates = self.store.list_ordered().await?;
        // Re-sort so the ordering holds even for backends that cannot
        // guarantee it.
        candidates
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(b.id.cmp(&a.id)));

        for rule in &candidates {
            if let Some(restriction) = rule.hostname_restriction.as_deref() {
                if !hostname
                    .is_some_and(|host| host.eq_ignore_ascii_case(restriction))
                {
                    debug!(rule = rule.id, "hostname restriction not met");
                    continue;
                }
            }
            let subject = if rule.includes_hostname {
                match hostname {
                    Some(host) => join_links([host, requested.as_str()]),
                    None => continue,
                }
            } else {
                requested.clone()
            };
            if !self.matches(rule, &subject)? {
                continue;
            }
            debug!(
                rule = rule.id,
                mapped = %rule.mapped_link,
                "link mapping matched"
            );
            if let Some(target) = self.target_for(rule, &subject).await? {
                return Ok(Some(target));
            }
        }
        Ok(None)
    }

    fn matches(
        &self,
        rule: &MappingRule,
        subject: &str,
    ) -> Result<bool, MisdirectionError> {
        match rule.link_type {
            LinkType::Simple => Ok(self
                .normalizer
                .normalize(&rule.mapped_link)
                .eq_ignore_ascii_case(subject)),
            // Substring match; the pattern is deliberately left unanchored
            // to keep legacy redirect behaviour observable.
            LinkType::Regex => Ok(compile_pattern(rule)?.is_match(subject)),
        }
    }

    async fn target_for(
        &self,
        rule: &MappingRule,
        matched: &str,
    ) -> Result<Option<ResolvedTarget>, MisdirectionError> {
        let link = match rule.redirect_type {
            RedirectType::Page => match self.page_link(rule).await {
                Some(link) => link,
                None => return Ok(None),
            },
            RedirectType::Link => {
                let link = if rule.link_type == LinkType::Regex {
                    compile_pattern(rule)?
                        .replace_all(matched, rule.redirect_link.as_str())
                        .into_owned()
                } else {
                    rule.redirect_link.clone()
                };
                if link.is_empty() {
                    debug!(rule = rule.id, "redirect link came up empty");
                    return Ok(None);
                }
                if is_external_url(&link) {
                    link
                } else {
                    join_links([self.config.base_path.as_str(), link.as_str()])
                }
            }
        };
        Ok(Some(ResolvedTarget {
            target_host: external_host(&link),
            target_url: link,
            response_code: rule.effective_response_code(),
            forward_post: rule.forward_post_request,
        }))
    }

    async fn page_link(&self, rule: &MappingRule) -> Option<String> {
        let page_id = rule.redirect_page_id?;
        let info = match self.pages.resolve(page_id).await {
            Some(info) if info.exists => info,
            _ => {
                warn!(rule = rule.id, page = page_id, "redirect page is gone");
                return None;
            }
        };
        let link = self.config.home_normalized(&info.link);
        // Multi-site trees may hand out absolute links; those pass through
        // verbatim.
        Some(if is_external_url(&link) {
            link.trim_start_matches('/').to_string()
        } else {
            link
        })
    }
}

fn compile_pattern(rule: &MappingRule) -> Result<Regex, MisdirectionError> {
    RegexBuilder::new(&rule.mapped_link)
        .case_insensitive(true)
        .build()
        .map_err(|source| MisdirectionError::InvalidPattern {
            id: rule.id,
            pattern: rule.mapped_link.clone(),
            source,
        })
}
