//! Keeps vanity and derived link mappings in step with page writes, moves
//! and removal.

use std::collections::VecDeque;

use misdirect_store::{
    AbstractMappingStore, LinkType, MappingRule, MappingRuleBuilder, PageId,
    RedirectType, RuleId,
};
use misdirect_urls::{join_links, make_relative, UrlNormalizer};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::MisdirectionError;
use crate::pages::AbstractPageTree;

/// Priority assigned to user-entered vanity mappings, keeping them ahead of
/// the priority-0 rules derived from page moves.
pub const VANITY_PRIORITY: i32 = 2;

/// Snapshot of the page fields the synchronizer watches across a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageState {
    pub url_segment: String,
    pub parent_id: Option<PageId>,
    pub vanity_url: Option<String>,
}

/// Reacts to page lifecycle events, maintaining the invariant that a page's
/// vanity URL and previous paths stay reachable through mapping rules.
///
/// Writes are serialized through an internal lock so concurrent page saves
/// cannot interleave a subtree's rule updates.
pub struct MappingSynchronizer {
    store: AbstractMappingStore,
    pages: AbstractPageTree,
    config: SiteConfig,
    normalizer: UrlNormalizer,
    write_lock: Mutex<()>,
}

impl MappingSynchronizer {
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
            write_lock: Mutex::new(()),
        }
    }

    /// Hook for every page write. `before` is `None` on first write.
    ///
    /// Vanity upkeep runs unconditionally; derived mappings are only
    /// recorded when `replace_default` is enabled and the page's URL
    /// segment or parent actually changed.
    pub async fn on_page_written(
        &self,
        page_id: PageId,
        before: Option<&PageState>,
        after: &PageState,
    ) -> Result<(), MisdirectionError> {
        let _guard = self.write_lock.lock().await;

        self.sync_vanity(page_id, after).await?;

        if !self.config.replace_default {
            return Ok(());
        }
        let Some(before) = before else {
            return Ok(());
        };
        if before.url_segment == after.url_segment
            && before.parent_id == after.parent_id
        {
            return Ok(());
        }
        // Pages that were never saved under a real URL leave no trail.
        if before.url_segment.starts_with("new-") {
            return Ok(());
        }
        self.remap_subtree(page_id, before).await
    }

    /// Hook for page removal. `fully_removed` distinguishes permanent
    /// deletion from a mere unpublish/trash, which leaves rules alone.
    pub async fn on_page_deleted(
        &self,
        page_id: PageId,
        fully_removed: bool,
    ) -> Result<(), MisdirectionError> {
        let _guard = self.write_lock.lock().await;

        if !self.config.replace_default || !fully_removed {
            return Ok(());
        }
        let Some(info) = self.pages.resolve(page_id).await else {
            return Ok(());
        };
        let link = self.config.home_normalized(&info.link);
        let frozen = self
            .normalizer
            .normalize(&make_relative(&link, &self.config.base_path));

        // Convert rather than delete, preserving already-indexed inbound
        // links to the page's last known URL.
        let rules = self
            .store
            .find_by_page(page_id, RedirectType::Page)
            .await?;
        for mut rule in rules {
            rule.redirect_type = RedirectType::Link;
            rule.redirect_link = frozen.clone();
            rule.redirect_page_id = None;
            self.store.update(&rule).await?;
            info!(
                page = page_id,
                rule = rule.id,
                target = %frozen,
                "froze mapping for removed page"
            );
        }
        Ok(())
    }

    async fn sync_vanity(
        &self,
        page_id: PageId,
        after: &PageState,
    ) -> Result<(), MisdirectionError> {
        let vanity = after
            .vanity_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        let association = self.vanity_rule(page_id).await?;

        match (vanity, association) {
            (Some(url), Some(mut rule)) => {
                let unified = self.normalizer.normalize(url);
                if rule.mapped_link != unified {
                    rule.mapped_link = unified;
                    self.store.update(&rule).await?;
                    debug!(page = page_id, rule = rule.id, "vanity mapping updated");
                }
            }
            (Some(url), None) => {
                let unified = self.normalizer.normalize(url);
                let id = self
                    .page_mapping(&unified, page_id, VANITY_PRIORITY)
                    .await?;
                if self.store.get(id).await.is_err() {
                    return Err(MisdirectionError::AmbiguousVanityState(page_id));
                }
                info!(
                    page = page_id,
                    rule = id,
                    vanity = %unified,
                    "vanity mapping created"
                );
            }
            (None, Some(rule)) => {
                self.store.delete(rule.id).await?;
                debug!(page = page_id, rule = rule.id, "vanity mapping removed");
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// The page's vanity association, recovered from the store: the newest
    /// page-typed rule at vanity priority.
    async fn vanity_rule(
        &self,
        page_id: PageId,
    ) -> Result<Option<MappingRule>, MisdirectionError> {
        let rules = self
            .store
            .find_by_page(page_id, RedirectType::Page)
            .await?;
        Ok(rules
            .into_iter()
            .filter(|rule| rule.priority == VANITY_PRIORITY)
            .max_by_key(|rule| rule.id))
    }

    /// Record the old paths of a moved or renamed page and all of its
    /// descendants, drafts and trashed pages included.
    async fn remap_subtree(
        &self,
        page_id: PageId,
        before: &PageState,
    ) -> Result<(), MisdirectionError> {
        let old_path = self.previous_path(before).await;
        self.record_move(page_id, &old_path).await?;

        // Iterative walk; each entry carries the old path prefix its
        // mapping should record.
        let mut work: VecDeque<(PageId, String)> = VecDeque::new();
        for child in self.pages.children_of(page_id).await {
            work.push_back((child, old_path.clone()));
        }
        while let Some((child_id, prefix)) = work.pop_front() {
            let Some(info) = self.pages.resolve(child_id).await else {
                continue;
            };
            let child_old =
                join_links([prefix.as_str(), info.url_segment.as_str()]);
            self.record_move(child_id, &child_old).await?;
            for grandchild in self.pages.children_of(child_id).await {
                work.push_back((grandchild, child_old.clone()));
            }
        }
        Ok(())
    }

    /// The page's full path before the write, joined from the root down.
    async fn previous_path(&self, before: &PageState) -> String {
        let mut path = before.url_segment.clone();
        let mut cursor = before.parent_id;
        while let Some(parent_id) = cursor {
            let Some(parent) = self.pages.resolve(parent_id).await else {
                break;
            };
            path = join_links([parent.url_segment.as_str(), path.as_str()]);
            cursor = parent.parent_id;
        }
        path
    }

    async fn record_move(
        &self,
        page_id: PageId,
        old_path: &str,
    ) -> Result<(), MisdirectionError> {
        let mapped = self.normalizer.normalize(old_path);
        self.purge_current_mappings(page_id).await?;
        let rule_id = self.page_mapping(&mapped, page_id, 0).await?;
        debug!(
            page = page_id,
            rule = rule_id,
            mapped = %mapped,
            "recorded previous page path"
        );
        Ok(())
    }

    /// Remove mappings that would now point the page back at its own
    /// current URL.
    async fn purge_current_mappings(
        &self,
        page_id: PageId,
    ) -> Result<(), MisdirectionError> {
        let Some(info) = self.pages.resolve(page_id).await else {
            return Ok(());
        };
        let link = self.config.home_normalized(&info.link);
        let unified = self
            .normalizer
            .normalize(&make_relative(&link, &self.config.base_path));
        let rules = self
            .store
            .find_by_page(page_id, RedirectType::Page)
            .await?;
        for rule in rules {
            if rule.mapped_link == unified {
                self.store.delete(rule.id).await?;
                debug!(
                    page = page_id,
                    rule = rule.id,
                    "purged self-referential mapping"
                );
            }
        }
        Ok(())
    }

    /// Get-or-create a page-typed mapping: an identical rule is reused
    /// rather than duplicated.
    async fn page_mapping(
        &self,
        mapped: &str,
        page_id: PageId,
        priority: i32,
    ) -> Result<RuleId, MisdirectionError> {
        let existing = self
            .store
            .find_by_page(page_id, RedirectType::Page)
            .await?;
        if let Some(rule) = existing
            .iter()
            .filter(|rule| rule.mapped_link == mapped)
            .max_by_key(|rule| rule.id)
        {
            return Ok(rule.id);
        }
        let rule = MappingRuleBuilder::default()
            .link_type(LinkType::Simple)
            .mapped_link(mapped)
            .priority(priority)
            .redirect_type(RedirectType::Page)
            .redirect_page_id(page_id)
            .build()
            .map_err(|err| {
                MisdirectionError::InvalidConfiguration(err.to_string())
            })?;
        Ok(self.store.create(rule).await?)
    }
}
