//! The narrow page-tree capability the engine and synchronizer consume,
//! plus an in-memory reference implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use misdirect_store::PageId;
use misdirect_urls::join_links;

use crate::config::SiteConfig;

/// What the page tree knows about a single page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageInfo {
    pub id: PageId,
    /// False once the page is trashed. The tree keeps answering for trashed
    /// pages so their last link stays recoverable.
    pub exists: bool,
    /// Current site-relative link with surrounding slashes, e.g.
    /// `/about-us/team/`.
    pub link: String,
    pub title: String,
    pub parent_id: Option<PageId>,
    pub url_segment: String,
    pub published: bool,
}

#[async_trait]
pub trait PageTree {
    async fn resolve(&self, id: PageId) -> Option<PageInfo>;
    /// All children, drafts and trashed pages included.
    async fn children_of(&self, id: PageId) -> Vec<PageId>;
}

pub type AbstractPageTree = Arc<dyn PageTree + Send + Sync>;

#[derive(Clone, Debug)]
struct PageRecord {
    title: String,
    url_segment: String,
    parent_id: Option<PageId>,
    published: bool,
    trashed: bool,
}

/// Reference page tree backed by a map. Links are computed by walking
/// ancestor segments down from the root; a top-level page carrying the
/// configured home segment links to the bare base path.
pub struct InMemoryPageTree {
    pages: Mutex<HashMap<PageId, PageRecord>>,
    base_path: String,
    home_segment: String,
}

impl InMemoryPageTree {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            base_path: config.base_path.clone(),
            home_segment: config.home_segment.clone(),
        }
    }

    pub fn insert(
        &self,
        id: PageId,
        parent_id: Option<PageId>,
        url_segment: &str,
        title: &str,
    ) {
        let mut pages = self.lock();
        pages.insert(
            id,
            PageRecord {
                title: title.to_string(),
                url_segment: url_segment.to_string(),
                parent_id,
                published: true,
                trashed: false,
            },
        );
    }

    pub fn rename(&self, id: PageId, url_segment: &str) {
        if let Some(record) = self.lock().get_mut(&id) {
            record.url_segment = url_segment.to_string();
        }
    }

    pub fn reparent(&self, id: PageId, parent_id: Option<PageId>) {
        if let Some(record) = self.lock().get_mut(&id) {
            record.parent_id = parent_id;
        }
    }

    pub fn set_published(&self, id: PageId, published: bool) {
        if let Some(record) = self.lock().get_mut(&id) {
            record.published = published;
        }
    }

    /// Trash a page: it stops existing for redirect purposes while its last
    /// link stays recoverable.
    pub fn trash(&self, id: PageId) {
        if let Some(record) = self.lock().get_mut(&id) {
            record.trashed = true;
            record.published = false;
        }
    }

    /// Drop the page record entirely.
    pub fn remove(&self, id: PageId) {
        self.lock().remove(&id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PageId, PageRecord>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn link_of(
        &self,
        pages: &HashMap<PageId, PageRecord>,
        id: PageId,
    ) -> Option<String> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(page_id) = cursor {
            // A parent cycle means the record is corrupt, not resolvable.
            if !seen.insert(page_id) {
                return None;
            }
            let record = pages.get(&page_id)?;
            segments.push(record.url_segment.clone());
            cursor = record.parent_id;
        }
        segments.reverse();

        if segments.len() == 1 && segments[0] == self.home_segment {
            return Some(self.base_path.clone());
        }
        let mut link = self.base_path.clone();
        for segment in &segments {
            link = join_links([link.as_str(), segment.as_str()]);
        }
        if !link.ends_with('/') {
            link.push('/');
        }
        Some(link)
    }
}

impl std::fmt::Debug for InMemoryPageTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pages = self.lock();
        f.debug_struct("InMemoryPageTree")
            .field("pages_count", &pages.len())
            .field("base_path", &self.base_path)
            .finish()
    }
}

#[async_trait]
impl PageTree for InMemoryPageTree {
    async fn resolve(&self, id: PageId) -> Option<PageInfo> {
        let pages = self.lock();
        let record = pages.get(&id)?.clone();
        let link = self.link_of(&pages, id)?;
        Some(PageInfo {
            id,
            exists: !record.trashed,
            link,
            title: record.title,
            parent_id: record.parent_id,
            url_segment: record.url_segment,
            published: record.published,
        })
    }

    async fn children_of(&self, id: PageId) -> Vec<PageId> {
        let pages = self.lock();
        let mut children: Vec<PageId> = pages
            .iter()
            .filter(|(_, record)| record.parent_id == Some(id))
            .map(|(child_id, _)| *child_id)
            .collect();
        children.sort_unstable();
        children
    }
}
