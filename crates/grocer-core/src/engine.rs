//! Catalog filter/group engine.
//!
//! Owns the full catalog and derives the view the shell renders: the
//! filtered items, grouped by chain, with an independent page cursor and
//! expanded flag per group.
//!
//! # Recompute Rules
//!
//! Whenever the catalog or the criteria change:
//!
//! 1. Filter the catalog with [`FilterCriteria::matches`] (source order kept).
//! 2. Group survivors by chain in first-seen order.
//! 3. Reset every cursor to page 1.
//! 4. Expand every group, unless a chain filter is active, in which case
//!    only that chain's group starts expanded.
//!
//! Paging never triggers a recompute, and [`CatalogEngine::set_page`] only
//! touches the addressed group.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::filter::FilterCriteria;
use crate::models::GroceryItem;

/// Items shown per group page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where the catalog is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    Loading,
    Loaded,
    /// The last load failed and no catalog was available.
    Failed(String),
}

/// What the shell should render. Loading, failure, and an empty result
/// are distinct states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Failed(String),
    Empty,
    Ready,
}

/// A chain's slice of the filtered result.
#[derive(Debug, Clone)]
pub struct ChainGroup {
    chain: String,
    /// Indices into the engine's catalog, in source order.
    members: Vec<usize>,
    page: usize,
    expanded: bool,
}

impl ChainGroup {
    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Current 1-based page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

/// Serializable snapshot of one group's current page.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView<'a> {
    pub chain: &'a str,
    pub total_items: usize,
    pub page: usize,
    pub total_pages: usize,
    pub expanded: bool,
    pub items: Vec<&'a GroceryItem>,
}

/// Distinct values for the filter drop-downs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub chains: Vec<String>,
    pub types: Vec<String>,
}

/// The filter/group/paginate engine.
#[derive(Debug)]
pub struct CatalogEngine {
    catalog: Vec<GroceryItem>,
    criteria: FilterCriteria,
    filtered: Vec<usize>,
    groups: Vec<ChainGroup>,
    page_size: usize,
    state: LoadState,
    /// Set once any catalog has been adopted.
    has_catalog: bool,
}

impl Default for CatalogEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CatalogEngine {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            catalog: Vec::new(),
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            groups: Vec::new(),
            page_size: page_size.max(1),
            state: LoadState::Idle,
            has_catalog: false,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn mark_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Record a failed load. If a catalog was adopted earlier it stays in
    /// place and the view returns to `Loaded`; otherwise the view fails.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.state = if self.has_catalog {
            LoadState::Loaded
        } else {
            LoadState::Failed(message.into())
        };
    }

    /// Whether a catalog has been adopted, even if a reload is in flight.
    pub fn has_catalog(&self) -> bool {
        self.has_catalog
    }

    /// Replace the catalog and recompute the view with the current criteria.
    pub fn set_catalog(&mut self, items: Vec<GroceryItem>) {
        self.catalog = items;
        self.state = LoadState::Loaded;
        self.has_catalog = true;
        self.recompute();
    }

    pub fn catalog(&self) -> &[GroceryItem] {
        &self.catalog
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replace the criteria and recompute the view.
    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, item)| self.criteria.matches(item))
            .map(|(idx, _)| idx)
            .collect();

        let mut by_chain: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<ChainGroup> = Vec::new();
        for &idx in &self.filtered {
            let chain = self.catalog[idx].chain.as_str();
            let slot = *by_chain.entry(chain).or_insert_with(|| {
                groups.push(ChainGroup {
                    chain: chain.to_string(),
                    members: Vec::new(),
                    page: 1,
                    expanded: false,
                });
                groups.len() - 1
            });
            groups[slot].members.push(idx);
        }

        for group in &mut groups {
            group.expanded = match self.criteria.chain {
                Some(ref c) => group.chain == *c,
                None => true,
            };
        }

        tracing::debug!(
            catalog = self.catalog.len(),
            filtered = self.filtered.len(),
            groups = groups.len(),
            "recomputed catalog view"
        );
        self.groups = groups;
    }

    /// The filtered items in catalog order.
    pub fn filtered(&self) -> Vec<&GroceryItem> {
        self.filtered.iter().map(|&i| &self.catalog[i]).collect()
    }

    pub fn groups(&self) -> &[ChainGroup] {
        &self.groups
    }

    pub fn group(&self, chain: &str) -> Option<&ChainGroup> {
        self.groups.iter().find(|g| g.chain == chain)
    }

    fn group_mut(&mut self, chain: &str) -> Option<&mut ChainGroup> {
        self.groups.iter_mut().find(|g| g.chain == chain)
    }

    /// Number of pages for a chain; zero when the chain has no items.
    pub fn total_pages(&self, chain: &str) -> usize {
        self.group(chain)
            .map(|g| pages_for(g.len(), self.page_size))
            .unwrap_or(0)
    }

    /// Items on `page` (1-based) of a chain's group, clamped to the valid
    /// range. Unknown chains yield an empty list.
    pub fn get_page(&self, chain: &str, page: usize) -> Vec<&GroceryItem> {
        match self.group(chain) {
            Some(group) => self.page_slice(group, page),
            None => Vec::new(),
        }
    }

    fn page_slice(&self, group: &ChainGroup, page: usize) -> Vec<&GroceryItem> {
        let page = clamp_page(page, pages_for(group.len(), self.page_size));
        let start = (page - 1) * self.page_size;
        group
            .members
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| &self.catalog[i])
            .collect()
    }

    /// Move one group's cursor. Returns the clamped page, or `None` if the
    /// chain has no group.
    pub fn set_page(&mut self, chain: &str, page: usize) -> Option<usize> {
        let page_size = self.page_size;
        let group = self.group_mut(chain)?;
        group.page = clamp_page(page, pages_for(group.len(), page_size));
        Some(group.page)
    }

    /// Flip a group's expanded flag. Returns the new value.
    pub fn toggle_expanded(&mut self, chain: &str) -> Option<bool> {
        let group = self.group_mut(chain)?;
        group.expanded = !group.expanded;
        Some(group.expanded)
    }

    /// Render state for the shell.
    pub fn status(&self) -> ViewStatus {
        match self.state {
            LoadState::Idle | LoadState::Loading => ViewStatus::Loading,
            LoadState::Failed(ref msg) => ViewStatus::Failed(msg.clone()),
            LoadState::Loaded if self.filtered.is_empty() => ViewStatus::Empty,
            LoadState::Loaded => ViewStatus::Ready,
        }
    }

    /// Every group at its current cursor.
    pub fn views(&self) -> Vec<GroupView<'_>> {
        self.groups
            .iter()
            .map(|g| GroupView {
                chain: &g.chain,
                total_items: g.len(),
                page: g.page,
                total_pages: pages_for(g.len(), self.page_size),
                expanded: g.expanded,
                items: self.page_slice(g, g.page),
            })
            .collect()
    }

    /// Distinct chains and types across the whole catalog, sorted.
    pub fn filter_options(&self) -> FilterOptions {
        let chains: BTreeSet<&str> = self.catalog.iter().map(|i| i.chain.as_str()).collect();
        let types: BTreeSet<&str> = self.catalog.iter().map(|i| i.item_type.as_str()).collect();
        FilterOptions {
            chains: chains.into_iter().map(str::to_string).collect(),
            types: types.into_iter().map(str::to_string).collect(),
        }
    }
}

fn pages_for(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size)
}

fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}
