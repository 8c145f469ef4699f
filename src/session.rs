//! Browsing session: the single state object the shell owns.
//!
//! A [`Session`] holds the catalog engine, the selection, the cache handle,
//! and the recipe panel. Nothing lives in statics; every operation takes
//! the session by reference, so the CLI, tests, or any other front end can
//! drive it directly.
//!
//! # Loading
//!
//! [`Session::load`] consults the cache first and falls back to the
//! catalog source. Each load takes a [`RequestTicket`]; a response whose
//! ticket has been superseded by a newer load is discarded instead of
//! overwriting newer state. Front ends that run the fetch on their own
//! task use the split form: [`Session::begin_load`], then
//! [`Session::finish_fetch`] with the result.

use grocer_core::cache::{CatalogCache, KeyValueStore};
use grocer_core::engine::{CatalogEngine, ViewStatus};
use grocer_core::filter::FilterCriteria;
use grocer_core::models::{GroceryItem, ItemId, Recipe};
use grocer_core::selection::SelectionSet;
use grocer_core::sequence::{RequestSequencer, RequestTicket};

use crate::catalog::CatalogSource;
use crate::config::Config;
use crate::error::{FetchError, RequestError};
use crate::file_store::FileStore;
use crate::llm::RecipeSource;

/// How a load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Adopted a fresh cache entry without touching the network.
    FromCache { items: usize },
    /// Fetched from the backend and refreshed the cache.
    Fetched { items: usize },
    /// The fetch failed but a valid cache entry was available.
    CacheFallback { items: usize },
    /// A newer load was started; this response was dropped.
    Stale,
}

/// Recipe panel state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RecipePanel {
    #[default]
    Idle,
    Ready(Recipe),
    Failed(String),
}

pub struct Session<S: KeyValueStore> {
    engine: CatalogEngine,
    selection: SelectionSet,
    cache: Option<CatalogCache<S>>,
    loads: RequestSequencer,
    recipe: RecipePanel,
}

impl<S: KeyValueStore> Session<S> {
    /// `cache` is `None` when caching is disabled.
    pub fn new(page_size: usize, cache: Option<CatalogCache<S>>) -> Self {
        Self {
            engine: CatalogEngine::new(page_size),
            selection: SelectionSet::new(),
            cache,
            loads: RequestSequencer::new(),
            recipe: RecipePanel::Idle,
        }
    }

    pub fn engine(&self) -> &CatalogEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CatalogEngine {
        &mut self.engine
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn recipe_panel(&self) -> &RecipePanel {
        &self.recipe
    }

    pub fn cache(&self) -> Option<&CatalogCache<S>> {
        self.cache.as_ref()
    }

    pub fn status(&self) -> ViewStatus {
        self.engine.status()
    }

    /// Load the catalog: cache first unless `force_refresh`, then the source.
    pub async fn load<C>(&mut self, source: &C, force_refresh: bool) -> Result<LoadOutcome, FetchError>
    where
        C: CatalogSource + ?Sized,
    {
        let ticket = self.begin_load();

        if !force_refresh {
            if let Some(entry) = self.cache.as_ref().and_then(|c| c.read()) {
                let items = entry.items.len();
                tracing::info!(items, "using cached grocery catalog");
                self.engine.set_catalog(entry.items);
                return Ok(LoadOutcome::FromCache { items });
            }
        }

        let result = source.fetch_all().await;
        self.finish_fetch(ticket, result)
    }

    /// Start a load and mark the view as loading.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.engine.mark_loading();
        self.loads.issue()
    }

    /// Apply a fetch result, unless a newer load has been started since
    /// `ticket` was issued.
    pub fn finish_fetch(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<GroceryItem>, FetchError>,
    ) -> Result<LoadOutcome, FetchError> {
        if !self.loads.is_current(&ticket) {
            tracing::debug!(
                seq = ticket.seq(),
                latest = self.loads.latest(),
                "discarding stale catalog response"
            );
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(items) => {
                let count = items.len();
                if let Some(ref cache) = self.cache {
                    cache.write(&items);
                }
                self.engine.set_catalog(items);
                Ok(LoadOutcome::Fetched { items: count })
            }
            Err(e) => {
                if let Some(entry) = self.cache.as_ref().and_then(|c| c.read()) {
                    tracing::warn!(error = %e, "catalog fetch failed, using cached catalog");
                    let items = entry.items.len();
                    self.engine.set_catalog(entry.items);
                    return Ok(LoadOutcome::CacheFallback { items });
                }
                tracing::warn!(
                    error = %e,
                    keeping_previous = self.engine.has_catalog(),
                    "catalog fetch failed"
                );
                self.engine.mark_failed(e.user_message());
                Err(e)
            }
        }
    }

    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.engine.apply_filters(criteria);
    }

    /// Toggle selection of a catalog item. Returns the new membership, or
    /// `None` if no catalog item has that id.
    pub fn toggle_item(&mut self, id: &ItemId) -> Option<bool> {
        let item = self.engine.catalog().iter().find(|i| i.id == *id)?.clone();
        Some(self.selection.toggle(&item))
    }

    /// Toggle selection of an item by its textual id.
    pub fn toggle_item_str(&mut self, id: &str) -> Option<bool> {
        let item = self
            .engine
            .catalog()
            .iter()
            .find(|i| i.id.matches_str(id))?
            .clone();
        Some(self.selection.toggle(&item))
    }

    pub fn toggle(&mut self, item: &GroceryItem) -> bool {
        self.selection.toggle(item)
    }

    /// Clear the selection and the recipe panel.
    pub fn clear_all(&mut self) {
        self.selection.clear();
        self.recipe = RecipePanel::Idle;
    }

    /// Ask the recipe service for a recipe from the current selection.
    ///
    /// An empty selection is refused before any request is made.
    pub async fn generate_recipe<R>(&mut self, source: &R) -> Result<Recipe, RequestError>
    where
        R: RecipeSource + ?Sized,
    {
        if self.selection.is_empty() {
            return Err(RequestError::EmptySelection);
        }
        match source.generate(self.selection.items()).await {
            Ok(recipe) => {
                self.recipe = RecipePanel::Ready(recipe.clone());
                Ok(recipe)
            }
            Err(e) => {
                self.recipe = RecipePanel::Failed(e.user_message());
                Err(e)
            }
        }
    }
}

impl Session<FileStore> {
    /// Session backed by the configured cache file (or no cache when
    /// `cache.enabled = false`).
    pub fn from_config(config: &Config) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| CatalogCache::new(FileStore::new(&config.cache.path)));
        Self::new(config.view.page_size, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use grocer_core::cache::memory::InMemoryStore;
    use grocer_core::cache::now_ms;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn item(id: i64, name: &str, chain: &str) -> GroceryItem {
        GroceryItem {
            id: ItemId::Int(id),
            name: name.to_string(),
            item_type: "Dairy".to_string(),
            chain: chain.to_string(),
            price: Some(1.0),
            unit: None,
        }
    }

    struct FakeCatalog {
        items: Vec<GroceryItem>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn ok(items: Vec<GroceryItem>) -> Self {
            Self {
                items,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                items: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn fetch_all(&self) -> Result<Vec<GroceryItem>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(FetchError::Status {
                    status: 503,
                    body: "down".into(),
                })
            } else {
                Ok(self.items.clone())
            }
        }
    }

    struct FakeRecipes;

    #[async_trait]
    impl RecipeSource for FakeRecipes {
        async fn generate(&self, items: &[GroceryItem]) -> Result<Recipe, RequestError> {
            Ok(Recipe {
                title: "Toast".into(),
                ingredients: items.iter().map(|i| i.name.clone()).collect(),
                instructions: "Mix\nServe".into(),
                tips: None,
            })
        }
    }

    fn session_with_cache() -> Session<InMemoryStore> {
        Session::new(10, Some(CatalogCache::new(InMemoryStore::new())))
    }

    #[tokio::test]
    async fn test_load_fetches_then_uses_cache() {
        let source = FakeCatalog::ok(vec![item(1, "Milk", "A"), item(2, "Bread", "B")]);
        let mut session = session_with_cache();

        let first = session.load(&source, false).await.unwrap();
        assert_eq!(first, LoadOutcome::Fetched { items: 2 });
        assert_eq!(session.status(), ViewStatus::Ready);

        let second = session.load(&source, false).await.unwrap();
        assert_eq!(second, LoadOutcome::FromCache { items: 2 });
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let forced = session.load(&source, true).await.unwrap();
        assert_eq!(forced, LoadOutcome::Fetched { items: 2 });
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_failure_without_cache_is_fetch_error() {
        let mut session: Session<InMemoryStore> = Session::new(10, None);
        let err = session.load(&FakeCatalog::failing(), false).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert!(matches!(session.status(), ViewStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_forced_refresh_failure_falls_back_to_cache() {
        let mut session = session_with_cache();
        session
            .cache()
            .unwrap()
            .write_at(&[item(1, "Milk", "A")], now_ms());

        let outcome = session.load(&FakeCatalog::failing(), true).await.unwrap();
        assert_eq!(outcome, LoadOutcome::CacheFallback { items: 1 });
        assert_eq!(session.status(), ViewStatus::Ready);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_loaded_catalog() {
        let mut session: Session<InMemoryStore> = Session::new(10, None);
        session
            .load(&FakeCatalog::ok(vec![item(1, "Milk", "A")]), false)
            .await
            .unwrap();

        let ticket = session.begin_load();
        assert_eq!(session.status(), ViewStatus::Loading);
        let err = session
            .finish_fetch(ticket, Err(FetchError::Decode("bad body".into())))
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(session.status(), ViewStatus::Ready);
        assert_eq!(session.engine().catalog().len(), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_goes_to_network() {
        let mut session = session_with_cache();
        let day_ago = now_ms() - grocer_core::cache::CACHE_TTL_MS - 60_000;
        session
            .cache()
            .unwrap()
            .write_at(&[item(9, "Old", "A")], day_ago);

        let source = FakeCatalog::ok(vec![item(1, "Milk", "A")]);
        let outcome = session.load(&source, false).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Fetched { items: 1 });
        assert_eq!(session.engine().catalog()[0].name, "Milk");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session: Session<InMemoryStore> = Session::new(10, None);
        let older = session.begin_load();
        let newer = session.begin_load();

        let applied = session
            .finish_fetch(newer, Ok(vec![item(2, "New", "B")]))
            .unwrap();
        assert_eq!(applied, LoadOutcome::Fetched { items: 1 });

        let dropped = session
            .finish_fetch(older, Ok(vec![item(1, "Old", "A")]))
            .unwrap();
        assert_eq!(dropped, LoadOutcome::Stale);
        assert_eq!(session.engine().catalog()[0].name, "New");
    }

    #[test]
    fn test_stale_error_is_discarded() {
        let mut session: Session<InMemoryStore> = Session::new(10, None);
        let older = session.begin_load();
        let newer = session.begin_load();
        session.finish_fetch(newer, Ok(vec![item(1, "Milk", "A")])).unwrap();

        let outcome = session
            .finish_fetch(
                older,
                Err(FetchError::Decode("late garbage".into())),
            )
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(session.status(), ViewStatus::Ready);
    }

    #[tokio::test]
    async fn test_selection_survives_filter_changes() {
        let source = FakeCatalog::ok(vec![item(1, "Milk", "A"), item(2, "Bread", "B")]);
        let mut session: Session<InMemoryStore> = Session::new(10, None);
        session.load(&source, false).await.unwrap();

        assert_eq!(session.toggle_item(&ItemId::Int(1)), Some(true));
        session.apply_filters(FilterCriteria {
            chain: Some("B".into()),
            ..Default::default()
        });
        assert!(session.selection().contains_id(&ItemId::Int(1)));

        session.apply_filters(FilterCriteria::default());
        assert_eq!(session.selection().len(), 1);
        assert_eq!(session.toggle_item_str("404"), None);
    }

    #[tokio::test]
    async fn test_generate_recipe_and_clear_all() {
        let source = FakeCatalog::ok(vec![item(1, "Milk", "A"), item(2, "Bread", "B")]);
        let mut session: Session<InMemoryStore> = Session::new(10, None);
        session.load(&source, false).await.unwrap();

        let empty = session.generate_recipe(&FakeRecipes).await.unwrap_err();
        assert!(matches!(empty, RequestError::EmptySelection));

        session.toggle_item_str("1");
        session.toggle_item_str("2");
        let recipe = session.generate_recipe(&FakeRecipes).await.unwrap();
        assert_eq!(recipe.ingredients, vec!["Milk", "Bread"]);
        assert_eq!(recipe.steps().len(), 2);
        assert!(matches!(session.recipe_panel(), RecipePanel::Ready(_)));

        session.clear_all();
        assert!(session.selection().is_empty());
        assert_eq!(session.recipe_panel(), &RecipePanel::Idle);
    }
}
