//! Macro engine
//!
//! The service tying the pieces together. Selections append pending addition
//! lines to a per-ledger queue and schedule a merge cycle
//! (locate -> parse -> merge -> serialize -> write) through the update
//! scheduler; totals and rollups run read-only against current content
//! without queueing. Built once at startup with its collaborators injected.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::ledger::{serialize, InteractiveMergeEngine, LedgerParser};
use crate::models::{FoodFile, LedgerStructure, Nutrition};
use crate::nutrition::{LedgerBreakdown, MacroAggregator, NutritionResolver, Rollup};
use crate::settings::Settings;
use crate::storage::{
    block, Document, DocumentStore, FoodFileSource, StorageError, StorageEvent, VaultCache,
};
use crate::sync::{UpdateError, UpdateOutcome, UpdateScheduler};

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ledger block '{0}' not found in any document")]
    MissingBlock(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A ledger block located in a specific document
struct LocatedBlock {
    doc: Document,
    text: String,
    span: block::BlockSpan,
}

/// The macro ledger service
pub struct MacroEngine {
    store: Arc<dyn DocumentStore>,
    foods: Arc<dyn FoodFileSource>,
    settings: Settings,
    cache: Arc<VaultCache>,
    scheduler: UpdateScheduler,
    /// Pending interactive additions per ledger ID; cleared only after a
    /// successful merge cycle
    pending: Mutex<HashMap<String, Vec<String>>>,
}

impl MacroEngine {
    /// Build the engine; must be called inside a tokio runtime (the update
    /// scheduler spawns its worker here)
    pub fn new(
        store: Arc<dyn DocumentStore>,
        foods: Arc<dyn FoodFileSource>,
        settings: Settings,
        cache: Arc<VaultCache>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            foods,
            settings,
            cache,
            scheduler: UpdateScheduler::new(),
            pending: Mutex::new(HashMap::new()),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Record a selection for a ledger and schedule its merge cycle.
    ///
    /// The line may carry the interactive marker or not; the merge engine
    /// strips it either way.
    pub async fn queue_selection(self: &Arc<Self>, id: &str, line: &str) -> UpdateOutcome {
        {
            let mut pending = self.pending.lock().await;
            pending
                .entry(id.to_string())
                .or_default()
                .push(line.to_string());
        }

        let engine = Arc::clone(self);
        let id = id.to_string();
        let label = format!("merge:{}", id);
        self.scheduler
            .queue_update(&label, async move { engine.run_merge_cycle(&id).await })
            .await
    }

    /// One full merge cycle for a ledger ID
    async fn run_merge_cycle(&self, id: &str) -> Result<(), UpdateError> {
        let foods = self.food_table().await?;
        let resolver = NutritionResolver::new(foods);

        let located = self
            .locate_block(id)
            .await?
            .ok_or_else(|| EngineError::MissingBlock(id.to_string()))?;

        let content = block::content_lines(&located.text, &located.span).join("\n");
        let existing = LedgerParser::new(&resolver).parse(&content);

        let pending_snapshot: Vec<String> = {
            let pending = self.pending.lock().await;
            pending.get(id).cloned().unwrap_or_default()
        };

        let merge_engine =
            InteractiveMergeEngine::new(&resolver, &self.settings.meal_templates);
        let new_items = merge_engine.build_new_items(&pending_snapshot);
        let merged = InteractiveMergeEngine::merge(&existing, &new_items);

        let updated = block::replace_content(&located.text, &located.span, &serialize(&merged));
        self.store.write(&located.doc, &updated).await?;

        // Additions are consumed only once the write landed; anything queued
        // mid-cycle stays for the next one
        {
            let mut pending = self.pending.lock().await;
            if let Some(lines) = pending.get_mut(id) {
                let consumed = pending_snapshot.len().min(lines.len());
                lines.drain(..consumed);
                if lines.is_empty() {
                    pending.remove(id);
                }
            }
        }

        self.cache.invalidate(&located.doc.path).await;
        tracing::debug!("Merged {} additions into ledger '{}'", pending_snapshot.len(), id);
        Ok(())
    }

    /// Totals for one ledger; a missing block contributes zero
    pub async fn totals(&self, id: &str) -> Result<Nutrition, EngineError> {
        let foods = self.food_table().await?;
        let resolver = NutritionResolver::new(foods);
        self.totals_with(&resolver, id).await
    }

    /// Multi-ledger rollup: grand total plus one breakdown entry per
    /// requested ID, zero entries included
    pub async fn aggregate_many(&self, ids: &[String]) -> Result<Rollup, EngineError> {
        let foods = self.food_table().await?;
        let resolver = NutritionResolver::new(foods);

        let mut rollup = Rollup::default();
        for id in ids {
            let totals = self.totals_with(&resolver, id).await?;
            rollup.aggregate = rollup.aggregate.add(&totals);
            rollup.breakdown.push(LedgerBreakdown {
                id: id.clone(),
                totals,
            });
        }
        rollup.aggregate = rollup.aggregate.round1();
        Ok(rollup)
    }

    async fn totals_with(
        &self,
        resolver: &NutritionResolver,
        id: &str,
    ) -> Result<Nutrition, EngineError> {
        match self.locate_block(id).await? {
            Some(located) => {
                let lines = block::content_lines(&located.text, &located.span);
                let aggregator =
                    MacroAggregator::new(resolver, &self.settings.meal_templates);
                Ok(aggregator.aggregate(lines))
            }
            None => {
                tracing::warn!("Ledger block '{}' not found; totals are zero", id);
                Ok(Nutrition::zero())
            }
        }
    }

    /// Parsed structure of a ledger, or None when the block is missing
    pub async fn parsed_structure(
        &self,
        id: &str,
    ) -> Result<Option<LedgerStructure>, EngineError> {
        let foods = self.food_table().await?;
        let resolver = NutritionResolver::new(foods);
        match self.locate_block(id).await? {
            Some(located) => {
                let content = block::content_lines(&located.text, &located.span).join("\n");
                Ok(Some(LedgerParser::new(&resolver).parse(&content)))
            }
            None => Ok(None),
        }
    }

    /// Eagerly invalidate caches for a reported storage change
    pub async fn handle_storage_event(&self, event: &StorageEvent) {
        match event {
            StorageEvent::Modified(path) => {
                self.cache.invalidate(path).await;
                if self.is_food_path(path) {
                    self.cache.invalidate_food_files().await;
                }
            }
            StorageEvent::Created(path) | StorageEvent::Deleted(path) => {
                self.cache.invalidate(path).await;
                self.cache.invalidate_listing().await;
                if self.is_food_path(path) {
                    self.cache.invalidate_food_files().await;
                }
            }
            StorageEvent::Renamed { from, to } => {
                self.cache.invalidate(from).await;
                self.cache.invalidate(to).await;
                self.cache.invalidate_listing().await;
                if self.is_food_path(from) || self.is_food_path(to) {
                    self.cache.invalidate_food_files().await;
                }
            }
        }
    }

    fn is_food_path(&self, path: &str) -> bool {
        path.starts_with(&format!("{}/", self.settings.food_folder))
    }

    /// Scan documents in enumeration order for the block; first match wins,
    /// duplicates elsewhere are shadowed
    async fn locate_block(&self, id: &str) -> Result<Option<LocatedBlock>, StorageError> {
        for doc in self.documents().await? {
            let text = self.document_text(&doc).await?;
            if let Some(span) = block::find_block(&text, id) {
                return Ok(Some(LocatedBlock { doc, text, span }));
            }
        }
        Ok(None)
    }

    async fn documents(&self) -> Result<Vec<Document>, StorageError> {
        if let Some(docs) = self.cache.document_list().await {
            return Ok(docs);
        }
        let docs = self.store.list_documents().await?;
        self.cache.set_document_list(docs.clone()).await;
        Ok(docs)
    }

    async fn document_text(&self, doc: &Document) -> Result<String, StorageError> {
        if let Some(text) = self.cache.content(&doc.path).await {
            return Ok(text);
        }
        let text = self.store.read(doc).await?;
        self.cache.set_content(&doc.path, text.clone()).await;
        Ok(text)
    }

    async fn food_table(&self) -> Result<Vec<FoodFile>, StorageError> {
        if let Some(foods) = self.cache.food_files().await {
            return Ok(foods);
        }
        let foods = self.foods.food_files().await?;
        self.cache.set_food_files(foods.clone()).await;
        Ok(foods)
    }
}
