//! Vault cache
//!
//! One explicit cache object constructed at startup and shared by reference.
//! Holds the document listing, document contents, and the food-file table.
//! Invalidation is eager: storage events and successful scheduled updates
//! drop the affected entries, and the next reader reloads.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::FoodFile;
use crate::storage::Document;

/// Caches for everything the engine reads from storage
#[derive(Default)]
pub struct VaultCache {
    documents: RwLock<Option<Vec<Document>>>,
    contents: RwLock<HashMap<String, String>>,
    food_files: RwLock<Option<Vec<FoodFile>>>,
}

impl VaultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document_list(&self) -> Option<Vec<Document>> {
        self.documents.read().await.clone()
    }

    pub async fn set_document_list(&self, docs: Vec<Document>) {
        *self.documents.write().await = Some(docs);
    }

    pub async fn content(&self, path: &str) -> Option<String> {
        self.contents.read().await.get(path).cloned()
    }

    pub async fn set_content(&self, path: &str, text: String) {
        self.contents.write().await.insert(path.to_string(), text);
    }

    pub async fn food_files(&self) -> Option<Vec<FoodFile>> {
        self.food_files.read().await.clone()
    }

    pub async fn set_food_files(&self, foods: Vec<FoodFile>) {
        *self.food_files.write().await = Some(foods);
    }

    /// Drop the cached content for one document
    pub async fn invalidate(&self, path: &str) {
        self.contents.write().await.remove(path);
    }

    /// Drop the document listing (a document appeared, vanished, or moved)
    pub async fn invalidate_listing(&self) {
        *self.documents.write().await = None;
    }

    /// Drop the food-file table
    pub async fn invalidate_food_files(&self) {
        *self.food_files.write().await = None;
    }

    /// Drop everything
    pub async fn invalidate_all(&self) {
        *self.documents.write().await = None;
        self.contents.write().await.clear();
        *self.food_files.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_content_round_trip_and_invalidate() {
        let cache = VaultCache::new();
        assert!(cache.content("a.md").await.is_none());

        cache.set_content("a.md", "hello".to_string()).await;
        cache.set_content("b.md", "world".to_string()).await;
        assert_eq!(cache.content("a.md").await.as_deref(), Some("hello"));

        cache.invalidate("a.md").await;
        assert!(cache.content("a.md").await.is_none());
        // Untouched entries keep serving
        assert_eq!(cache.content("b.md").await.as_deref(), Some("world"));
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = VaultCache::new();
        cache.set_document_list(vec![Document::new("a.md")]).await;
        cache.set_content("a.md", "x".to_string()).await;
        cache.set_food_files(Vec::new()).await;

        cache.invalidate_all().await;
        assert!(cache.document_list().await.is_none());
        assert!(cache.content("a.md").await.is_none());
        assert!(cache.food_files().await.is_none());
    }
}
