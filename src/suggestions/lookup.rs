//! Recipe lookup for triggered suggestions
//!
//! Turns the detector's tag list into recipe cards. Tagged lookups
//! fall back to the featured recipes when nothing matches; a store
//! failure is logged and yields no cards rather than interrupting the
//! conversation.

use crate::error::Result;
use crate::store::{RecipeRecord, RecipeStore};
use std::sync::Arc;
use tracing::error;

/// Resolves dietary tags to suggested recipes
#[derive(Clone)]
pub struct RecipeFinder {
    store: Arc<dyn RecipeStore>,
    featured_count: usize,
}

impl RecipeFinder {
    pub fn new(store: Arc<dyn RecipeStore>, featured_count: usize) -> Self {
        Self {
            store,
            featured_count,
        }
    }

    /// Recipes to suggest for the extracted dietary tags
    ///
    /// With tags, matching recipes win and an empty match falls back to
    /// the featured set. Without tags the featured set is used
    /// directly. Store failures come back as an empty list.
    pub async fn suggestions(&self, tags: &[String]) -> Vec<RecipeRecord> {
        if !tags.is_empty() {
            match self.store.by_dietary_tags(tags).await {
                Ok(recipes) if !recipes.is_empty() => return recipes,
                Ok(_) => {}
                Err(e) => {
                    error!("Failed to look up recipes by dietary tags: {}", e);
                    return Vec::new();
                }
            }
        }

        match self.store.featured(self.featured_count).await {
            Ok(recipes) => recipes,
            Err(e) => {
                error!("Failed to load featured recipes: {}", e);
                Vec::new()
            }
        }
    }

    /// The featured recipe set
    ///
    /// Unlike [`suggestions`](Self::suggestions) this propagates store
    /// failures, for callers that want to report them.
    pub async fn featured(&self) -> Result<Vec<RecipeRecord>> {
        self.store.featured(self.featured_count).await
    }
}
