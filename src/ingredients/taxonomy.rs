use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TaxonomyError;
use crate::model::BaseIngredientTaxonomyEntry;

pub type LinkId = i64;

/// A resolved component written back against its parent ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLink {
    pub parent_ingredient_id: i64,
    pub base_ingredient_id: i64,
    pub order_index: i32,
    pub is_main: bool,
    pub notes: Option<String>,
}

/// Store of canonical base ingredients.
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Exact, case-sensitive lookup by canonical name
    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<BaseIngredientTaxonomyEntry>, TaxonomyError>;

    /// Substring search over names, common names and descriptions
    async fn search(
        &self,
        query: &str,
        approved_only: bool,
        limit: usize,
    ) -> Result<Vec<BaseIngredientTaxonomyEntry>, TaxonomyError>;

    async fn link_component(&self, link: ComponentLink) -> Result<LinkId, TaxonomyError>;
}

/// Taxonomy held in memory. Links are recorded, not persisted.
#[derive(Debug, Default)]
pub struct InMemoryTaxonomy {
    entries: Vec<BaseIngredientTaxonomyEntry>,
    links: Mutex<Vec<ComponentLink>>,
}

impl InMemoryTaxonomy {
    pub fn new(entries: Vec<BaseIngredientTaxonomyEntry>) -> Self {
        Self {
            entries,
            links: Mutex::new(Vec::new()),
        }
    }

    /// Loads entries from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn entries(&self) -> &[BaseIngredientTaxonomyEntry] {
        &self.entries
    }

    /// Links recorded so far, in write order
    pub fn links(&self) -> Vec<ComponentLink> {
        self.links
            .lock()
            .map(|links| links.clone())
            .unwrap_or_default()
    }

    fn matches(entry: &BaseIngredientTaxonomyEntry, query: &str) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(query);
        contains(&entry.name)
            || entry
                .common_names
                .iter()
                .flatten()
                .any(|name| contains(name))
            || entry.description.as_deref().is_some_and(contains)
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryTaxonomy {
    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<BaseIngredientTaxonomyEntry>, TaxonomyError> {
        Ok(self.entries.iter().find(|entry| entry.name == name).cloned())
    }

    async fn search(
        &self,
        query: &str,
        approved_only: bool,
        limit: usize,
    ) -> Result<Vec<BaseIngredientTaxonomyEntry>, TaxonomyError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: Vec<BaseIngredientTaxonomyEntry> = self
            .entries
            .iter()
            .filter(|entry| !approved_only || entry.is_approved)
            .filter(|entry| Self::matches(entry, &query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.truncate(limit);
        Ok(found)
    }

    async fn link_component(&self, link: ComponentLink) -> Result<LinkId, TaxonomyError> {
        let mut links = self
            .links
            .lock()
            .map_err(|e| TaxonomyError::Link(e.to_string()))?;
        links.push(link);
        Ok(links.len() as LinkId)
    }
}
