use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::time::timeout;

use super::decomposer::decompose;
use super::taxonomy::TaxonomyRepository;
use crate::config::ResolverConfig;
use crate::error::TaxonomyError;
use crate::model::{ParsedIngredientComponent, ParsedIngredientResult};

/// Taxonomy entry a component name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyMatch {
    pub id: i64,
    pub name: String,
}

/// Annotates decomposed components with base-ingredient matches.
///
/// Resolution is read-only. Lookups that fail or time out leave the
/// component unresolved; only definite outcomes are cached.
pub struct EntityResolver {
    repository: Arc<dyn TaxonomyRepository>,
    config: ResolverConfig,
    cache: Mutex<HashMap<String, Option<TaxonomyMatch>>>,
}

impl EntityResolver {
    pub fn new(repository: Arc<dyn TaxonomyRepository>) -> Self {
        Self::with_config(repository, ResolverConfig::default())
    }

    pub fn with_config(repository: Arc<dyn TaxonomyRepository>, config: ResolverConfig) -> Self {
        Self {
            repository,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn bounded<T>(
        &self,
        lookup: impl Future<Output = Result<T, TaxonomyError>>,
    ) -> Result<T, TaxonomyError> {
        let budget = self.config.lookup_timeout_ms;
        timeout(Duration::from_millis(budget), lookup)
            .await
            .map_err(|_| TaxonomyError::Timeout(budget))?
    }

    async fn lookup(&self, name: &str) -> Result<Option<TaxonomyMatch>, TaxonomyError> {
        if let Some(entry) = self.bounded(self.repository.find_by_name(name)).await? {
            if entry.is_approved {
                return Ok(Some(TaxonomyMatch {
                    id: entry.id,
                    name: entry.name,
                }));
            }
        }

        let limit = self.config.search_limit.max(1);
        let found = self
            .bounded(self.repository.search(name, true, limit))
            .await?;
        Ok(found.into_iter().next().map(|entry| TaxonomyMatch {
            id: entry.id,
            name: entry.name,
        }))
    }

    fn cached(&self, name: &str) -> Option<Option<TaxonomyMatch>> {
        if !self.config.cache {
            return None;
        }
        self.cache.lock().ok()?.get(name).cloned()
    }

    /// Resolves one name: exact approved match first, then fuzzy search.
    pub async fn resolve(&self, name: &str) -> Option<TaxonomyMatch> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(hit) = self.cached(name) {
            return hit;
        }

        match self.lookup(name).await {
            Ok(found) => {
                debug!(
                    "Resolved '{}' to {:?}",
                    name,
                    found.as_ref().map(|m| m.name.as_str())
                );
                if self.config.cache {
                    if let Ok(mut cache) = self.cache.lock() {
                        cache.insert(name.to_string(), found.clone());
                    }
                }
                found
            }
            Err(e) => {
                warn!("Taxonomy lookup for '{}' failed: {}", name, e);
                None
            }
        }
    }

    /// Resolves every node of a finished tree, depth-first.
    ///
    /// At most `concurrency` lookups are in flight at once.
    pub async fn resolve_tree(&self, result: &mut ParsedIngredientResult) {
        let names: Vec<String> = result
            .depth_first()
            .into_iter()
            .map(|component| component.name.clone())
            .collect();
        let concurrency = self.config.concurrency.max(1);

        let matches: Vec<Option<TaxonomyMatch>> = stream::iter(names)
            .map(|name| async move { self.resolve(&name).await })
            .buffered(concurrency)
            .collect()
            .await;

        let mut matches = matches.into_iter();
        assign(&mut result.components, &mut matches);
    }

    /// Decomposes a label and resolves the resulting tree.
    pub async fn decompose(&self, label: &str) -> ParsedIngredientResult {
        let mut result = decompose(label);
        self.resolve_tree(&mut result).await;
        result
    }
}

/// Writes matches back in the same depth-first order they were produced.
fn assign(
    components: &mut [ParsedIngredientComponent],
    matches: &mut impl Iterator<Item = Option<TaxonomyMatch>>,
) {
    for component in components {
        if let Some(found) = matches.next().flatten() {
            component.base_ingredient_id = Some(found.id);
            component.matched_name = Some(found.name);
        }
        if let Some(children) = component.sub_components.as_mut() {
            assign(children, matches);
        }
    }
}
