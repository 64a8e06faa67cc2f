// ============================================
// HAPPYHOUR - Items Embedding Context
// ============================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    cosine_similarity, marked_file_path, Embedding, EmbeddingCache, EmbeddingError,
    EmbeddingProvider,
};

/// Segment inserted into the source file name to locate its embedding cache
pub const CACHE_MARKER: &str = "embeddings";

/// Number of results returned when no limit is configured
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

type ParserFn<T> = Box<dyn Fn(&str) -> anyhow::Result<Vec<T>> + Send + Sync>;
type EmbedFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Where the items come from and how they are turned into embedding input
pub struct ItemsEmbeddingConfig<T> {
    source: PathBuf,
    parser: ParserFn<T>,
    embed: EmbedFn<T>,
}

impl<T> ItemsEmbeddingConfig<T> {
    /// `parser` turns the whole source file into an ordered item list,
    /// `embed` renders one item as the text sent to the embedding provider.
    pub fn new<P, E>(source: impl Into<PathBuf>, parser: P, embed: E) -> Self
    where
        P: Fn(&str) -> anyhow::Result<Vec<T>> + Send + Sync + 'static,
        E: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            parser: Box::new(parser),
            embed: Box::new(embed),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path of the companion cache, e.g. `drinks.embeddings.csv`
    pub fn cache_path(&self) -> PathBuf {
        marked_file_path(&self.source, CACHE_MARKER)
    }
}

/// Options for [`ItemsEmbeddingContext::semantic_search`]
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticSearchConfig {
    /// Maximum number of results
    pub limit: usize,
    /// Inclusive minimum score; results scoring below it are dropped
    pub threshold: Option<f32>,
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            threshold: None,
        }
    }
}

impl SemanticSearchConfig {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// An item paired with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<'a, T> {
    pub item: &'a T,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Unensured,
    Ensuring,
    Ensured,
}

/// What a call to [`ItemsEmbeddingContext::ensure_embeddings`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Already ensured; nothing was read and no provider call was made
    AlreadyEnsured,
    /// The cache matched the item count and was adopted
    CacheHit { items: usize },
    /// Every item was embedded again and the cache rewritten
    Rebuilt { items: usize },
}

/// Owns a parsed item list and the embedding list aligned with it.
///
/// Searching is only valid once [`ensure_embeddings`](Self::ensure_embeddings)
/// has completed.
pub struct ItemsEmbeddingContext<T> {
    config: ItemsEmbeddingConfig<T>,
    provider: Arc<dyn EmbeddingProvider>,
    state: ContextState,
    items: Vec<T>,
    embeddings: Vec<Embedding>,
}

impl<T> ItemsEmbeddingContext<T> {
    pub fn new(config: ItemsEmbeddingConfig<T>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config,
            provider,
            state: ContextState::Unensured,
            items: Vec::new(),
            embeddings: Vec::new(),
        }
    }

    pub fn config(&self) -> &ItemsEmbeddingConfig<T> {
        &self.config
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    /// Make sure every item has an embedding, reusing the on-disk cache when
    /// its length matches the parsed item count.
    ///
    /// Without `force` a second call returns immediately. With `force` the
    /// source is re-read and every item is embedded again. On failure the
    /// context keeps whatever it held before the call.
    pub async fn ensure_embeddings(&mut self, force: bool) -> Result<EnsureOutcome, EmbeddingError> {
        if self.state == ContextState::Ensured && !force {
            tracing::debug!("Embeddings already ensured for {}", self.config.source.display());
            return Ok(EnsureOutcome::AlreadyEnsured);
        }

        let previous = self.state;
        self.state = ContextState::Ensuring;

        match self.load_or_rebuild(force).await {
            Ok((items, embeddings, outcome)) => {
                self.items = items;
                self.embeddings = embeddings;
                self.state = ContextState::Ensured;
                Ok(outcome)
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    async fn load_or_rebuild(
        &self,
        force: bool,
    ) -> Result<(Vec<T>, Vec<Embedding>, EnsureOutcome), EmbeddingError> {
        let source = &self.config.source;
        let contents = fs::read_to_string(source).map_err(|e| EmbeddingError::SourceRead {
            path: source.clone(),
            source: e,
        })?;

        let items = (self.config.parser)(&contents).map_err(EmbeddingError::Parse)?;
        tracing::debug!("Parsed {} items from {}", items.len(), source.display());

        let cache = EmbeddingCache::new(self.config.cache_path());
        let cached = match cache.load() {
            Ok(cached) => cached,
            Err(e @ (EmbeddingError::CacheCorrupt { .. } | EmbeddingError::CacheRead { .. })) => {
                tracing::warn!("Ignoring unusable embedding cache: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        match cached {
            Some(embeddings) if !force && embeddings.len() == items.len() => {
                tracing::info!(
                    "Using {} cached embeddings from {}",
                    embeddings.len(),
                    cache.path().display()
                );
                let outcome = EnsureOutcome::CacheHit { items: items.len() };
                return Ok((items, embeddings, outcome));
            }
            Some(embeddings) if !force => {
                tracing::info!(
                    "Embedding cache has {} entries but source has {} items, rebuilding",
                    embeddings.len(),
                    items.len()
                );
            }
            Some(_) => tracing::info!("Forced rebuild of {} embeddings", items.len()),
            None => tracing::info!("No embedding cache at {}", cache.path().display()),
        }

        let embeddings = self.embed_items(&items).await?;
        cache.save(&embeddings)?;
        tracing::info!(
            "Saved {} embeddings to {}",
            embeddings.len(),
            cache.path().display()
        );

        let outcome = EnsureOutcome::Rebuilt { items: items.len() };
        Ok((items, embeddings, outcome))
    }

    /// Sequential, in item order: one provider call finishes before the next starts
    async fn embed_items(&self, items: &[T]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let text = (self.config.embed)(item);
            tracing::debug!(
                "Embedding item {}/{} with {}",
                i + 1,
                items.len(),
                self.provider.model_name()
            );
            let embedding = self
                .provider
                .embed(&text)
                .await
                .map_err(EmbeddingError::Provider)?;
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }

    /// Rank every item by cosine similarity to `query`.
    ///
    /// Results are sorted by descending score; equal scores keep source order.
    /// The threshold filter is applied before truncating to `limit`.
    pub async fn semantic_search(
        &self,
        query: &str,
        config: &SemanticSearchConfig,
    ) -> Result<Vec<ScoredItem<'_, T>>, EmbeddingError> {
        if self.state != ContextState::Ensured {
            return Err(EmbeddingError::NotReady);
        }

        let query_embedding = self
            .provider
            .embed(query)
            .await
            .map_err(EmbeddingError::Provider)?;

        let mut scored = self
            .items
            .iter()
            .zip(&self.embeddings)
            .enumerate()
            .map(|(index, (item, embedding))| {
                cosine_similarity(embedding, &query_embedding)
                    .map(|score| ScoredItem { item, score })
                    .map_err(|source| EmbeddingError::Vector { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // `sort_by` is stable, so ties stay in source order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(threshold) = config.threshold {
            scored.retain(|s| s.score >= threshold);
        }
        scored.truncate(config.limit);

        tracing::debug!(
            "Semantic search scored {} items, returning {}",
            self.items.len(),
            scored.len()
        );
        Ok(scored)
    }
}
