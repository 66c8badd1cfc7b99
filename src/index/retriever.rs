//! Top-k retrieval over a [`VectorIndex`].

use super::{ScoredChunk, VectorIndex};
use crate::embedding::Embedder;
use crate::error::{Result, StoryQaError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Returns the `k` chunks most similar to a query.
///
/// The embedder must be the one the index was built with.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl Retriever {
    /// Default number of results.
    pub const DEFAULT_K: usize = 3;

    /// Create a retriever returning at most `k` results.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(StoryQaError::Config(
                "retrieval k must be at least 1".to_string(),
            ));
        }
        Ok(Self { index, embedder, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Embed the query and return up to `k` chunks, best first.
    #[instrument(skip(self), fields(k = self.k))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&query_embedding, self.k)?;
        debug!("Retrieved {} chunks", results.len());
        Ok(results)
    }
}
