//! In-memory vector index over document chunks.
//!
//! Built once per document and read-only afterwards. Similarity is cosine.

mod retriever;

pub use retriever::Retriever;

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{Result, StoryQaError};
use tracing::{debug, info, instrument, warn};

/// A chunk stored together with its embedding.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A chunk that could not be indexed.
#[derive(Debug, Clone)]
pub struct SkippedChunk {
    /// Order of the chunk in the document.
    pub order: usize,
    /// Why embedding failed.
    pub reason: String,
}

/// A retrieved chunk with its similarity score (higher is better).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Read-only mapping of chunks to vectors.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
    skipped: Vec<SkippedChunk>,
}

impl VectorIndex {
    /// Embed every chunk and build the index.
    ///
    /// A chunk that fails to embed, or whose vector length differs from the
    /// first successful one, is skipped and recorded. The build fails only
    /// when nothing could be indexed.
    #[instrument(skip(chunks, embedder), fields(chunks = chunks.len()))]
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            return Err(StoryQaError::Ingestion("No chunks to index".to_string()));
        }

        let total = chunks.len();
        let mut entries: Vec<IndexedChunk> = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        let mut dimensions = None;

        for chunk in chunks {
            let embedding = match embedder.embed(&chunk.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!("Skipping chunk {}: {}", chunk.order, e);
                    skipped.push(SkippedChunk {
                        order: chunk.order,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let expected = *dimensions.get_or_insert(embedding.len());
            if embedding.len() != expected {
                let reason = StoryQaError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                }
                .to_string();
                warn!("Skipping chunk {}: {}", chunk.order, reason);
                skipped.push(SkippedChunk {
                    order: chunk.order,
                    reason,
                });
                continue;
            }

            debug!("Indexed chunk {} ({} chars)", chunk.order, chunk.char_len());
            entries.push(IndexedChunk { chunk, embedding });
        }

        let Some(dimensions) = dimensions.filter(|_| !entries.is_empty()) else {
            return Err(StoryQaError::Embedding(format!(
                "None of the {} chunks could be embedded",
                total
            )));
        };

        info!(
            "Indexed {} of {} chunks ({} dimensions)",
            entries.len(),
            total,
            dimensions
        );

        Ok(Self {
            entries,
            dimensions,
            skipped,
        })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length shared by every entry.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Chunks that were left out during the build.
    pub fn skipped(&self) -> &[SkippedChunk] {
        &self.skipped
    }

    pub fn entries(&self) -> &[IndexedChunk] {
        &self.entries
    }

    /// Top `limit` chunks by cosine similarity, highest first.
    ///
    /// Equal scores keep document order.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        if query_embedding.len() != self.dimensions {
            return Err(StoryQaError::DimensionMismatch {
                expected: self.dimensions,
                actual: query_embedding.len(),
            });
        }

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        // sort_by is stable, so ties stay in insertion (document) order;
        // NaN scores rank below everything
        results.sort_by(|a, b| rank_key(b.score).total_cmp(&rank_key(a.score)));
        results.truncate(limit);

        Ok(results)
    }
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedEmbedder, KeywordEmbedder};

    fn chunk(order: usize, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_page_index: 0,
            offset: order * 100,
            order,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_failing_chunk_is_skipped() {
        let embedder = KeywordEmbedder::new();
        let chunks = vec![
            chunk(0, "The dragon slept."),
            chunk(1, "POISON page"),
            chunk(2, "A boy found a teapot."),
        ];

        let index = VectorIndex::build(chunks, &embedder).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.skipped().len(), 1);
        assert_eq!(index.skipped()[0].order, 1);
        assert_eq!(index.dimensions(), embedder.dimensions());
    }

    #[tokio::test]
    async fn test_blank_chunk_is_skipped() {
        let index = VectorIndex::build(
            vec![chunk(0, "   "), chunk(1, "dragon")],
            &KeywordEmbedder::new(),
        )
        .await
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].chunk.order, 1);
    }

    #[tokio::test]
    async fn test_all_chunks_failing_is_embedding_error() {
        let err = VectorIndex::build(vec![chunk(0, "POISON")], &KeywordEmbedder::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoryQaError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_no_chunks_is_ingestion_error() {
        let err = VectorIndex::build(Vec::new(), &KeywordEmbedder::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoryQaError::Ingestion(_)));
    }

    #[tokio::test]
    async fn test_search_orders_by_score_with_stable_ties() {
        let index = VectorIndex::build(
            vec![chunk(0, "alpha"), chunk(1, "beta"), chunk(2, "gamma")],
            &FixedEmbedder(4),
        )
        .await
        .unwrap();

        let results = index.search(&[1.0, 1.0, 1.0, 1.0], 10).unwrap();
        let orders: Vec<usize> = results.iter().map(|r| r.chunk.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    /// Returns NaN vectors for text containing "nan".
    struct NanEmbedder;

    #[async_trait::async_trait]
    impl Embedder for NanEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("nan") {
                Ok(vec![f32::NAN, 1.0])
            } else if text.contains("low") {
                Ok(vec![-1.0, 0.0])
            } else {
                Ok(vec![1.0, 0.0])
            }
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_nan_scores_rank_last() {
        let index = VectorIndex::build(
            vec![chunk(0, "nan one"), chunk(1, "low"), chunk(2, "high"), chunk(3, "nan two")],
            &NanEmbedder,
        )
        .await
        .unwrap();

        let results = index.search(&[1.0, 0.0], 4).unwrap();
        let orders: Vec<usize> = results.iter().map(|r| r.chunk.order).collect();
        assert_eq!(orders, vec![2, 1, 0, 3]);
    }

    #[tokio::test]
    async fn test_nan_query_keeps_document_order() {
        let index = VectorIndex::build(
            vec![chunk(0, "alpha"), chunk(1, "beta"), chunk(2, "gamma")],
            &FixedEmbedder(4),
        )
        .await
        .unwrap();

        let results = index.search(&[f32::NAN, 1.0, 1.0, 1.0], 3).unwrap();
        let orders: Vec<usize> = results.iter().map(|r| r.chunk.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_search_dimension_mismatch() {
        let index = VectorIndex::build(vec![chunk(0, "dragon")], &FixedEmbedder(4))
            .await
            .unwrap();
        let err = index.search(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            StoryQaError::DimensionMismatch {
                expected: 4,
                actual: 2
            }
        ));
    }
}
