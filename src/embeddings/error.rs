use std::path::PathBuf;

use thiserror::Error;

/// Failures of the vector math helpers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorError {
    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("cosine similarity undefined for zero-norm vector (norms {left_norm} and {right_norm})")]
    DivisionByZero { left_norm: f32, right_norm: f32 },
}

/// Errors surfaced by the items-embeddings core
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to read source file {}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse source file: {0:#}")]
    Parse(anyhow::Error),

    #[error("failed to read embedding cache {}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedding cache {} is corrupt", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write embedding cache {}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedding provider failed: {0:#}")]
    Provider(anyhow::Error),

    #[error("similarity for item {index}: {source}")]
    Vector {
        index: usize,
        #[source]
        source: VectorError,
    },

    #[error("embeddings have not been ensured; call ensure_embeddings first")]
    NotReady,
}
