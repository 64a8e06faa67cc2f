// ============================================
// HAPPYHOUR - Embeddings Module
// Cache-and-search core over a parsed item list
// ============================================

mod cache;
mod context;
mod error;
mod path;
mod provider;

pub use cache::EmbeddingCache;
pub use context::{
    ContextState, EnsureOutcome, ItemsEmbeddingConfig, ItemsEmbeddingContext, ScoredItem,
    SemanticSearchConfig, CACHE_MARKER, DEFAULT_SEARCH_LIMIT,
};
pub use error::{EmbeddingError, VectorError};
pub use path::marked_file_path;
pub use provider::{EmbeddingProvider, MockEmbeddingProvider, OpenAIEmbeddings};

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Calculate cosine similarity between two vectors.
///
/// Unequal lengths fail with [`VectorError::DimensionMismatch`]. A zero-norm
/// operand fails with [`VectorError::DivisionByZero`] instead of producing
/// NaN. Sums run in `f64` so squares of large or tiny `f32` components
/// neither overflow nor flush to zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(VectorError::DivisionByZero {
            left_norm: norm_a as f32,
            right_norm: norm_b as f32,
        });
    }

    Ok((dot_product / (norm_a * norm_b)) as f32)
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-1.0, -2.0, -3.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_symmetric() {
        let a = vec![0.3, -1.2, 4.5, 0.0];
        let b = vec![2.0, 0.5, -0.25, 7.0];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_cosine_similarity_ignores_magnitude() {
        let a = vec![1.0, 1.0];
        let b = vec![10.0, 10.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(err, VectorError::DimensionMismatch { left: 2, right: 3 });
        assert!(err.to_string().contains("2"));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let err = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, VectorError::DivisionByZero { left_norm, .. } if left_norm == 0.0));

        let err = cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, VectorError::DivisionByZero { right_norm, .. } if right_norm == 0.0));
    }

    #[test]
    fn test_cosine_similarity_extreme_magnitudes() {
        let huge = cosine_similarity(&[1e20, 0.0], &[1e20, 0.0]).unwrap();
        assert!((huge - 1.0).abs() < 0.0001);

        let tiny = cosine_similarity(&[1e-30, 0.0], &[1e-30, 0.0]).unwrap();
        assert!((tiny - 1.0).abs() < 0.0001);

        let mixed = cosine_similarity(&[3e30, 4e30], &[-4e-30, 3e-30]).unwrap();
        assert!(mixed.is_finite());
        assert!(mixed.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_empty_vectors() {
        // Two empty vectors have equal length but no magnitude
        let err = cosine_similarity(&[], &[]).unwrap_err();
        assert!(matches!(err, VectorError::DivisionByZero { .. }));
    }
}
