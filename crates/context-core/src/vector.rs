//! Vector math shared by the context graph and embedding fallbacks.

/// Calculates cosine similarity between two vectors, clamped to [0, 1].
///
/// Similarity = (a · b) / (||a|| * ||b||)
///
/// Empty or zero-norm vectors return 0.0 so callers never divide by zero.
/// Negative raw similarities clamp to 0.0: for this subsystem "opposite"
/// and "unrelated" are treated the same.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_clamp_to_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn zero_norm_and_empty_vectors_score_zero() {
        let a = vec![1.0, 2.0];
        let zero = vec![0.0, 0.0];
        let empty: Vec<f32> = vec![];
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
        assert_eq!(cosine_similarity(&empty, &a), 0.0);
    }

    #[test]
    fn similarity_stays_in_unit_interval() {
        let vectors = [
            vec![0.3, -0.7, 2.0],
            vec![-1.5, 0.2, 0.9],
            vec![4.0, 4.0, 4.0],
            vec![0.0, 0.0, 1.0],
        ];
        for u in &vectors {
            for v in &vectors {
                let s = cosine_similarity(u, v);
                assert!((0.0..=1.0).contains(&s), "similarity {} out of range", s);
            }
        }
    }
}
