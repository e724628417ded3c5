/// Cosine similarity `dot / (|a| |b|)`, `0.0` when either norm is zero.
///
/// Vectors are compared over their common prefix; callers check lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    // + 0.0 folds -0.0 into 0.0 so zero scores tie under total_cmp
    dot / (mag_a * mag_b) + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_score_is_positive_zero() {
        let score = cosine_similarity(&[1.0, 0.0], &[-0.0, -1.0]);
        assert_eq!(score, 0.0);
        assert!(score.is_sign_positive());
    }

    #[test]
    fn zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
