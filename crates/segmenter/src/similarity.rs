//! Vector similarity utilities for paragraph grouping.
//!
//! Pure-Rust cosine arithmetic over embedding vectors; accumulation in
//! f64 for stable results across platforms.

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal.
/// Returns 0.0 for mismatched lengths, empty vectors, or zero norms.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Component-wise mean of the vectors selected by `indices`.
pub fn centroid(embeddings: &[Vec<f32>], indices: &[usize]) -> Vec<f32> {
    let Some(&first) = indices.first() else {
        return Vec::new();
    };
    let dim = embeddings[first].len();
    let mut mean = vec![0.0f32; dim];

    for &i in indices {
        for (slot, value) in mean.iter_mut().zip(embeddings[i].iter()) {
            *slot += value;
        }
    }
    let n = indices.len() as f32;
    for slot in mean.iter_mut() {
        *slot /= n;
    }
    mean
}

/// Average pairwise cosine similarity among the selected vectors.
/// A single vector has cohesion 1.0 by definition.
pub fn average_pairwise(embeddings: &[Vec<f32>], indices: &[usize]) -> f32 {
    if indices.len() <= 1 {
        return 1.0;
    }

    let mut sum = 0.0f64;
    let mut pairs = 0usize;
    for (offset, &i) in indices.iter().enumerate() {
        for &j in &indices[offset + 1..] {
            sum += cosine_similarity(&embeddings[i], &embeddings[j]) as f64;
            pairs += 1;
        }
    }
    (sum / pairs as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1
        let a = vec![1.0, 1.0];
        let b = vec![1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn centroid_is_component_mean() {
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let mean = centroid(&embeddings, &[0, 1]);
        assert_eq!(mean, vec![0.5, 0.5]);
    }

    #[test]
    fn centroid_of_nothing_is_empty() {
        let embeddings: Vec<Vec<f32>> = vec![];
        assert!(centroid(&embeddings, &[]).is_empty());
    }

    #[test]
    fn singleton_cohesion_is_one() {
        let embeddings = vec![vec![1.0, 0.0]];
        assert_eq!(average_pairwise(&embeddings, &[0]), 1.0);
    }

    #[test]
    fn pairwise_average_over_three() {
        let embeddings = vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ];
        // pairs: (0,1)=1.0, (0,2)=0.0, (1,2)=0.0 → mean 1/3
        let cohesion = average_pairwise(&embeddings, &[0, 1, 2]);
        assert!((cohesion - 1.0 / 3.0).abs() < 1e-6);
    }
}
