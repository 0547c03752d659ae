//! Sampler
//!
//! Feature subsampling for the split search. Every split decision draws
//! its own random subset of columns, which is what single-tree feature
//! bagging in random-forest style ensembles does.
use rand::rngs::StdRng;
use rand::seq::index::sample;

/// Draw `k` distinct feature indices out of `n_features`, without
/// replacement.
///
/// The result is sorted ascending so that the split search enumerates
/// candidate features in a fixed order, keeping the first-found tie-break
/// deterministic for a given seed.
pub fn sample_feature_indices(rng: &mut StdRng, n_features: usize, k: usize) -> Vec<usize> {
    if k >= n_features {
        return (0..n_features).collect();
    }
    let mut indices = sample(rng, n_features, k).into_vec();
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sample_all_features() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(sample_feature_indices(&mut rng, 4, 4), vec![0, 1, 2, 3]);
        assert_eq!(sample_feature_indices(&mut rng, 3, 10), vec![0, 1, 2]);
    }

    #[test]
    fn test_sample_subset() {
        let mut rng = StdRng::seed_from_u64(42);
        let indices = sample_feature_indices(&mut rng, 10, 3);
        assert_eq!(indices.len(), 3);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_sample_is_seeded() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            sample_feature_indices(&mut a, 20, 5),
            sample_feature_indices(&mut b, 20, 5)
        );
    }
}
