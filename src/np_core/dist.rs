use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Tolerance used when checking that a discrete distribution sums to one.
pub const PROBABILITY_EPS: f64 = 1e-9;

/// Draws `true` with probability `p`.
///
/// Values outside `[0, 1]` are clamped, so `p <= 0` never fires and `p >= 1` always does.
pub fn sample_bernoulli(rng: &mut ChaCha8Rng, p: f64) -> bool {
    let p = p.clamp(0.0, 1.0);
    rng.gen_bool(p)
}

/// Draws an index from a categorical distribution.
///
/// This function employs the inversion method using uniform distribution pseudorandom numbers,
/// walking the cumulative weights in order.
///
/// # Arguments
///
/// * `rng` - A mutable reference to a ChaCha8Rng random number generator.
/// * `weights` - Probabilities of each outcome, expected to sum to one.
///
/// # Returns
///
/// The index of the drawn outcome, or `None` if `weights` is empty or sums to zero.
///
/// # Example
///
/// ```
/// use rand_chacha::ChaCha8Rng;
/// use rand::SeedableRng;
/// use rsma_planner::np_core::dist::sample_categorical;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let index = sample_categorical(&mut rng, &[0.0, 1.0, 0.0]);
/// assert_eq!(index, Some(1));
/// ```
pub fn sample_categorical(rng: &mut ChaCha8Rng, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return None;
    }

    // Generate a random value within the range of U(0, total)
    let u: f64 = rng.gen_range(0.0..1.0) * total;

    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if u < cumulative {
            return Some(index);
        }
    }

    // Rounding can leave `u` right at the upper edge
    weights.iter().rposition(|w| *w > 0.0)
}

/// `true` if the weights form a probability distribution.
pub fn is_distribution(weights: &[f64]) -> bool {
    !weights.is_empty()
        && weights.iter().all(|w| *w >= 0.0)
        && (weights.iter().sum::<f64>() - 1.0).abs() < PROBABILITY_EPS
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn degenerate_weights_always_pick_the_certain_outcome() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(sample_categorical(&mut rng, &[0.0, 0.0, 1.0]), Some(2));
            assert!(sample_bernoulli(&mut rng, 1.0));
            assert!(!sample_bernoulli(&mut rng, 0.0));
        }
        assert_eq!(sample_categorical(&mut rng, &[]), None);
        assert_eq!(sample_categorical(&mut rng, &[0.0, 0.0]), None);
    }

    #[test]
    fn categorical_frequencies_follow_the_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        for _ in 0..20_000 {
            counts[sample_categorical(&mut rng, &[0.5, 0.2, 0.3]).unwrap()] += 1;
        }
        let share = |c: usize| c as f64 / 20_000.0;

        assert!((share(counts[0]) - 0.5).abs() < 0.02);
        assert!((share(counts[1]) - 0.2).abs() < 0.02);
        assert!((share(counts[2]) - 0.3).abs() < 0.02);
    }

    #[test]
    fn distribution_check() {
        assert!(is_distribution(&[0.4, 0.3, 0.3]));
        assert!(!is_distribution(&[0.4, 0.3, 0.2]));
        assert!(!is_distribution(&[1.5, -0.5]));
        assert!(!is_distribution(&[]));
    }
}
