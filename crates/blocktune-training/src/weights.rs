//! Weight vector operations for the genetic algorithm.
//!
//! These are the building blocks [`EvolutionEngine`](crate::genetic::EvolutionEngine) combines
//! into initialization, crossover, mutation and normalization steps.
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws every gene uniformly from `[-0.5, 0.5]` and
//!   normalizes the result
//! - **Crossover**: [`crossover`] is a fitness-weighted sum of two parents
//! - **Mutation**: [`mutate`] adds a bounded uniform offset to randomly chosen genes
//! - **Normalization**: [`normalize_l2`] scales a vector to unit Euclidean length
//!
//! ## Unit-Length Weights
//!
//! Move selection only compares scores of the same board, so multiplying every weight by a
//! positive constant never changes the chosen move. Keeping vectors at unit length removes
//! that redundant degree of freedom and stops the fitness-weighted crossover from inflating
//! the magnitudes generation after generation.
//!
//! Weights may be negative: a negative weight penalizes its metric.

use rand::Rng;

/// Creates a weight vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use blocktune_training::weights;
///
/// let weights = weights::from_fn(|i| if i == 0 { 1.0 } else { -0.5 }, 3);
/// assert_eq!(weights, vec![1.0, -0.5, -0.5]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    (0..len).map(f).collect()
}

/// Generates a random unit-length weight vector.
///
/// Each gene is sampled independently from `[-0.5, 0.5]` before normalization.
pub fn random<R>(rng: &mut R, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    let mut weights = from_fn(|_| rng.random_range(-0.5..=0.5), len);
    normalize_l2(&mut weights);
    weights
}

/// Fitness-weighted linear crossover.
///
/// Returns `child[i] = fitness1 * p1[i] + fitness2 * p2[i]`, not normalized. A parent with
/// zero fitness contributes nothing, so the child is the other parent scaled by its fitness.
///
/// # Panics
///
/// Panics if the parents have different lengths.
///
/// # Examples
///
/// ```
/// use blocktune_training::weights;
///
/// let child = weights::crossover(&[1.0, 0.0], 2.0, &[0.0, 1.0], 3.0);
/// assert_eq!(child, vec![2.0, 3.0]);
/// ```
#[must_use]
pub fn crossover(p1: &[f32], fitness1: f32, p2: &[f32], fitness2: f32) -> Vec<f32> {
    assert_eq!(p1.len(), p2.len(), "parents must have the same length");
    from_fn(|i| fitness1 * p1[i] + fitness2 * p2[i], p1.len())
}

/// Mutates a weight vector in place.
///
/// Each gene is changed with probability `rate` by an offset drawn uniformly from
/// `[-amount, amount]`. The vector is not renormalized.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]` or `amount` is negative.
pub fn mutate<R>(weights: &mut [f32], amount: f32, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert!(amount >= 0.0, "mutation amount must not be negative");
    for w in weights {
        if rng.random_bool(rate.into()) {
            *w += rng.random_range(-amount..=amount);
        }
    }
}

/// Scales a weight vector to unit Euclidean length.
///
/// A zero vector is left unchanged.
pub fn normalize_l2(weights: &mut [f32]) {
    let norm = weights.iter().map(|w| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for w in weights {
            *w /= norm;
        }
    }
}
