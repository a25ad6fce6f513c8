//! Generational genetic algorithm over feature weight vectors.
//!
//! # Algorithm Overview
//!
//! Every generation goes through the same cycle:
//!
//! 1. **Evaluate Fitness** - Each genome plays game sessions with its weights; the outcome is
//!    recorded with [`EvolutionEngine::record_fitness`], in population order
//! 2. **Track Best** - Once every genome is scored, the best of the generation (first index
//!    wins ties) replaces the best-ever record if it is strictly better
//! 3. **Survivor Selection** - The top `floor(N × (1 - offspring_fraction)) + 1` genomes are
//!    kept unchanged (capped at N)
//! 4. **Crossover** - The top `floor(((1 - offspring_fraction) × N + 1) / 2) + 1` performers are
//!    paired consecutively (best with second, second with third, and so on, wrapping around);
//!    each pair is combined with a fitness-weighted [`crossover`](weights::crossover) and
//!    normalized
//! 5. **Mutation** - Each pair yields two children, mutated independently and normalized again
//! 6. **Shuffle** - All offspring are shuffled and the first `N - survivors` are appended after
//!    the survivors, so children of any bred pair may make it into the next generation
//!
//! The engine is a small state machine ([`EvolutionState`]): it waits for fitness scores until
//! the generation is complete, and only then allows [`EvolutionEngine::advance_generation`].
//!
//! # Parallelization
//!
//! [`evaluate_generation`] plays every pending genome on its own scoped thread. Results are
//! collected per genome and recorded in population order afterwards, so the outcome does not
//! depend on thread scheduling.
//!
//! # Example
//!
//! ```
//! use blocktune_engine::{GameField, PieceSeed};
//! use blocktune_evaluator::{
//!     board_feature::classic_board_features,
//!     session_evaluator::{DefaultSessionEvaluator, LinesClearedFitness},
//! };
//! use blocktune_training::genetic::{self, EvolutionConfig, EvolutionEngine, Population};
//!
//! let features = classic_board_features();
//! let mut rng = rand::rng();
//! let population = Population::random(&mut rng, 4, features.len());
//! let mut engine = EvolutionEngine::new(population, EvolutionConfig::default(), rng);
//!
//! let session_evaluator = DefaultSessionEvaluator::new(Some(20), LinesClearedFitness::new());
//! let fields = [GameField::with_seed(PieceSeed::from(1))];
//! for _ in 0..2 {
//!     genetic::evaluate_generation(&mut engine, &features, &session_evaluator, &fields).unwrap();
//!     engine.advance_generation().unwrap();
//! }
//! assert_eq!(engine.generation(), 3);
//! assert!(engine.best().is_some());
//! ```

use std::{iter, mem, thread};

use rand::{Rng, seq::SliceRandom as _};

use blocktune_engine::GameField;
use blocktune_evaluator::{
    board_feature::BoxedBoardFeature, placement_evaluator::FeatureBasedPlacementEvaluator,
    session_evaluator::SessionEvaluator, turn_evaluator::TurnEvaluator,
};

use crate::{EvolutionError, weights};

/// A candidate weight vector and, once evaluated, its fitness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Genome {
    weights: Vec<f32>,
    fitness: Option<f32>,
}

impl Genome {
    #[must_use]
    pub fn new(weights: Vec<f32>) -> Self {
        Self {
            weights,
            fitness: None,
        }
    }

    /// Creates a genome with random unit-length weights.
    pub fn random<R>(rng: &mut R, feature_count: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::random(rng, feature_count))
    }

    /// Consumes an unscored genome and returns it with `fitness` set.
    ///
    /// # Panics
    ///
    /// Panics if the genome already has a fitness.
    #[must_use]
    pub fn with_fitness(self, fitness: f32) -> Self {
        assert!(self.fitness.is_none(), "genome already has a fitness");
        Self {
            fitness: Some(fitness),
            ..self
        }
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }
}

/// A fixed-size, ordered collection of genomes.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    /// Builds an unscored population from weight vectors.
    ///
    /// # Panics
    ///
    /// Panics if `weights` is empty or the vectors have different lengths.
    #[must_use]
    pub fn new(weights: Vec<Vec<f32>>) -> Self {
        assert!(!weights.is_empty(), "population must not be empty");
        let len = weights[0].len();
        assert!(
            weights.iter().all(|w| w.len() == len),
            "all genomes must have the same number of weights"
        );
        Self {
            genomes: weights.into_iter().map(Genome::new).collect(),
        }
    }

    /// Creates `count` genomes with random unit-length weights.
    #[must_use]
    pub fn random<R>(rng: &mut R, count: usize, feature_count: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(
            (0..count)
                .map(|_| weights::random(rng, feature_count))
                .collect(),
        )
    }

    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Number of weights in every genome.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.genomes[0].weights.len()
    }
}

/// Rates that control how the next generation is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionConfig {
    /// Share of the population replaced by offspring every generation.
    pub offspring_fraction: f32,
    /// Probability of mutating each gene of a child.
    pub mutation_rate: f32,
    /// Maximum absolute offset added to a mutated gene.
    pub mutation_amount: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            offspring_fraction: 0.3,
            mutation_rate: 0.05,
            mutation_amount: 0.2,
        }
    }
}

impl EvolutionConfig {
    /// Number of genomes kept unchanged in a population of `size`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn survivor_count(&self, size: usize) -> usize {
        let kept = (size as f32 * (1.0 - self.offspring_fraction)).floor() as usize + 1;
        kept.min(size)
    }

    /// Number of ranked pairs bred in a population of `size`.
    ///
    /// Never fewer than needed to refill the population with two children per pair.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn pair_count(&self, size: usize) -> usize {
        let pairs =
            ((size as f32 * (1.0 - self.offspring_fraction) + 1.0) / 2.0).floor() as usize + 1;
        let needed = size - self.survivor_count(size);
        pairs.max(needed.div_ceil(2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionState {
    /// The first `scored` genomes have a fitness; the next one is waiting.
    AwaitingFitness { scored: usize },
    /// Every genome has a fitness; the generation can advance.
    GenerationComplete,
}

/// The best genome seen so far, across all generations.
#[derive(Debug, Clone, PartialEq)]
pub struct BestGenomeRecord {
    fitness: f32,
    generation: usize,
    index: usize,
    weights: Vec<f32>,
}

impl BestGenomeRecord {
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Generation the genome was scored in (the first generation is 1).
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Position of the genome within its generation.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Fitness statistics of a fully scored generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    pub generation: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl GenerationSummary {
    #[expect(clippy::cast_precision_loss)]
    fn from_fitness(generation: usize, fitness: &[f32]) -> Self {
        let min = fitness.iter().copied().fold(f32::INFINITY, f32::min);
        let max = fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = fitness.iter().sum::<f32>() / fitness.len() as f32;
        Self {
            generation,
            min,
            max,
            mean,
        }
    }
}

/// Drives the genetic algorithm one fitness score at a time.
///
/// The population, the best-ever record and the random source all belong to the engine, so
/// independent engines never influence each other.
#[derive(Debug)]
pub struct EvolutionEngine<R> {
    config: EvolutionConfig,
    population: Population,
    generation: usize,
    scored: usize,
    best: Option<BestGenomeRecord>,
    summary: Option<GenerationSummary>,
    rng: R,
}

impl<R> EvolutionEngine<R>
where
    R: Rng,
{
    /// Starts at generation 1 with an unscored population.
    ///
    /// # Panics
    ///
    /// Panics if `offspring_fraction` or `mutation_rate` is outside `[0, 1]`, or
    /// `mutation_amount` is negative.
    pub fn new(population: Population, config: EvolutionConfig, rng: R) -> Self {
        assert!(
            (0.0..=1.0).contains(&config.offspring_fraction),
            "offspring fraction must be within [0, 1]"
        );
        assert!(
            (0.0..=1.0).contains(&config.mutation_rate),
            "mutation rate must be within [0, 1]"
        );
        assert!(
            config.mutation_amount >= 0.0,
            "mutation amount must not be negative"
        );
        let genomes = population
            .genomes
            .into_iter()
            .map(|g| Genome::new(g.weights))
            .collect();
        Self {
            config,
            population: Population { genomes },
            generation: 1,
            scored: 0,
            best: None,
            summary: None,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Current generation number, starting at 1.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn best(&self) -> Option<&BestGenomeRecord> {
        self.best.as_ref()
    }

    /// Statistics of the current generation, once every genome is scored.
    #[must_use]
    pub fn summary(&self) -> Option<GenerationSummary> {
        self.summary
    }

    #[must_use]
    pub fn state(&self) -> EvolutionState {
        if self.scored == self.population.len() {
            EvolutionState::GenerationComplete
        } else {
            EvolutionState::AwaitingFitness {
                scored: self.scored,
            }
        }
    }

    /// Weights of the genome waiting for its fitness, if any.
    #[must_use]
    pub fn current_candidate(&self) -> Option<&[f32]> {
        self.population
            .genomes
            .get(self.scored)
            .map(Genome::weights)
    }

    /// Records the fitness of [`current_candidate`](Self::current_candidate).
    ///
    /// Scoring the last genome completes the generation and updates the best record.
    ///
    /// # Panics
    ///
    /// Panics if `fitness` is NaN.
    pub fn record_fitness(&mut self, fitness: f32) -> Result<EvolutionState, EvolutionError> {
        assert!(!fitness.is_nan(), "fitness must be a number");
        let EvolutionState::AwaitingFitness { scored } = self.state() else {
            return Err(EvolutionError::GenerationComplete);
        };
        let slot = &mut self.population.genomes[scored];
        *slot = mem::take(slot).with_fitness(fitness);
        self.scored += 1;
        tracing::debug!(
            generation = self.generation,
            index = scored,
            fitness,
            "genome scored"
        );

        let state = self.state();
        if state == EvolutionState::GenerationComplete {
            self.complete_generation();
        }
        Ok(state)
    }

    fn complete_generation(&mut self) {
        let fitness: Vec<f32> = self
            .population
            .genomes
            .iter()
            .map(|g| g.fitness.unwrap_or(f32::MIN))
            .collect();

        let mut best_index = 0;
        for (i, &f) in fitness.iter().enumerate() {
            if f > fitness[best_index] {
                best_index = i;
            }
        }
        let best_fitness = fitness[best_index];

        let summary = GenerationSummary::from_fitness(self.generation, &fitness);
        tracing::info!(
            generation = summary.generation,
            min = summary.min,
            max = summary.max,
            mean = summary.mean,
            "generation complete"
        );
        self.summary = Some(summary);

        if self.best.as_ref().is_none_or(|b| best_fitness > b.fitness) {
            tracing::info!(
                generation = self.generation,
                index = best_index,
                fitness = best_fitness,
                "new best genome"
            );
            self.best = Some(BestGenomeRecord {
                fitness: best_fitness,
                generation: self.generation,
                index: best_index,
                weights: self.population.genomes[best_index].weights.clone(),
            });
        }
    }

    /// Replaces the scored population with the next generation.
    pub fn advance_generation(&mut self) -> Result<(), EvolutionError> {
        if self.state() != EvolutionState::GenerationComplete {
            return Err(EvolutionError::GenerationIncomplete);
        }
        let size = self.population.len();

        // stable ascending sort, then reversed: best first
        let mut ranked: Vec<(Vec<f32>, f32)> = mem::take(&mut self.population.genomes)
            .into_iter()
            .map(|g| {
                let fitness = g.fitness.unwrap_or(f32::MIN);
                (g.weights, fitness)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.reverse();

        let survivor_count = self.config.survivor_count(size);
        let offspring_count = size - survivor_count;
        let mut offspring = if offspring_count == 0 {
            vec![]
        } else {
            self.breed(&ranked, self.config.pair_count(size))
        };
        offspring.shuffle(&mut self.rng);
        offspring.truncate(offspring_count);

        self.population.genomes = ranked
            .into_iter()
            .take(survivor_count)
            .map(|(w, _)| w)
            .chain(offspring)
            .map(Genome::new)
            .collect();
        self.scored = 0;
        self.summary = None;
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            survivors = survivor_count,
            offspring = offspring_count,
            "generation advanced"
        );
        Ok(())
    }

    /// Produces two children for each of the first `pairs` consecutive pairs of `ranked`.
    fn breed(&mut self, ranked: &[(Vec<f32>, f32)], pairs: usize) -> Vec<Vec<f32>> {
        let EvolutionConfig {
            mutation_rate,
            mutation_amount,
            ..
        } = self.config;
        let mut children = Vec::with_capacity(pairs * 2);
        for pair in 0..pairs {
            let (w1, f1) = &ranked[pair % ranked.len()];
            let (w2, f2) = &ranked[(pair + 1) % ranked.len()];
            let mut child = weights::crossover(w1, *f1, w2, *f2);
            weights::normalize_l2(&mut child);
            for _ in 0..2 {
                let mut mutated = child.clone();
                weights::mutate(&mut mutated, mutation_amount, mutation_rate, &mut self.rng);
                weights::normalize_l2(&mut mutated);
                children.push(mutated);
            }
        }
        children
    }
}

/// Plays every genome still waiting for a fitness, one thread per genome, and records the
/// results in population order.
pub fn evaluate_generation<R, E>(
    engine: &mut EvolutionEngine<R>,
    features: &[BoxedBoardFeature],
    session_evaluator: &E,
    fields: &[GameField],
) -> Result<(), EvolutionError>
where
    R: Rng,
    E: SessionEvaluator + ?Sized,
{
    let EvolutionState::AwaitingFitness { scored } = engine.state() else {
        return Err(EvolutionError::GenerationComplete);
    };
    let pending = &engine.population().genomes()[scored..];
    let mut results = vec![0.0; pending.len()];

    thread::scope(|s| {
        for (genome, result) in iter::zip(pending, &mut results) {
            let placement_evaluator =
                FeatureBasedPlacementEvaluator::new(features.to_vec(), genome.weights().to_vec());
            s.spawn(move || {
                let turn_evaluator = TurnEvaluator::new(Box::new(placement_evaluator));
                *result = session_evaluator.play_and_evaluate_sessions(fields, &turn_evaluator);
            });
        }
    });

    for fitness in results {
        engine.record_fitness(fitness)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use blocktune_engine::PieceSeed;
    use blocktune_evaluator::{
        board_feature::classic_board_features,
        session_evaluator::{DefaultSessionEvaluator, LinesClearedFitness},
    };
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn engine(size: usize, config: EvolutionConfig) -> EvolutionEngine<Pcg32> {
        seeded_engine(1234, size, config)
    }

    fn seeded_engine(seed: u64, size: usize, config: EvolutionConfig) -> EvolutionEngine<Pcg32> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let population = Population::random(&mut rng, size, 14);
        EvolutionEngine::new(population, config, rng)
    }

    fn score_all(engine: &mut EvolutionEngine<Pcg32>, fitness: &[f32]) {
        for &f in fitness {
            engine.record_fitness(f).unwrap();
        }
    }

    #[test]
    fn test_with_fitness_sets_once() {
        let genome = Genome::new(vec![1.0, 0.0]).with_fitness(3.5);
        assert_eq!(genome.fitness(), Some(3.5));
        assert_eq!(genome.weights(), [1.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "genome already has a fitness")]
    fn test_with_fitness_twice_panics() {
        let _ = Genome::new(vec![1.0]).with_fitness(1.0).with_fitness(2.0);
    }

    #[test]
    fn test_survivor_count() {
        let config = EvolutionConfig::default();
        assert_eq!(config.survivor_count(10), 8);
        assert_eq!(config.survivor_count(3), 3);
        assert_eq!(config.survivor_count(1), 1);

        let all_offspring = EvolutionConfig {
            offspring_fraction: 1.0,
            ..config
        };
        assert_eq!(all_offspring.survivor_count(10), 1);
    }

    #[test]
    fn test_pair_count() {
        let config = EvolutionConfig::default();
        assert_eq!(config.pair_count(10), 5);
        assert_eq!(config.pair_count(3), 2);
        assert_eq!(config.pair_count(1), 1);
        assert_eq!(config.pair_count(100), 36);

        // 9 offspring needed, so at least 5 pairs
        let all_offspring = EvolutionConfig {
            offspring_fraction: 1.0,
            ..config
        };
        assert_eq!(all_offspring.pair_count(10), 5);
    }

    #[test]
    fn test_state_machine() {
        let mut engine = engine(3, EvolutionConfig::default());
        assert_eq!(engine.generation(), 1);
        assert_eq!(
            engine.state(),
            EvolutionState::AwaitingFitness { scored: 0 }
        );
        assert!(matches!(
            engine.advance_generation(),
            Err(EvolutionError::GenerationIncomplete)
        ));

        let second = engine.population().genomes()[1].weights().to_vec();
        assert_eq!(
            engine.record_fitness(1.0).unwrap(),
            EvolutionState::AwaitingFitness { scored: 1 }
        );
        assert_eq!(engine.current_candidate(), Some(second.as_slice()));
        engine.record_fitness(2.0).unwrap();
        assert!(engine.summary().is_none());
        assert_eq!(
            engine.record_fitness(3.0).unwrap(),
            EvolutionState::GenerationComplete
        );

        assert!(engine.current_candidate().is_none());
        assert!(matches!(
            engine.record_fitness(4.0),
            Err(EvolutionError::GenerationComplete)
        ));

        engine.advance_generation().unwrap();
        assert_eq!(engine.generation(), 2);
        assert_eq!(
            engine.state(),
            EvolutionState::AwaitingFitness { scored: 0 }
        );
        assert!(engine.population().genomes().iter().all(|g| g.fitness().is_none()));
    }

    #[test]
    fn test_summary() {
        let mut engine = engine(4, EvolutionConfig::default());
        score_all(&mut engine, &[2.0, 8.0, 0.0, 6.0]);
        let summary = engine.summary().unwrap();
        assert_eq!(summary.generation, 1);
        assert!((summary.min - 0.0).abs() < f32::EPSILON);
        assert!((summary.max - 8.0).abs() < f32::EPSILON);
        assert!((summary.mean - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_best_record_first_index_wins_and_only_strictly_better_replaces() {
        let mut engine = engine(3, EvolutionConfig::default());
        let expected = engine.population().genomes()[1].weights().to_vec();
        score_all(&mut engine, &[1.0, 5.0, 5.0]);
        let best = engine.best().unwrap();
        assert_eq!((best.generation(), best.index()), (1, 1));
        assert_eq!(best.weights(), expected);

        engine.advance_generation().unwrap();
        score_all(&mut engine, &[5.0, 2.0, 2.0]);
        let best = engine.best().unwrap();
        assert_eq!((best.generation(), best.index()), (1, 1));

        engine.advance_generation().unwrap();
        score_all(&mut engine, &[0.0, 0.0, 6.0]);
        let best = engine.best().unwrap();
        assert_eq!((best.generation(), best.index()), (3, 2));
        assert!((best.fitness() - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_survivors_are_kept_best_first() {
        let mut engine = engine(10, EvolutionConfig::default());
        let before: Vec<Vec<f32>> = engine
            .population()
            .genomes()
            .iter()
            .map(|g| g.weights().to_vec())
            .collect();
        let fitness: Vec<f32> = (0..10_u8).map(f32::from).collect();
        score_all(&mut engine, &fitness);
        engine.advance_generation().unwrap();

        let after = engine.population().genomes();
        assert_eq!(after.len(), 10);
        for (i, genome) in after.iter().take(8).enumerate() {
            assert_eq!(genome.weights(), before[9 - i]);
        }
        for genome in &after[8..] {
            let norm = genome.weights().iter().map(|w| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    /// Normalized crossover children of the top `pairs` consecutive pairs, with fitness equal
    /// to the genome index.
    fn expected_children(before: &[Vec<f32>], pairs: usize) -> Vec<Vec<f32>> {
        let n = before.len();
        (0..pairs)
            .map(|i| {
                let (hi, lo) = (n - 1 - i, n - 2 - i);
                #[expect(clippy::cast_precision_loss)]
                let mut child =
                    weights::crossover(&before[hi], hi as f32, &before[lo], lo as f32);
                weights::normalize_l2(&mut child);
                child
            })
            .collect()
    }

    fn matching_pair(expected: &[Vec<f32>], weights: &[f32]) -> Option<usize> {
        expected.iter().position(|child| {
            child
                .iter()
                .zip(weights)
                .all(|(a, b)| (a - b).abs() < 1e-6)
        })
    }

    /// Advances a 10-genome generation scored by index, without mutation. Returns the
    /// population before and after.
    fn advance_without_mutation(seed: u64) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let config = EvolutionConfig {
            mutation_rate: 0.0,
            ..EvolutionConfig::default()
        };
        let mut engine = seeded_engine(seed, 10, config);
        let weights_of = |engine: &EvolutionEngine<Pcg32>| -> Vec<Vec<f32>> {
            engine
                .population()
                .genomes()
                .iter()
                .map(|g| g.weights().to_vec())
                .collect()
        };
        let before = weights_of(&engine);
        let fitness: Vec<f32> = (0..10_u8).map(f32::from).collect();
        score_all(&mut engine, &fitness);
        engine.advance_generation().unwrap();
        (before, weights_of(&engine))
    }

    #[test]
    fn test_offspring_without_mutation_is_normalized_crossover() {
        let (before, after) = advance_without_mutation(1234);
        // five pairs are bred: (9, 8), (8, 7), (7, 6), (6, 5) and (5, 4)
        let expected = expected_children(&before, 5);
        for weights in &after[8..] {
            assert!(matching_pair(&expected, weights).is_some());
        }
    }

    #[test]
    fn test_offspring_come_from_lower_ranked_pairs() {
        let mut pairs_seen = [false; 5];
        for seed in 0..30 {
            let (before, after) = advance_without_mutation(seed);
            let expected = expected_children(&before, 5);
            for weights in &after[8..] {
                let pair = matching_pair(&expected, weights).unwrap();
                pairs_seen[pair] = true;
            }
        }
        assert!(pairs_seen[0]);
        assert!(pairs_seen[1..].iter().any(|&seen| seen));
    }

    #[test]
    fn test_population_size_and_best_are_stable() {
        let configs = [
            EvolutionConfig::default(),
            EvolutionConfig {
                offspring_fraction: 1.0,
                mutation_rate: 0.5,
                mutation_amount: 0.5,
            },
            EvolutionConfig {
                offspring_fraction: 0.0,
                ..EvolutionConfig::default()
            },
        ];
        let mut fitness_rng = Pcg32::seed_from_u64(99);
        for config in configs {
            for size in [1, 2, 3, 5, 10] {
                let mut engine = engine(size, config);
                let mut last_best = f32::NEG_INFINITY;
                for generation in 1..=6 {
                    assert_eq!(engine.generation(), generation);
                    let fitness: Vec<f32> =
                        (0..size).map(|_| fitness_rng.random_range(0.0..100.0)).collect();
                    score_all(&mut engine, &fitness);
                    let best = engine.best().unwrap().fitness();
                    assert!(best >= last_best);
                    last_best = best;
                    engine.advance_generation().unwrap();
                    assert_eq!(engine.population().len(), size);
                    assert!(
                        engine
                            .population()
                            .genomes()
                            .iter()
                            .all(|g| g.weights().len() == 14)
                    );
                }
            }
        }
    }

    #[test]
    fn test_evaluate_generation_matches_sequential_play() {
        let features = classic_board_features();
        let mut rng = Pcg32::seed_from_u64(5);
        let population = Population::random(&mut rng, 3, features.len());
        let mut engine = EvolutionEngine::new(population, EvolutionConfig::default(), rng);

        let session_evaluator = DefaultSessionEvaluator::new(Some(60), LinesClearedFitness::new());
        let fields = [
            GameField::with_seed(PieceSeed::from(21)),
            GameField::with_seed(PieceSeed::from(22)),
        ];
        let expected: Vec<f32> = engine
            .population()
            .genomes()
            .iter()
            .map(|g| {
                let turn_evaluator = TurnEvaluator::new(Box::new(
                    FeatureBasedPlacementEvaluator::new(features.clone(), g.weights().to_vec()),
                ));
                session_evaluator.play_and_evaluate_sessions(&fields, &turn_evaluator)
            })
            .collect();

        evaluate_generation(&mut engine, &features, &session_evaluator, &fields).unwrap();
        assert_eq!(engine.state(), EvolutionState::GenerationComplete);
        let recorded: Vec<f32> = engine
            .population()
            .genomes()
            .iter()
            .map(|g| g.fitness().unwrap())
            .collect();
        assert_eq!(recorded, expected);

        assert!(matches!(
            evaluate_generation(&mut engine, &features, &session_evaluator, &fields),
            Err(EvolutionError::GenerationComplete)
        ));
    }
}
