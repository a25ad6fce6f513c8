//! Training of feature weights with a genetic algorithm.
//!
//! The weights of a [`FeatureBasedPlacementEvaluator`] decide how the agent plays. This crate
//! searches for good weights by self-play: every candidate weight vector plays full games, the
//! outcome becomes its fitness, and the fittest candidates breed the next generation.
//!
//! # Architecture
//!
//! ```text
//! EvolutionEngine (genetic)
//!     ↓ hands out
//! Feature Weights (genomes)
//!     ↓ used by
//! Placement Evaluator (blocktune-evaluator)
//!     ↓ played and scored by
//! Session Evaluator (fitness function)
//!     ↓ recorded into
//! EvolutionEngine → survivors, crossover, mutation
//! ```
//!
//! - [`genetic`] - genomes, populations and the generational state machine
//! - [`weights`] - initialization, crossover, mutation and normalization of weight vectors
//!
//! The core never touches files: loading and saving populations is left to the caller.
//!
//! [`FeatureBasedPlacementEvaluator`]: blocktune_evaluator::placement_evaluator::FeatureBasedPlacementEvaluator

pub mod genetic;
pub mod weights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    #[display("every genome of the current generation already has a fitness")]
    GenerationComplete,
    #[display("the current generation still has genomes without a fitness")]
    GenerationIncomplete,
}
