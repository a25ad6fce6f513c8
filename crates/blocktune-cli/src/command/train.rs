use std::path::PathBuf;

use blocktune_engine::{GameField, PieceSeed};
use blocktune_training::genetic::{self, EvolutionConfig, EvolutionEngine, Population};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    model::{ai_model::AiModel, population_file::PopulationFile},
    util::{self, FeatureSet, FitnessKind},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Initial population; a random population is used if the file does not exist
    #[arg(long)]
    population_file: Option<PathBuf>,
    /// Number of genomes in a random initial population
    #[arg(long, default_value_t = 10)]
    population_size: usize,
    /// Number of generations to evaluate
    #[arg(long, default_value_t = 10)]
    generations: usize,
    /// Games played by every genome per generation
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Maximum number of pieces per game
    #[arg(long)]
    turn_limit: Option<usize>,
    #[arg(long, value_enum, default_value_t)]
    fitness: FitnessKind,
    #[arg(long, value_enum, default_value_t)]
    features: FeatureSet,
    /// Seed for piece sequences and genetic operators
    #[arg(long)]
    seed: Option<u64>,
    /// Population file written after every generation
    #[arg(long)]
    output: Option<PathBuf>,
    /// Best genome as JSON (stdout if omitted)
    #[arg(long)]
    best_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population_file,
        population_size,
        generations,
        games,
        turn_limit,
        fitness,
        features,
        seed,
        output,
        best_output,
    } = arg;
    anyhow::ensure!(*population_size > 0, "Population size must be at least 1");
    anyhow::ensure!(*games > 0, "At least one game per genome is required");

    let board_features = features.features();
    let session_evaluator = fitness.session_evaluator(*turn_limit);
    let mut run_rng = util::run_rng(*seed);

    let loaded = match population_file {
        Some(path) => {
            let loaded = PopulationFile::load(path)?;
            if loaded.is_none() {
                tracing::warn!(
                    path = %path.display(),
                    "population file not found, starting from a random population"
                );
            }
            loaded
        }
        None => None,
    };
    let population = match loaded {
        Some(file) => {
            let feature_count = file.weights()[0].len();
            anyhow::ensure!(
                feature_count == board_features.len(),
                "Population file has {feature_count} weights per genome, but the {features:?} \
                 feature set has {}",
                board_features.len()
            );
            tracing::info!(genomes = file.weights().len(), "population loaded");
            Population::new(file.into_weights())
        }
        None => Population::random(&mut run_rng, *population_size, board_features.len()),
    };

    let engine_rng = Pcg32::from_rng(&mut run_rng);
    let mut engine = EvolutionEngine::new(population, EvolutionConfig::default(), engine_rng);
    tracing::info!(
        genomes = engine.population().len(),
        features = board_features.len(),
        generations,
        games,
        ?fitness,
        "training started"
    );

    for _ in 0..*generations {
        let fields: Vec<GameField> = (0..*games)
            .map(|_| GameField::with_seed(run_rng.random::<PieceSeed>()))
            .collect();
        genetic::evaluate_generation(&mut engine, &board_features, &*session_evaluator, &fields)?;

        eprintln!("Generation #{}:", engine.generation());
        for (i, genome) in engine.population().genomes().iter().enumerate() {
            eprintln!(
                "  {i:2}: {:.3?} => {:.3}",
                genome.weights(),
                genome.fitness().unwrap_or(f32::NAN)
            );
        }
        if let Some(summary) = engine.summary() {
            eprintln!("  Fitness Stats:");
            eprintln!("    Min:  {:.3}", summary.min);
            eprintln!("    Max:  {:.3}", summary.max);
            eprintln!("    Mean: {:.3}", summary.mean);
        }

        engine.advance_generation()?;
        if let Some(path) = output {
            let genomes = engine.population().genomes();
            PopulationFile::new(genomes.iter().map(|g| g.weights().to_vec()).collect())
                .save(path)?;
            tracing::info!(path = %path.display(), "population saved");
        }
    }

    let Some(best) = engine.best() else {
        eprintln!("No generation was evaluated; no model to save.");
        return Ok(());
    };

    let model = AiModel::from_best(
        format!("{fitness:?}-{features:?}").to_lowercase(),
        &board_features,
        best,
    );
    model.save(best_output.as_deref())?;

    eprintln!();
    eprintln!("Best genome");
    if let Some(path) = best_output {
        eprintln!("  Path: {}", path.display());
        tracing::info!(path = %path.display(), "best genome saved");
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generation: {} (#{})", best.generation(), best.index());
    eprintln!("  Fitness: {:.3}", model.fitness);
    eprintln!("  Weights: {:.3?}", best.weights());

    Ok(())
}
