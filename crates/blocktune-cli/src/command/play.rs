use std::path::PathBuf;

use blocktune_engine::{GameField, GameStats, PieceSeed};
use blocktune_evaluator::{
    board_feature::{self, CLASSIC_WEIGHTS},
    placement_evaluator::FeatureBasedPlacementEvaluator,
    turn_evaluator::TurnEvaluator,
};
use rand::Rng as _;

use crate::{
    model::ai_model::AiModel,
    util::{self, FeatureSet},
};

/// Plays with the baseline classic weights unless `--model` or `--weights` is given.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to a trained model file (JSON format)
    #[arg(long, conflicts_with = "weights")]
    model: Option<PathBuf>,
    /// Comma-separated weights, one per feature (e.g. `--weights=0.9,-0.3,...`)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    weights: Option<Vec<f32>>,
    /// Features the `--weights` apply to
    #[arg(long, value_enum, default_value_t, requires = "weights")]
    features: FeatureSet,
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Maximum number of pieces per game
    #[arg(long)]
    turn_limit: Option<usize>,
    /// Seed for the piece sequences
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        model,
        weights,
        features,
        games,
        turn_limit,
        seed,
    } = arg;
    anyhow::ensure!(*games > 0, "At least one game is required");

    let (board_features, weights) = match (model, weights) {
        (Some(path), _) => AiModel::open(path)?.to_feature_weights()?,
        (None, Some(weights)) => {
            let board_features = features.features();
            anyhow::ensure!(
                weights.len() == board_features.len(),
                "{} weights given, but the {features:?} feature set has {}",
                weights.len(),
                board_features.len()
            );
            (board_features, weights.clone())
        }
        (None, None) => (
            board_feature::classic_board_features(),
            CLASSIC_WEIGHTS.to_vec(),
        ),
    };
    let turn_evaluator =
        TurnEvaluator::new(Box::new(FeatureBasedPlacementEvaluator::new(board_features, weights)));

    let mut rng = util::run_rng(*seed);
    let mut rows = Vec::with_capacity(*games);
    for game in 1..=*games {
        let mut field = GameField::with_seed(rng.random::<PieceSeed>());
        let stats: GameStats = turn_evaluator.play_session(&mut field, *turn_limit);
        tracing::debug!(
            game,
            rows = stats.total_cleared_rows(),
            turns = stats.turns(),
            lost = field.is_lost(),
            "game finished"
        );
        println!(
            "Game {game:3}: {:6} rows, {:7} pieces{}",
            stats.total_cleared_rows(),
            stats.turns(),
            if field.is_lost() { "" } else { " (turn limit)" }
        );
        rows.push(stats.total_cleared_rows());
    }

    #[expect(clippy::cast_precision_loss)]
    let average = rows.iter().sum::<usize>() as f64 / rows.len() as f64;
    let min = rows.iter().min().copied().unwrap_or_default();
    let max = rows.iter().max().copied().unwrap_or_default();
    println!();
    println!("Ave: {average:.1}");
    println!("Min: {min}");
    println!("Max: {max}");

    Ok(())
}
