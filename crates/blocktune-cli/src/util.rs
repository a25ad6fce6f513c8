use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;
use blocktune_evaluator::{
    board_feature::{self, BoxedBoardFeature},
    session_evaluator::{DefaultSessionEvaluator, HealthFitness, LinesClearedFitness, SessionEvaluator},
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

/// Writes a training artifact to `path`, or to stdout when no path is given.
pub fn write_artifact(kind: &str, path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    let target = path.map_or_else(|| "stdout".to_owned(), |p| p.display().to_string());
    let mut writer: Box<dyn io::Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {kind} file: {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    writer
        .write_all(contents.as_bytes())
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to write {kind} to {target}"))
}

/// Pretty-printed JSON with a trailing newline.
pub fn to_json_text<T>(value: &T) -> anyhow::Result<String>
where
    T: serde::Serialize,
{
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

pub fn read_json<T>(kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open {kind} file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {kind} JSON file: {}", path.display()))
}

/// Seeded generator for reproducible runs, or an entropy-seeded one.
pub fn run_rng(seed: Option<u64>) -> Pcg32 {
    match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    }
}

/// Board features a weight vector applies to.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeatureSet {
    /// All 14 metrics
    #[default]
    All,
    /// Rows cleared, holes, bumpiness, aggregate height and max height
    Classic,
}

impl FeatureSet {
    pub fn features(self) -> Vec<BoxedBoardFeature> {
        match self {
            FeatureSet::All => board_feature::all_board_features(),
            FeatureSet::Classic => board_feature::classic_board_features(),
        }
    }
}

/// Fitness function used to score training games.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FitnessKind {
    /// Rows cleared
    #[default]
    Lines,
    /// Rows cleared plus a survival bonus discounted by stack height
    Health,
}

impl FitnessKind {
    pub fn session_evaluator(self, turn_limit: Option<usize>) -> Box<dyn SessionEvaluator> {
        match self {
            FitnessKind::Lines => Box::new(DefaultSessionEvaluator::new(
                turn_limit,
                LinesClearedFitness::new(),
            )),
            FitnessKind::Health => {
                Box::new(DefaultSessionEvaluator::new(turn_limit, HealthFitness::new()))
            }
        }
    }
}
