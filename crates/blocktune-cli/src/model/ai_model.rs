use std::{collections::BTreeMap, iter, path::Path};

use blocktune_evaluator::board_feature::{self, BoardFeature as _, BoxedBoardFeature};
use blocktune_training::genetic::BestGenomeRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util;

/// Best genome of a training run, saved as JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub fitness: f32,
    pub generation: usize,
    pub placement_weights: BTreeMap<String, f32>,
}

impl AiModel {
    pub fn from_best(name: String, features: &[BoxedBoardFeature], best: &BestGenomeRecord) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            fitness: best.fitness(),
            generation: best.generation(),
            placement_weights: iter::zip(features, best.weights())
                .map(|(f, w)| (f.id().to_owned(), *w))
                .collect(),
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        util::read_json("AI model", path)
    }

    /// Saves the model as JSON to `path`, or prints it to stdout.
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<()> {
        util::write_artifact("AI model", path, &util::to_json_text(self)?)
    }

    /// Features named by the model, in palette order, with their weights.
    pub(crate) fn to_feature_weights(&self) -> anyhow::Result<(Vec<BoxedBoardFeature>, Vec<f32>)> {
        if let Some(unknown) = self
            .placement_weights
            .keys()
            .find(|id| board_feature::board_feature_by_id(id).is_none())
        {
            anyhow::bail!("Feature ID {unknown} in model not found");
        }
        Ok(board_feature::all_board_features()
            .into_iter()
            .filter_map(|f| {
                let weight = *self.placement_weights.get(f.id())?;
                Some((f, weight))
            })
            .unzip())
    }
}
