//! Board features scored by the placement evaluator.
//!
//! Each feature reads one metric from a [`PlacementAnalysis`]. Features are trait objects
//! carrying a stable [`BoardFeature::id`], which is how trained weights are saved and matched
//! back to features.
//!
//! # Palettes
//!
//! - [`all_board_features`] - all 14 metrics in canonical order:
//!
//!   | # | id |
//!   |---|---|
//!   | 0 | `rows_cleared` |
//!   | 1 | `num_holes` |
//!   | 2 | `bumpiness` |
//!   | 3 | `aggregate_height` |
//!   | 4 | `max_height` |
//!   | 5 | `connected_holes` |
//!   | 6 | `sum_of_wells` |
//!   | 7 | `max_well_depth` |
//!   | 8 | `blocks` |
//!   | 9 | `weighted_blocks` |
//!   | 10 | `row_transitions` |
//!   | 11 | `column_transitions` |
//!   | 12 | `imbalance` |
//!   | 13 | `ideal_position_bonus` |
//!
//! - [`classic_board_features`] - the first five, paired with [`CLASSIC_WEIGHTS`] as a
//!   baseline for playing without a trained model.

use std::fmt;

use crate::placement_analysis::PlacementAnalysis;

/// Baseline weights for [`classic_board_features`].
///
/// Bumpiness here sums squared height steps, so these weights penalize jagged surfaces harder
/// than the same numbers would against absolute steps.
pub const CLASSIC_WEIGHTS: [f32; 5] = [10.0, -0.1, -0.1, -0.5, -0.1];

#[must_use]
pub fn all_board_features() -> Vec<BoxedBoardFeature> {
    vec![
        Box::new(RowsCleared),
        Box::new(NumHoles),
        Box::new(Bumpiness),
        Box::new(AggregateHeight),
        Box::new(MaxHeight),
        Box::new(ConnectedHoles),
        Box::new(SumOfWells),
        Box::new(MaxWellDepth),
        Box::new(Blocks),
        Box::new(WeightedBlocks),
        Box::new(RowTransitions),
        Box::new(ColumnTransitions),
        Box::new(Imbalance),
        Box::new(IdealPositionBonus),
    ]
}

#[must_use]
pub fn classic_board_features() -> Vec<BoxedBoardFeature> {
    vec![
        Box::new(RowsCleared),
        Box::new(NumHoles),
        Box::new(Bumpiness),
        Box::new(AggregateHeight),
        Box::new(MaxHeight),
    ]
}

/// Looks up a feature by its id.
#[must_use]
pub fn board_feature_by_id(id: &str) -> Option<BoxedBoardFeature> {
    all_board_features().into_iter().find(|f| f.id() == id)
}

pub trait BoardFeature: fmt::Debug + Send + Sync {
    #[must_use]
    fn id(&self) -> &str;
    #[must_use]
    fn name(&self) -> &str;
    #[must_use]
    fn clone_boxed(&self) -> BoxedBoardFeature;
    #[must_use]
    fn extract_raw(&self, analysis: &PlacementAnalysis) -> u32;

    /// Feature value as multiplied by its weight.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    fn value(&self, analysis: &PlacementAnalysis) -> f32 {
        self.extract_raw(analysis) as f32
    }
}

pub type BoxedBoardFeature = Box<dyn BoardFeature>;

impl Clone for BoxedBoardFeature {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl BoardFeature for BoxedBoardFeature {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn clone_boxed(&self) -> BoxedBoardFeature {
        self.as_ref().clone_boxed()
    }

    fn extract_raw(&self, analysis: &PlacementAnalysis) -> u32 {
        self.as_ref().extract_raw(analysis)
    }

    fn value(&self, analysis: &PlacementAnalysis) -> f32 {
        self.as_ref().value(analysis)
    }
}

macro_rules! board_feature {
    ($(#[$meta:meta])* $ty:ident, $id:literal, $name:literal, |$analysis:ident| $extract:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $ty;

        impl BoardFeature for $ty {
            fn id(&self) -> &'static str {
                $id
            }
            fn name(&self) -> &'static str {
                $name
            }
            fn clone_boxed(&self) -> BoxedBoardFeature {
                Box::new(self.clone())
            }
            fn extract_raw(&self, $analysis: &PlacementAnalysis) -> u32 {
                $extract
            }
        }
    };
}

board_feature!(
    /// Rows cleared by the move.
    RowsCleared,
    "rows_cleared",
    "Rows Cleared",
    |analysis| u32::try_from(analysis.cleared_rows()).unwrap_or(u32::MAX)
);

board_feature!(
    /// Empty cells below their column's height, counted per cell.
    NumHoles,
    "num_holes",
    "Number of Holes",
    |analysis| analysis.board_analysis().num_holes()
);

board_feature!(
    /// Sum of squared height differences between adjacent columns.
    Bumpiness,
    "bumpiness",
    "Bumpiness",
    |analysis| analysis.board_analysis().bumpiness()
);

board_feature!(
    AggregateHeight,
    "aggregate_height",
    "Aggregate Height",
    |analysis| analysis.board_analysis().aggregate_height()
);

board_feature!(
    MaxHeight,
    "max_height",
    "Max Height",
    |analysis| analysis.board_analysis().max_height().into()
);

board_feature!(
    /// Maximal vertical runs of holes, each run counted once.
    ConnectedHoles,
    "connected_holes",
    "Connected Holes",
    |analysis| analysis.board_analysis().connected_holes()
);

board_feature!(
    /// Empty cells flanked by occupied cells (or a board edge) on both sides.
    SumOfWells,
    "sum_of_wells",
    "Sum of Wells",
    |analysis| analysis.board_analysis().sum_of_wells()
);

board_feature!(
    MaxWellDepth,
    "max_well_depth",
    "Max Well Depth",
    |analysis| analysis.board_analysis().max_well_depth()
);

board_feature!(
    Blocks,
    "blocks",
    "Blocks",
    |analysis| analysis.board_analysis().blocks()
);

board_feature!(
    /// Occupied cells weighted by row number, with the floor row weighing 1.
    WeightedBlocks,
    "weighted_blocks",
    "Weighted Blocks",
    |analysis| analysis.board_analysis().weighted_blocks()
);

board_feature!(
    RowTransitions,
    "row_transitions",
    "Row Transitions",
    |analysis| analysis.board_analysis().row_transitions()
);

board_feature!(
    ColumnTransitions,
    "column_transitions",
    "Column Transitions",
    |analysis| analysis.board_analysis().column_transitions()
);

board_feature!(
    /// Differences in occupied-cell counts between adjacent columns.
    Imbalance,
    "imbalance",
    "Imbalance",
    |analysis| analysis.board_analysis().imbalance()
);

board_feature!(
    /// Bonus for surface shapes that match an ideal-position template.
    IdealPositionBonus,
    "ideal_position_bonus",
    "Ideal Position Bonus",
    |analysis| analysis.board_analysis().ideal_position_bonus()
);

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use blocktune_engine::{Board, Move, Orientation, PieceKind};

    use super::*;

    #[test]
    fn test_palette_order_and_ids() {
        let ids: Vec<String> = all_board_features()
            .iter()
            .map(|f| f.id().to_owned())
            .collect();
        assert_eq!(
            ids,
            [
                "rows_cleared",
                "num_holes",
                "bumpiness",
                "aggregate_height",
                "max_height",
                "connected_holes",
                "sum_of_wells",
                "max_well_depth",
                "blocks",
                "weighted_blocks",
                "row_transitions",
                "column_transitions",
                "imbalance",
                "ideal_position_bonus",
            ]
        );
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_classic_palette_is_prefix() {
        let all = all_board_features();
        let classic = classic_board_features();
        assert_eq!(classic.len(), CLASSIC_WEIGHTS.len());
        for (c, a) in classic.iter().zip(&all) {
            assert_eq!(c.id(), a.id());
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let feature = board_feature_by_id("max_well_depth").unwrap();
        assert_eq!(feature.name(), "Max Well Depth");
        assert!(board_feature_by_id("no_such_feature").is_none());
    }

    #[test]
    fn test_values_read_the_post_move_board() {
        let board = Board::from_ascii(
            "
            #.........
            #########.
            ",
        );
        let analysis =
            PlacementAnalysis::simulate(&board, PieceKind::I, Move::new(Orientation::new(0), 9))
                .unwrap();
        let values: Vec<f32> = classic_board_features()
            .iter()
            .map(|f| f.value(&analysis))
            .collect();
        // heights after the clear: [1, 0, .., 0, 3]
        assert_eq!(values, [1.0, 0.0, 1.0 + 9.0, 4.0, 3.0]);

        let score: f32 = values.iter().zip(CLASSIC_WEIGHTS).map(|(v, w)| v * w).sum();
        // the 3-high step costs 0.9 against squared bumpiness
        assert!((score - (10.0 - 0.1 * 10.0 - 0.5 * 4.0 - 0.1 * 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_classic_weights_reward_only_cleared_rows() {
        assert!(CLASSIC_WEIGHTS[0] > 0.0);
        assert!(CLASSIC_WEIGHTS[1..].iter().all(|&w| w < 0.0));
    }

    #[test]
    fn test_boxed_clone_keeps_identity() {
        let features = all_board_features();
        let cloned = features.clone();
        for (a, b) in features.iter().zip(&cloned) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.name(), b.name());
        }
    }
}
