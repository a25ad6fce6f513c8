//! Plain-text population files.
//!
//! ```text
//! 3
//! 0.51 -0.32 0.11 ...
//! -0.07 0.64 0.23 ...
//! 0.40 -0.19 -0.55 ...
//! ```
//!
//! The first line is the number of genomes, followed by one line of space-separated weights
//! per genome.

use std::{fmt, fs, io, path::Path};

use anyhow::Context;

use crate::util;

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationFile {
    weights: Vec<Vec<f32>>,
}

impl PopulationFile {
    pub fn new(weights: Vec<Vec<f32>>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &[Vec<f32>] {
        &self.weights
    }

    pub fn into_weights(self) -> Vec<Vec<f32>> {
        self.weights
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let count_line = lines.next().context("Population file is empty")?;
        let count: usize = count_line
            .parse()
            .with_context(|| format!("Invalid genome count: {count_line:?}"))?;
        anyhow::ensure!(count > 0, "Population file must contain at least one genome");

        let weights = lines
            .enumerate()
            .map(|(i, line)| {
                line.split_whitespace()
                    .map(str::parse)
                    .collect::<Result<Vec<f32>, _>>()
                    .with_context(|| format!("Invalid weight in genome #{i}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        anyhow::ensure!(
            weights.len() == count,
            "Population file declares {count} genomes but contains {}",
            weights.len()
        );
        let len = weights[0].len();
        anyhow::ensure!(
            weights.iter().all(|w| w.len() == len),
            "Genomes in population file have different numbers of weights"
        );
        Ok(Self { weights })
    }

    /// Loads a population file, or returns `None` if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read population file: {}", path.display())
                });
            }
        };
        let file = Self::parse(&text)
            .with_context(|| format!("Failed to parse population file: {}", path.display()))?;
        Ok(Some(file))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        util::write_artifact("population", Some(path), &self.to_string())
    }
}

impl fmt::Display for PopulationFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.weights.len())?;
        for genome in &self.weights {
            let mut sep = "";
            for w in genome {
                write!(f, "{sep}{w}")?;
                sep = " ";
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
