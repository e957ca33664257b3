use std::path::PathBuf;

use thiserror::Error;

use super::{AssetClass, EpisodeId};

/// Why one episode could not be muxed. Failures are local to the episode
/// and never abort the remaining ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MuxFailure {
    #[error("{0} not found")]
    AssetMissing(AssetClass),

    #[error("assembly failed: {0}")]
    Assembly(String),
}

/// Per-episode result, created once and collected into the run report.
#[derive(Debug, Clone)]
pub enum MuxOutcome {
    /// The episode was muxed to `output`.
    Muxed { episode: EpisodeId, output: PathBuf },
    /// Dry run only: the subtitle source exists.
    Validated { episode: EpisodeId },
    Failed {
        episode: EpisodeId,
        reason: MuxFailure,
    },
}

impl MuxOutcome {
    #[must_use]
    pub const fn episode(&self) -> &EpisodeId {
        match self {
            Self::Muxed { episode, .. }
            | Self::Validated { episode }
            | Self::Failed { episode, .. } => episode,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Aggregated outcomes for one run.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<MuxOutcome>,
}

impl RunReport {
    pub fn record(&mut self, outcome: MuxOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[MuxOutcome] {
        &self.outcomes
    }
}
