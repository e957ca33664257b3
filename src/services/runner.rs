//! Per-episode mux loop.
//!
//! Episodes are independent and processed to completion one at a time;
//! a failed episode is recorded and never aborts its siblings.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::constants::FONT_EXTENSIONS;
use crate::discovery::FileDiscovery;
use crate::models::{
    AssetClass, EpisodeId, EpisodeSelection, MuxFailure, MuxOutcome, RunReport,
};
use crate::services::assembly::{AssemblyJob, MediaAssembly};
use crate::services::resolver::AssetResolver;

/// How a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Normal,
    /// Parse and subtitle validation only; video and audio roots are
    /// never touched and nothing is written.
    DryRun,
}

/// Per-run options collected at the CLI boundary.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub out_dir: PathBuf,
    pub flag: String,
    pub version: u32,
    pub mode: RunMode,
}

pub struct MuxRunner {
    config: Config,
    resolver: AssetResolver,
    discovery: Arc<dyn FileDiscovery>,
    assembly: Arc<dyn MediaAssembly>,
}

impl MuxRunner {
    #[must_use]
    pub fn new(
        config: Config,
        discovery: Arc<dyn FileDiscovery>,
        assembly: Arc<dyn MediaAssembly>,
    ) -> Self {
        let resolver = AssetResolver::new(config.paths.clone(), Arc::clone(&discovery));
        Self {
            config,
            resolver,
            discovery,
            assembly,
        }
    }

    pub async fn run(&self, selection: &EpisodeSelection, options: &RunOptions) -> RunReport {
        let mut report = RunReport::default();

        for episode in selection.iter() {
            let outcome = match options.mode {
                RunMode::DryRun => self.validate_episode(episode),
                RunMode::Normal => self.mux_episode(episode, options).await,
            };

            match &outcome {
                MuxOutcome::Muxed { output, .. } => {
                    info!(episode = %episode, output = %output.display(), "episode muxed");
                }
                MuxOutcome::Validated { .. } => {
                    info!(episode = %episode, "subtitle present");
                }
                MuxOutcome::Failed { reason, .. } => {
                    warn!(episode = %episode, %reason, "episode failed");
                }
            }
            report.record(outcome);
        }

        report
    }

    fn validate_episode(&self, episode: &EpisodeId) -> MuxOutcome {
        match self.resolver.resolve_subtitle(episode) {
            Some(_) => MuxOutcome::Validated {
                episode: episode.clone(),
            },
            None => MuxOutcome::Failed {
                episode: episode.clone(),
                reason: MuxFailure::AssetMissing(AssetClass::Subtitle),
            },
        }
    }

    async fn mux_episode(&self, episode: &EpisodeId, options: &RunOptions) -> MuxOutcome {
        let bundle = self.resolver.resolve(episode);
        let (video, audio, subtitle) = match bundle.into_complete() {
            Ok(tracks) => tracks,
            Err(class) => {
                return MuxOutcome::Failed {
                    episode: episode.clone(),
                    reason: MuxFailure::AssetMissing(class),
                };
            }
        };

        let job = AssemblyJob {
            episode: episode.clone(),
            video,
            audio,
            subtitle,
            out_dir: options.out_dir.clone(),
            flag: options.flag.clone(),
            version: options.version,
            title: self.episode_title(episode),
            fonts: self.collect_fonts(),
            warning_overlay: self.warning_overlay(),
        };

        match self.assembly.assemble(&job).await {
            Ok(output) => MuxOutcome::Muxed {
                episode: episode.clone(),
                output,
            },
            Err(e) => {
                error!(episode = %episode, error = %e, "assembly failed");
                MuxOutcome::Failed {
                    episode: episode.clone(),
                    reason: MuxFailure::Assembly(e.to_string()),
                }
            }
        }
    }

    fn episode_title(&self, episode: &EpisodeId) -> Option<String> {
        if let EpisodeId::Numbered(n) = episode
            && *n >= 1
            && let Some(title) = self.config.show.titles.get(*n as usize - 1)
        {
            return Some(title.clone());
        }
        None
    }

    fn collect_fonts(&self) -> Vec<PathBuf> {
        let mut fonts = Vec::new();
        for dir in self.config.paths.font_dirs() {
            match self.discovery.list(&dir, FONT_EXTENSIONS) {
                Ok(found) => fonts.extend(found),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to scan font directory");
                }
            }
        }
        fonts
    }

    fn warning_overlay(&self) -> Option<PathBuf> {
        self.config
            .paths
            .warning_overlay
            .as_ref()
            .filter(|p| self.discovery.exists(p))
            .cloned()
    }
}
