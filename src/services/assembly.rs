//! Media assembly backend.
//!
//! The runner hands a fully resolved episode to a [`MediaAssembly`]
//! implementation and treats any failure as a single opaque error kind.
//! The production backend shells out to mkvmerge; tests substitute a
//! recording stub.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{Config, OutputConfig};
use crate::models::{EpisodeId, ResolvedAudio, ResolvedTrack};

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("mkvmerge exited with code {code}: {stderr}")]
    Backend { code: i32, stderr: String },
}

/// One episode's fully resolved inputs plus naming parameters.
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    pub episode: EpisodeId,
    pub video: ResolvedTrack,
    pub audio: ResolvedAudio,
    pub subtitle: ResolvedTrack,
    pub out_dir: PathBuf,
    pub flag: String,
    pub version: u32,
    /// Episode display title, when the show config has one.
    pub title: Option<String>,
    /// Font files to attach.
    pub fonts: Vec<PathBuf>,
    /// Extra subtitle fragment muxed as its own track.
    pub warning_overlay: Option<PathBuf>,
}

#[async_trait]
pub trait MediaAssembly: Send + Sync {
    /// Assembles the output container for one episode and returns its
    /// path.
    async fn assemble(&self, job: &AssemblyJob) -> Result<PathBuf, AssemblyError>;
}

/// Production assembler wrapping the mkvtoolnix CLI.
pub struct MkvmergeAssembler {
    show_name: String,
    output: OutputConfig,
}

impl MkvmergeAssembler {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            show_name: config.show.name.clone(),
            output: config.output.clone(),
        }
    }

    fn version_suffix(version: u32) -> String {
        if version <= 1 {
            String::new()
        } else {
            format!("v{version}")
        }
    }

    fn output_name(&self, job: &AssemblyJob) -> String {
        let name = self
            .output
            .naming_format
            .replace("{flag}", &job.flag)
            .replace("{show}", &self.show_name)
            .replace("{episode}", &job.episode.to_string())
            .replace("{version}", &Self::version_suffix(job.version));
        format!("{name}.mkv")
    }

    fn container_title(&self, job: &AssemblyJob) -> String {
        let mut title = format!(
            "{} - {}{}",
            self.show_name,
            job.episode,
            Self::version_suffix(job.version)
        );
        if let Some(episode_title) = &job.title {
            title.push_str(" | ");
            title.push_str(episode_title);
        }
        title
    }
}

#[async_trait]
impl MediaAssembly for MkvmergeAssembler {
    async fn assemble(&self, job: &AssemblyJob) -> Result<PathBuf, AssemblyError> {
        let out_path = job.out_dir.join(self.output_name(job));

        let mut cmd = Command::new(&self.output.mkvmerge_path);
        cmd.arg("-o").arg(&out_path);
        cmd.arg("--title").arg(self.container_title(job));

        // Premux video keeps its chapters; release tags, attachments and
        // the original audio/subtitle tracks are replaced.
        cmd.arg("--no-global-tags").arg("--no-attachments");
        cmd.arg("--no-audio").arg("--no-subtitles");
        cmd.arg(&job.video.path);

        for (index, audio) in job.audio.paths.iter().enumerate() {
            cmd.arg("--language")
                .arg(format!("0:{}", self.output.audio_language));
            cmd.arg("--track-name")
                .arg(format!("0:{}", self.output.audio_track_name));
            cmd.arg("--default-track-flag")
                .arg(if index == 0 { "0:yes" } else { "0:no" });
            if job.audio.sync_offset_ms != 0 {
                cmd.arg("--sync")
                    .arg(format!("0:{}", job.audio.sync_offset_ms));
            }
            cmd.arg(audio);
        }

        cmd.arg("--language")
            .arg(format!("0:{}", self.output.subtitle_language));
        cmd.arg("--track-name").arg(format!("0:{}", job.flag));
        cmd.arg("--default-track-flag").arg("0:yes");
        if job.subtitle.sync_offset_ms != 0 {
            cmd.arg("--sync")
                .arg(format!("0:{}", job.subtitle.sync_offset_ms));
        }
        cmd.arg(&job.subtitle.path);

        if let Some(overlay) = &job.warning_overlay {
            cmd.arg("--language")
                .arg(format!("0:{}", self.output.subtitle_language));
            cmd.arg("--track-name").arg("0:Warning");
            cmd.arg("--default-track-flag").arg("0:no");
            cmd.arg(overlay);
        }

        for font in &job.fonts {
            let mime = mime_guess::from_path(font).first_or_octet_stream();
            cmd.arg("--attachment-mime-type").arg(mime.essence_str());
            cmd.arg("--attach-file").arg(font);
        }

        debug!(command = ?cmd, "running mkvmerge");

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AssemblyError::Spawn {
                command: self.output.mkvmerge_path.clone(),
                source: e,
            })?;

        // mkvmerge returns 0 for success, 1 for warnings, 2 for errors.
        if output.status.code().unwrap_or(2) >= 2 {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(AssemblyError::Backend {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        info!(output = %out_path.display(), "mkvmerge finished");
        Ok(out_path)
    }
}
