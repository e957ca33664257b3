use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::NcKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub show: ShowConfig,

    pub paths: PathsConfig,

    pub output: OutputConfig,

    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    pub name: String,

    /// Per-episode display titles, indexed by episode number (1-based).
    /// Used in the container title; episodes past the end get no title.
    pub titles: Vec<String>,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Show".to_string(),
            titles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub video_dir: PathBuf,

    pub audio_dir: PathBuf,

    pub subtitle_dir: PathBuf,

    /// Clean OP/ED assets: `NCOP.ass` / `NCED.ass` plus a `fonts` folder.
    pub songs_dir: PathBuf,

    /// Optional subtitle fragment muxed into every episode as an extra
    /// track (typically a fansub warning).
    pub warning_overlay: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("premux"),
            audio_dir: PathBuf::from("audio"),
            subtitle_dir: PathBuf::from("subtitle"),
            songs_dir: PathBuf::from("songs"),
            warning_overlay: Some(PathBuf::from("common/warning.ass")),
        }
    }
}

impl PathsConfig {
    /// Directories scanned for font attachments. Non-existent entries are
    /// skipped at collection time.
    #[must_use]
    pub fn font_dirs(&self) -> Vec<PathBuf> {
        vec![self.subtitle_dir.join("fonts"), self.songs_dir.join("fonts")]
    }

    /// The fixed subtitle source for a clean opening or ending.
    #[must_use]
    pub fn nc_subtitle(&self, kind: NcKind) -> PathBuf {
        self.songs_dir.join(format!("{}.ass", kind.marker()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output filename template. `{flag}`, `{show}`, `{episode}` and
    /// `{version}` are substituted per episode; the `.mkv` extension is
    /// appended. `{version}` renders empty for version 1.
    pub naming_format: String,

    /// Release flag used when the CLI does not override it.
    pub default_flag: String,

    pub audio_language: String,

    pub audio_track_name: String,

    pub subtitle_language: String,

    /// mkvmerge executable; override for non-PATH installs.
    pub mkvmerge_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            naming_format: "[{flag}] {show} - {episode}{version} (BDRip 1920x1080 HEVC FLAC)"
                .to_string(),
            default_flag: "BestRelease".to_string(),
            audio_language: "ja".to_string(),
            audio_track_name: "Japanese".to_string(),
            subtitle_language: "en".to_string(),
            mkvmerge_path: "mkvmerge".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show: ShowConfig::default(),
            paths: PathsConfig::default(),
            output: OutputConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("muxarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".muxarr").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.show.name.trim().is_empty() {
            anyhow::bail!("Show name cannot be empty");
        }

        if !self.output.naming_format.contains("{episode}") {
            anyhow::bail!("Output naming format must contain {{episode}}");
        }

        Ok(())
    }
}
