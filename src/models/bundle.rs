use std::fmt;
use std::path::PathBuf;

/// The three asset classes that make up one episode's mux inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Video,
    Audio,
    Subtitle,
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
            Self::Subtitle => f.write_str("subtitle"),
        }
    }
}

/// A single selected file plus the timing offset derived from the episode
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub path: PathBuf,
    pub sync_offset_ms: i64,
}

/// All audio files selected for one episode, in enumeration order.
/// Multiple simultaneous tracks (e.g. 2.0 and 5.1) are legitimate, so this
/// is a set rather than a single path. Never empty once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudio {
    pub paths: Vec<PathBuf>,
    pub sync_offset_ms: i64,
}

/// Resolved asset references for one episode. A partial bundle is a valid
/// value: an absent class means resolution failed for that class, and the
/// caller decides what absence means.
#[derive(Debug, Default, Clone)]
pub struct AssetBundle {
    pub video: Option<ResolvedTrack>,
    pub audio: Option<ResolvedAudio>,
    pub subtitle: Option<ResolvedTrack>,
}

impl AssetBundle {
    #[must_use]
    pub fn missing(&self) -> Vec<AssetClass> {
        let mut classes = Vec::new();
        if self.video.is_none() {
            classes.push(AssetClass::Video);
        }
        if self.audio.is_none() {
            classes.push(AssetClass::Audio);
        }
        if self.subtitle.is_none() {
            classes.push(AssetClass::Subtitle);
        }
        classes
    }

    /// Splits into the full track set, or reports the first missing class.
    pub fn into_complete(self) -> Result<(ResolvedTrack, ResolvedAudio, ResolvedTrack), AssetClass> {
        match (self.video, self.audio, self.subtitle) {
            (Some(video), Some(audio), Some(subtitle)) => Ok((video, audio, subtitle)),
            (None, _, _) => Err(AssetClass::Video),
            (_, None, _) => Err(AssetClass::Audio),
            (_, _, None) => Err(AssetClass::Subtitle),
        }
    }
}
