//! Deterministic per-episode asset resolution.
//!
//! For one episode identifier, finds the single best video and subtitle
//! file and the full audio track set under the configured roots.
//! Resolution is a pure function of the directory contents reported by
//! the discovery seam: candidates arrive in a stable order and selection
//! is first-match-wins, so unchanged directories always resolve to the
//! same files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::PathsConfig;
use crate::constants::{AUDIO_EXTENSIONS, SUBTITLE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::discovery::FileDiscovery;
use crate::models::{AssetBundle, EpisodeId, ResolvedAudio, ResolvedTrack};

pub struct AssetResolver {
    paths: PathsConfig,
    discovery: Arc<dyn FileDiscovery>,
}

impl AssetResolver {
    #[must_use]
    pub fn new(paths: PathsConfig, discovery: Arc<dyn FileDiscovery>) -> Self {
        Self { paths, discovery }
    }

    /// Resolves every asset class for one episode. Missing classes are
    /// left absent from the bundle; the caller decides what absence means.
    #[must_use]
    pub fn resolve(&self, episode: &EpisodeId) -> AssetBundle {
        let matcher = EpisodeMatcher::new(episode);
        AssetBundle {
            video: self.resolve_video(episode, &matcher),
            audio: self.resolve_audio(episode, &matcher),
            subtitle: self.resolve_subtitle(episode),
        }
    }

    fn resolve_video(&self, episode: &EpisodeId, matcher: &EpisodeMatcher) -> Option<ResolvedTrack> {
        let path = self
            .list(&self.paths.video_dir, VIDEO_EXTENSIONS)
            .into_iter()
            .find(|p| matcher.matches_path(p))?;

        debug!(episode = %episode, path = %path.display(), "selected video");
        Some(ResolvedTrack {
            path,
            sync_offset_ms: 0,
        })
    }

    fn resolve_audio(&self, episode: &EpisodeId, matcher: &EpisodeMatcher) -> Option<ResolvedAudio> {
        let paths: Vec<PathBuf> = self
            .list(&self.paths.audio_dir, AUDIO_EXTENSIONS)
            .into_iter()
            .filter(|p| matcher.matches_path(p))
            .collect();

        if paths.is_empty() {
            return None;
        }

        debug!(episode = %episode, tracks = paths.len(), "selected audio");
        Some(ResolvedAudio {
            paths,
            sync_offset_ms: episode.sync_offset_ms(),
        })
    }

    /// Subtitle resolution stands alone so a dry run can validate
    /// subtitles without touching the video and audio roots.
    ///
    /// Clean OP/ED episodes use the fixed source in the songs directory;
    /// everything else tries the exact `<episode>.ass` name first and
    /// falls back to the same contains-pattern search as video.
    #[must_use]
    pub fn resolve_subtitle(&self, episode: &EpisodeId) -> Option<ResolvedTrack> {
        let sync_offset_ms = episode.sync_offset_ms();

        if let EpisodeId::NoCredits(kind, _) = episode {
            let path = self.paths.nc_subtitle(*kind);
            if !self.discovery.exists(&path) {
                return None;
            }
            return Some(ResolvedTrack {
                path,
                sync_offset_ms,
            });
        }

        let exact = self.paths.subtitle_dir.join(format!("{episode}.ass"));
        if self.discovery.exists(&exact) {
            return Some(ResolvedTrack {
                path: exact,
                sync_offset_ms,
            });
        }

        let matcher = EpisodeMatcher::new(episode);
        let path = self
            .list(&self.paths.subtitle_dir, SUBTITLE_EXTENSIONS)
            .into_iter()
            .find(|p| matcher.matches_path(p))?;

        debug!(episode = %episode, path = %path.display(), "selected subtitle via fallback search");
        Some(ResolvedTrack {
            path,
            sync_offset_ms,
        })
    }

    fn list(&self, root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        match self.discovery.list(root, extensions) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "directory enumeration failed");
                Vec::new()
            }
        }
    }
}

/// Compiled filename matcher for one episode identifier.
///
/// Numbered and OVA identifiers match their zero-padded number with no
/// adjacent digit, so episode 5 matches ` - 05`, `E05` and `(05)` but not
/// `105`. OVA additionally requires the `OVA` marker; no-credits and
/// opaque tags match their canonical form verbatim, case-insensitively.
struct EpisodeMatcher {
    number: Option<Regex>,
    marker: Option<String>,
}

impl EpisodeMatcher {
    fn new(episode: &EpisodeId) -> Self {
        match episode {
            EpisodeId::Numbered(n) => Self {
                number: Some(padded_number_pattern(*n)),
                marker: None,
            },
            EpisodeId::Ova(n) => Self {
                number: Some(padded_number_pattern(*n)),
                marker: Some("OVA".to_string()),
            },
            EpisodeId::NoCredits(..) | EpisodeId::Tag(_) => Self {
                number: None,
                marker: Some(episode.to_string().to_ascii_uppercase()),
            },
        }
    }

    fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.matches(name))
    }

    fn matches(&self, name: &str) -> bool {
        let upper = name.to_ascii_uppercase();
        self.marker.as_ref().is_none_or(|m| upper.contains(m))
            && self.number.as_ref().is_none_or(|re| re.is_match(name))
    }
}

fn padded_number_pattern(number: u32) -> Regex {
    Regex::new(&format!(r"(?:^|\D){number:02}(?:\D|$)"))
        .expect("Invalid episode pattern defined in code")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetClass, NcKind};
    use std::io;

    struct FixtureDiscovery {
        files: Vec<PathBuf>,
    }

    impl FixtureDiscovery {
        fn new(files: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                files: files.iter().map(PathBuf::from).collect(),
            })
        }
    }

    impl FileDiscovery for FixtureDiscovery {
        fn list(&self, root: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
            let mut found: Vec<PathBuf> = self
                .files
                .iter()
                .filter(|p| p.starts_with(root))
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
                })
                .cloned()
                .collect();
            found.sort();
            Ok(found)
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.iter().any(|p| p == path)
        }
    }

    fn resolver(files: &[&str]) -> AssetResolver {
        AssetResolver::new(PathsConfig::default(), FixtureDiscovery::new(files))
    }

    #[test]
    fn test_video_first_match_is_deterministic() {
        let resolver = resolver(&[
            "premux/[GrpB] Show - 05 (1080p).mkv",
            "premux/[GrpA] Show - 05 (1080p).mkv",
        ]);

        let bundle = resolver.resolve(&EpisodeId::Numbered(5));
        let video = bundle.video.unwrap();
        assert_eq!(
            video.path,
            PathBuf::from("premux/[GrpA] Show - 05 (1080p).mkv")
        );
    }

    #[test]
    fn test_padded_number_never_matches_inside_longer_number() {
        let resolver = resolver(&["premux/Show - 105 (1080p).mkv", "premux/Show - 1050.mkv"]);
        let bundle = resolver.resolve(&EpisodeId::Numbered(5));
        assert!(bundle.video.is_none());
    }

    #[test]
    fn test_video_matches_e_prefixed_and_parenthesized_numbers() {
        let e_prefixed = resolver(&["premux/Show E07.mkv"]);
        assert!(e_prefixed.resolve(&EpisodeId::Numbered(7)).video.is_some());

        let parenthesized = resolver(&["premux/Show (07).mkv"]);
        assert!(parenthesized.resolve(&EpisodeId::Numbered(7)).video.is_some());
    }

    #[test]
    fn test_audio_collects_all_matching_tracks() {
        let resolver = resolver(&[
            "audio/Show - 05 (5.1).flac",
            "audio/Show - 05 (2.0).flac",
            "audio/Show - 06 (2.0).flac",
        ]);

        let audio = resolver.resolve(&EpisodeId::Numbered(5)).audio.unwrap();
        assert_eq!(
            audio.paths,
            vec![
                PathBuf::from("audio/Show - 05 (2.0).flac"),
                PathBuf::from("audio/Show - 05 (5.1).flac"),
            ]
        );
        assert_eq!(audio.sync_offset_ms, 0);
    }

    #[test]
    fn test_subtitle_exact_name_wins_over_pattern() {
        let resolver = resolver(&["subtitle/05.ass", "subtitle/Show - 05 [final].ass"]);
        let subtitle = resolver.resolve_subtitle(&EpisodeId::Numbered(5)).unwrap();
        assert_eq!(subtitle.path, PathBuf::from("subtitle/05.ass"));
    }

    #[test]
    fn test_subtitle_falls_back_to_pattern_search() {
        let resolver = resolver(&["subtitle/Show - 05 [final].ass"]);
        let subtitle = resolver.resolve_subtitle(&EpisodeId::Numbered(5)).unwrap();
        assert_eq!(subtitle.path, PathBuf::from("subtitle/Show - 05 [final].ass"));
    }

    #[test]
    fn test_missing_subtitle_is_absent_not_error() {
        let resolver = resolver(&["premux/Show - 05.mkv", "audio/Show - 05.flac"]);
        let bundle = resolver.resolve(&EpisodeId::Numbered(5));
        assert!(bundle.subtitle.is_none());
        assert_eq!(bundle.missing(), vec![AssetClass::Subtitle]);
    }

    #[test]
    fn test_ova_requires_marker_and_index() {
        let resolver = resolver(&[
            "premux/Show - 01.mkv",
            "premux/Show - OVA01 (1080p).mkv",
            "audio/Show OVA01.flac",
        ]);

        let bundle = resolver.resolve(&EpisodeId::Ova(1));
        assert_eq!(
            bundle.video.unwrap().path,
            PathBuf::from("premux/Show - OVA01 (1080p).mkv")
        );
        // OVA episodes stay on the reference timeline.
        assert_eq!(bundle.audio.unwrap().sync_offset_ms, 0);
    }

    #[test]
    fn test_nc_resolution_uses_fixed_subtitle_and_offset() {
        let resolver = resolver(&[
            "premux/Show NCOP (1080p).mkv",
            "audio/Show NCOP.flac",
            "songs/NCOP.ass",
        ]);

        let episode = EpisodeId::NoCredits(NcKind::Opening, 1);
        let bundle = resolver.resolve(&episode);

        assert_eq!(
            bundle.subtitle.as_ref().unwrap().path,
            PathBuf::from("songs/NCOP.ass")
        );
        assert_eq!(bundle.subtitle.unwrap().sync_offset_ms, -1000);
        assert_eq!(bundle.audio.unwrap().sync_offset_ms, -1000);
    }

    #[test]
    fn test_nc_subtitle_absent_when_fixed_source_missing() {
        let resolver = resolver(&["premux/Show NCED.mkv", "audio/Show NCED.flac"]);
        let bundle = resolver.resolve(&EpisodeId::NoCredits(NcKind::Ending, 1));
        assert!(bundle.subtitle.is_none());
    }

    #[test]
    fn test_opaque_tag_matches_verbatim() {
        let resolver = resolver(&["premux/Show - SP3 (1080p).mkv"]);
        let bundle = resolver.resolve(&EpisodeId::Tag("SP3".to_string()));
        assert!(bundle.video.is_some());
    }
}
