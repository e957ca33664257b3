//! Episode selection parsing.
//!
//! Turns a selection string like `1-5,7,OVA1,NCOP` into a canonical,
//! duplicate-free, ordered list of episode identifiers. Explicit lists
//! keep the order the user wrote; `all` discovers episodes from the
//! subtitle root and yields ascending canonical order.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;

use crate::constants::SUBTITLE_EXTENSIONS;
use crate::discovery::FileDiscovery;
use crate::models::{EpisodeId, EpisodeSelection};

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("invalid episode token '{0}'")]
    InvalidToken(String),

    #[error("invalid range '{start}-{end}': start exceeds end")]
    ReversedRange { start: u32, end: u32 },

    #[error("failed to enumerate subtitle files: {0}")]
    Discovery(#[from] std::io::Error),
}

/// Parses a selection string into an [`EpisodeSelection`].
///
/// An empty or separator-only string yields an empty selection, not an
/// error; the caller reports "nothing to do" separately from a parse
/// failure.
pub fn parse_selection(
    input: &str,
    subtitle_root: &Path,
    discovery: &dyn FileDiscovery,
) -> Result<EpisodeSelection, SelectionError> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("all") {
        return discover_all(subtitle_root, discovery);
    }

    let mut selection = EpisodeSelection::default();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        expand_token(token, &mut selection)?;
    }
    Ok(selection)
}

fn expand_token(token: &str, selection: &mut EpisodeSelection) -> Result<(), SelectionError> {
    if token.chars().all(|c| c.is_ascii_digit()) {
        let number = token
            .parse()
            .map_err(|_| SelectionError::InvalidToken(token.to_string()))?;
        selection.push(EpisodeId::Numbered(number));
        return Ok(());
    }

    // A digit-leading token is a number or range attempt; a typo there is
    // a user error rather than an opaque special tag.
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        let (start, end) = token
            .split_once('-')
            .ok_or_else(|| SelectionError::InvalidToken(token.to_string()))?;
        let start: u32 = start
            .trim()
            .parse()
            .map_err(|_| SelectionError::InvalidToken(token.to_string()))?;
        let end: u32 = end
            .trim()
            .parse()
            .map_err(|_| SelectionError::InvalidToken(token.to_string()))?;
        if start > end {
            return Err(SelectionError::ReversedRange { start, end });
        }
        for number in start..=end {
            selection.push(EpisodeId::Numbered(number));
        }
        return Ok(());
    }

    selection.push(EpisodeId::special(token));
    Ok(())
}

/// `all` discovery: every subtitle file in the root contributes one
/// identifier. Stems with a leading digit run are numbered episodes
/// (`01.ass`, `01v2.ass`); any other stem is parsed as a special
/// identifier, malformed stems silently becoming opaque tags.
fn discover_all(
    subtitle_root: &Path,
    discovery: &dyn FileDiscovery,
) -> Result<EpisodeSelection, SelectionError> {
    let mut found = BTreeSet::new();
    for path in discovery.list(subtitle_root, SUBTITLE_EXTENSIONS)? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        found.insert(episode_from_stem(stem));
    }
    Ok(found.into_iter().collect())
}

fn episode_from_stem(stem: &str) -> EpisodeId {
    let digits: &str = {
        let end = stem
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(stem.len(), |(i, _)| i);
        &stem[..end]
    };

    if !digits.is_empty()
        && let Ok(number) = digits.parse()
    {
        return EpisodeId::Numbered(number);
    }
    EpisodeId::special(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NcKind;
    use std::io;
    use std::path::PathBuf;

    struct StaticDiscovery(Vec<PathBuf>);

    impl FileDiscovery for StaticDiscovery {
        fn list(&self, _root: &Path, _extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
            Ok(self.0.clone())
        }

        fn exists(&self, path: &Path) -> bool {
            self.0.iter().any(|p| p == path)
        }
    }

    fn parse(input: &str) -> Result<EpisodeSelection, SelectionError> {
        parse_selection(input, Path::new("subtitle"), &StaticDiscovery(Vec::new()))
    }

    fn ids(selection: &EpisodeSelection) -> Vec<EpisodeId> {
        selection.iter().cloned().collect()
    }

    #[test]
    fn test_explicit_list_preserves_order_and_dedups() {
        let selection = parse("3,1,1,2-3").unwrap();
        assert_eq!(
            ids(&selection),
            vec![
                EpisodeId::Numbered(3),
                EpisodeId::Numbered(1),
                EpisodeId::Numbered(2),
            ]
        );
    }

    #[test]
    fn test_range_expansion() {
        let selection = parse("1-3,7").unwrap();
        assert_eq!(
            ids(&selection),
            vec![
                EpisodeId::Numbered(1),
                EpisodeId::Numbered(2),
                EpisodeId::Numbered(3),
                EpisodeId::Numbered(7),
            ]
        );
    }

    #[test]
    fn test_range_tolerates_inner_whitespace() {
        let selection = parse("1 - 3").unwrap();
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_reversed_range_fails() {
        assert!(matches!(
            parse("2-1"),
            Err(SelectionError::ReversedRange { start: 2, end: 1 })
        ));
    }

    #[test]
    fn test_malformed_digit_leading_tokens_fail() {
        assert!(matches!(parse("5-"), Err(SelectionError::InvalidToken(_))));
        assert!(matches!(parse("1-x"), Err(SelectionError::InvalidToken(_))));
        assert!(matches!(parse("07b"), Err(SelectionError::InvalidToken(_))));
    }

    #[test]
    fn test_empty_input_is_empty_selection() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  ,, ,").unwrap().is_empty());
    }

    #[test]
    fn test_special_tokens() {
        let selection = parse("OVA1,NCOP,SP3").unwrap();
        assert_eq!(
            ids(&selection),
            vec![
                EpisodeId::Ova(1),
                EpisodeId::NoCredits(NcKind::Opening, 1),
                EpisodeId::Tag("SP3".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_discovers_sorted_union() {
        let discovery = StaticDiscovery(vec![
            PathBuf::from("subtitle/02.ass"),
            PathBuf::from("subtitle/01.ass"),
            PathBuf::from("subtitle/01v2.ass"),
            PathBuf::from("subtitle/OVA01.ass"),
            PathBuf::from("subtitle/NCOP.ass"),
        ]);
        let selection = parse_selection("all", Path::new("subtitle"), &discovery).unwrap();
        assert_eq!(
            ids(&selection),
            vec![
                EpisodeId::Numbered(1),
                EpisodeId::Numbered(2),
                EpisodeId::NoCredits(NcKind::Opening, 1),
                EpisodeId::Ova(1),
            ]
        );
    }

    #[test]
    fn test_all_is_case_insensitive_and_whole_input_only() {
        let discovery = StaticDiscovery(vec![PathBuf::from("subtitle/01.ass")]);
        let selection = parse_selection("ALL", Path::new("subtitle"), &discovery).unwrap();
        assert_eq!(selection.len(), 1);

        // "all" inside a list is just another opaque tag.
        let selection = parse("1,all").unwrap();
        assert_eq!(
            ids(&selection),
            vec![EpisodeId::Numbered(1), EpisodeId::Tag("all".to_string())]
        );
    }

    #[test]
    fn test_discovery_dedups_shared_stems() {
        let discovery = StaticDiscovery(vec![
            PathBuf::from("subtitle/05.ass"),
            PathBuf::from("subtitle/05v2.ass"),
        ]);
        let selection = parse_selection("all", Path::new("subtitle"), &discovery).unwrap();
        assert_eq!(ids(&selection), vec![EpisodeId::Numbered(5)]);
    }
}
