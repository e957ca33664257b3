use std::cmp::Ordering;
use std::fmt;

use crate::constants::NC_SYNC_OFFSET_MS;

/// Which end of an episode a no-credits sequence belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NcKind {
    Opening,
    Ending,
}

impl NcKind {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Opening => "NCOP",
            Self::Ending => "NCED",
        }
    }
}

/// Canonical identifier for one release unit: a numbered episode or a
/// special extra (OVA, clean opening/ending, or an opaque tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EpisodeId {
    Numbered(u32),
    Ova(u32),
    NoCredits(NcKind, u32),
    Tag(String),
}

impl EpisodeId {
    /// Parses a non-numeric selection token. OVA and NC shapes are
    /// recognized (with the index defaulting to 1 when omitted); anything
    /// else is kept verbatim as an opaque tag so that new special release
    /// kinds pass through without a code change.
    #[must_use]
    pub fn special(token: &str) -> Self {
        let upper = token.to_ascii_uppercase();
        if let Some(rest) = upper.strip_prefix("OVA")
            && let Some(index) = parse_index(rest)
        {
            return Self::Ova(index);
        }
        if let Some(rest) = upper.strip_prefix("NCOP")
            && let Some(index) = parse_index(rest)
        {
            return Self::NoCredits(NcKind::Opening, index);
        }
        if let Some(rest) = upper.strip_prefix("NCED")
            && let Some(index) = parse_index(rest)
        {
            return Self::NoCredits(NcKind::Ending, index);
        }
        Self::Tag(token.to_string())
    }

    #[must_use]
    pub const fn is_no_credits(&self) -> bool {
        matches!(self, Self::NoCredits(..))
    }

    /// Timing offset applied to this episode's audio and subtitle tracks,
    /// in milliseconds. Clean OP/ED sources start 1000ms ahead of the
    /// episode timeline they were cut from.
    #[must_use]
    pub const fn sync_offset_ms(&self) -> i64 {
        if self.is_no_credits() { NC_SYNC_OFFSET_MS } else { 0 }
    }

    const fn sort_rank(&self) -> u8 {
        match self {
            Self::Numbered(_) => 0,
            _ => 1,
        }
    }

    // Keeps the order total when two different variants share a canonical
    // form (e.g. a hand-built Tag("NCOP") next to a real NCOP).
    const fn variant_index(&self) -> u8 {
        match self {
            Self::Numbered(_) => 0,
            Self::Ova(_) => 1,
            Self::NoCredits(..) => 2,
            Self::Tag(_) => 3,
        }
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered(n) => write!(f, "{n:02}"),
            Self::Ova(n) => write!(f, "OVA{n:02}"),
            Self::NoCredits(kind, 1) => f.write_str(kind.marker()),
            Self::NoCredits(kind, n) => write!(f, "{}{n}", kind.marker()),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

impl Ord for EpisodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numbered(a), Self::Numbered(b)) => a.cmp(b),
            // Numbered episodes first; specials sort lexically by their
            // canonical form.
            _ => self
                .sort_rank()
                .cmp(&other.sort_rank())
                .then_with(|| self.to_string().cmp(&other.to_string()))
                .then_with(|| self.variant_index().cmp(&other.variant_index())),
        }
    }
}

impl PartialOrd for EpisodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn parse_index(rest: &str) -> Option<u32> {
    if rest.is_empty() {
        return Some(1);
    }
    if rest.chars().all(|c| c.is_ascii_digit()) {
        return rest.parse().ok();
    }
    None
}

/// Ordered, duplicate-free sequence of episode identifiers.
///
/// Explicit selections keep the order the user wrote; discovered
/// selections are built from an already-sorted source. An empty selection
/// is valid and means "nothing to do".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EpisodeSelection {
    ids: Vec<EpisodeId>,
}

impl EpisodeSelection {
    /// Appends an identifier unless it is already present.
    pub fn push(&mut self, id: EpisodeId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpisodeId> {
        self.ids.iter()
    }
}

impl FromIterator<EpisodeId> for EpisodeSelection {
    fn from_iter<I: IntoIterator<Item = EpisodeId>>(iter: I) -> Self {
        let mut selection = Self::default();
        for id in iter {
            selection.push(id);
        }
        selection
    }
}
