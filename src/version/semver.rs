//! Semantic version value type shared by every source.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const VERSION_GRAMMAR: &str =
    r"(0|(?:[1-9]\d*))\.(0|(?:[1-9]\d*))\.(0|(?:[1-9]\d*))(?:-((?:[0-9A-Za-z-]+\.?)*))?";

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VERSION_GRAMMAR).expect("version pattern must compile"));

static ENTIRE_VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{VERSION_GRAMMAR})$")).expect("version pattern must compile")
});

/// A dotted `major.minor.patch` version with optional pre-release
/// identifiers. Immutable once constructed; ordered as documented on
/// [`SemanticVersion::cmp`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Vec<String>,
}

impl SemanticVersion {
    /// Parses a version string, requiring the whole input to match the
    /// grammar. Malformed input yields `None`, never a panic.
    pub fn parse(text: &str) -> Option<SemanticVersion> {
        let captures = ENTIRE_VERSION_PATTERN.captures(text)?;
        Self::from_captures(&captures)
    }

    /// Scans free text for every version-shaped substring, keeping the
    /// ones whose raw matched text passes `keep`. Matches are returned in
    /// the order they appear and are not deduplicated.
    pub fn extract_all<F>(text: &str, mut keep: F) -> Vec<SemanticVersion>
    where
        F: FnMut(&str) -> bool,
    {
        VERSION_PATTERN
            .captures_iter(text)
            .filter(|captures| keep(&captures[0]))
            .filter_map(|captures| Self::from_captures(&captures))
            .collect()
    }

    /// A version is stable when it carries no pre-release identifiers.
    pub fn is_stable(&self) -> bool {
        self.pre_release.is_empty()
    }

    fn from_captures(captures: &Captures) -> Option<SemanticVersion> {
        Some(SemanticVersion {
            major: captures[1].parse().ok()?,
            minor: captures[2].parse().ok()?,
            patch: captures[3].parse().ok()?,
            pre_release: captures
                .get(4)
                .map(|identifiers| identifiers.as_str().split('.').map(str::to_owned).collect())
                .unwrap_or_default(),
        })
    }

    fn compare_pre_releases(&self, other: &SemanticVersion) -> Ordering {
        match (self.pre_release.is_empty(), other.pre_release.is_empty()) {
            // no pre-release outranks any pre-release
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (true, true) => Ordering::Equal,
            (false, false) => {
                let length = self.pre_release.len().max(other.pre_release.len());
                for position in 0..length {
                    let left = self.pre_release.get(position).map_or("", String::as_str);
                    let right = other.pre_release.get(position).map_or("", String::as_str);
                    match left.cmp(right) {
                        Ordering::Equal => continue,
                        decided => return decided,
                    }
                }
                Ordering::Equal
            }
        }
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| self.compare_pre_releases(other))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release.join("."))?;
        }
        Ok(())
    }
}
