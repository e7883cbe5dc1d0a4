//! The reconciliation core.
//!
//! Pure function from `(ledger, candidates, dockerized)` to the list of
//! changes that brings the ledger up to date. Candidates are filtered to
//! the supported release window, partitioned by `(major, minor)` branch,
//! and each branch is reconciled independently. The smallest tracked
//! version is pinned: it is never version-bumped, only its docker flag may
//! flip once an image appears for it.

use std::collections::{BTreeMap, HashSet};

use crate::ledger::LedgerVersion;
use crate::sources::maven::MavenArtifact;
use crate::version::change::VersionChange;
use crate::version::semver::SemanticVersion;

/// A release branch: all versions sharing the same `major.minor` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Branch {
    major: u64,
    minor: u64,
}

impl Branch {
    fn of(version: &SemanticVersion) -> Branch {
        Branch {
            major: version.major,
            minor: version.minor,
        }
    }
}

/// Computes the additions and updates the ledger needs, sorted ascending
/// by the version each change ends up tracking.
///
/// Total over well-typed input: an empty candidate list (or an empty
/// ledger) yields an empty change list.
pub fn compute_version_changes(
    ledger: &[LedgerVersion],
    candidates: &[MavenArtifact],
    dockerized: &HashSet<SemanticVersion>,
) -> Vec<VersionChange> {
    let mut tracked: Vec<&SemanticVersion> = ledger.iter().map(|entry| &entry.version).collect();
    tracked.sort();
    let Some(minimum_tracked) = tracked.first().copied() else {
        return Vec::new();
    };
    let major_bound = tracked.last().map_or(0, |highest| highest.major);

    let mut in_window: Vec<SemanticVersion> = candidates
        .iter()
        .filter_map(|artifact| artifact.version.clone())
        .filter(SemanticVersion::is_stable)
        .filter(|candidate| !(candidate < minimum_tracked || candidate.major > major_bound))
        .collect();
    in_window.sort();

    let mut branches: BTreeMap<Branch, Vec<SemanticVersion>> = BTreeMap::new();
    for candidate in in_window {
        branches.entry(Branch::of(&candidate)).or_default().push(candidate);
    }

    let mut changes: Vec<VersionChange> = branches
        .iter()
        .flat_map(|(branch, candidates_in_branch)| {
            let tracked_in_branch: Vec<&LedgerVersion> = ledger
                .iter()
                .filter(|entry| Branch::of(&entry.version) == *branch)
                .collect();
            if tracked_in_branch.is_empty() {
                additions_in_new_branch(candidates_in_branch, dockerized)
            } else {
                changes_in_tracked_branch(
                    &tracked_in_branch,
                    candidates_in_branch,
                    dockerized,
                    minimum_tracked,
                )
            }
        })
        .collect();

    changes.sort_by(|left, right| left.new_version().cmp(right.new_version()));
    changes
}

fn changes_in_tracked_branch(
    tracked_in_branch: &[&LedgerVersion],
    candidates_in_branch: &[SemanticVersion],
    dockerized: &HashSet<SemanticVersion>,
    minimum_tracked: &SemanticVersion,
) -> Vec<VersionChange> {
    let Some(branch_minimum) = tracked_in_branch
        .iter()
        .min_by(|left, right| left.version.cmp(&right.version))
        .copied()
    else {
        return Vec::new();
    };
    if branch_minimum.version == *minimum_tracked {
        changes_in_oldest_branch(
            tracked_in_branch,
            candidates_in_branch,
            dockerized,
            branch_minimum,
        )
    } else {
        let baseline = tracked_in_branch
            .iter()
            .max_by(|left, right| left.version.cmp(&right.version))
            .copied();
        changes_against_baseline(candidates_in_branch, dockerized, baseline)
    }
}

/// The branch holding the global minimum: the floor entry is excluded from
/// both sides of the comparison so it can never be bumped, and it gets a
/// flag-only update once its exact version shows up with an image.
fn changes_in_oldest_branch(
    tracked_in_branch: &[&LedgerVersion],
    candidates_in_branch: &[SemanticVersion],
    dockerized: &HashSet<SemanticVersion>,
    floor: &LedgerVersion,
) -> Vec<VersionChange> {
    let baseline = tracked_in_branch
        .iter()
        .filter(|entry| entry.version != floor.version)
        .max_by(|left, right| left.version.cmp(&right.version))
        .copied();
    let remaining: Vec<SemanticVersion> = candidates_in_branch
        .iter()
        .filter(|candidate| **candidate != floor.version)
        .cloned()
        .collect();
    let changes = changes_against_baseline(&remaining, dockerized, baseline);

    if !floor.in_docker_registry && dockerized.contains(&floor.version) {
        let mut flagged = vec![VersionChange::Update {
            old: floor.version.clone(),
            new: floor.version.clone(),
            dockerized: true,
        }];
        flagged.extend(changes);
        flagged
    } else {
        changes
    }
}

fn changes_against_baseline(
    candidates_in_branch: &[SemanticVersion],
    dockerized: &HashSet<SemanticVersion>,
    baseline: Option<&LedgerVersion>,
) -> Vec<VersionChange> {
    let Some(newest) = candidates_in_branch.last() else {
        return Vec::new();
    };
    let newest_is_dockerized = dockerized.contains(newest);
    let Some(baseline) = baseline else {
        return vec![VersionChange::Addition {
            new: newest.clone(),
            dockerized: newest_is_dockerized,
        }];
    };

    if *newest == baseline.version {
        if newest_is_dockerized && !baseline.in_docker_registry {
            vec![VersionChange::Update {
                old: newest.clone(),
                new: newest.clone(),
                dockerized: true,
            }]
        } else {
            Vec::new()
        }
    } else if *newest > baseline.version {
        advance(
            candidates_in_branch,
            dockerized,
            baseline,
            newest,
            newest_is_dockerized,
        )
    } else {
        // candidates below the tracked window were filtered out already
        Vec::new()
    }
}

/// The newest candidate is strictly ahead of the baseline. A baseline that
/// already has an image never advances to an image-less version: the
/// newest candidate is surfaced as an addition instead, and the baseline
/// catches up to the highest dockerized candidate in between, if any.
fn advance(
    candidates_in_branch: &[SemanticVersion],
    dockerized: &HashSet<SemanticVersion>,
    baseline: &LedgerVersion,
    newest: &SemanticVersion,
    newest_is_dockerized: bool,
) -> Vec<VersionChange> {
    if !baseline.in_docker_registry || newest_is_dockerized {
        return vec![VersionChange::Update {
            old: baseline.version.clone(),
            new: newest.clone(),
            dockerized: newest_is_dockerized,
        }];
    }

    let addition = VersionChange::Addition {
        new: newest.clone(),
        dockerized: false,
    };
    let catch_up = candidates_in_branch
        .iter()
        .rev()
        .find(|candidate| {
            baseline.version < **candidate
                && **candidate < *newest
                && dockerized.contains(*candidate)
        });
    match catch_up {
        None => vec![addition],
        Some(intermediate) => vec![
            addition,
            VersionChange::Update {
                old: baseline.version.clone(),
                new: intermediate.clone(),
                dockerized: true,
            },
        ],
    }
}

/// A branch the ledger has never tracked. The newest candidate is always
/// surfaced; when it lacks an image, the newest dockerized candidate below
/// it is surfaced as well, so at most two additions per new branch.
fn additions_in_new_branch(
    candidates_in_branch: &[SemanticVersion],
    dockerized: &HashSet<SemanticVersion>,
) -> Vec<VersionChange> {
    let Some(newest) = candidates_in_branch.last() else {
        return Vec::new();
    };
    if dockerized.contains(newest) {
        return vec![VersionChange::Addition {
            new: newest.clone(),
            dockerized: true,
        }];
    }

    let newest_dockerized = candidates_in_branch
        .iter()
        .rev()
        .find(|candidate| *candidate < newest && dockerized.contains(*candidate));
    match newest_dockerized {
        None => vec![VersionChange::Addition {
            new: newest.clone(),
            dockerized: false,
        }],
        Some(previous) => vec![
            VersionChange::Addition {
                new: newest.clone(),
                dockerized: false,
            },
            VersionChange::Addition {
                new: previous.clone(),
                dockerized: true,
            },
        ],
    }
}
