//! Tool availability checking
//!
//! Evaluates a [`Prerequisite`] against the live environment through an
//! ordered list of resolution strategies: bundled marker, global binary on
//! the search path, then project-local package execution via npx. Each
//! strategy yields a tagged outcome so the chain is testable strategy by
//! strategy.

use super::{PrereqStatus, Prerequisite, PrerequisiteResult};
use crate::exec::{SessionContext, SHORT_TIMEOUT};
use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use tracing::debug;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("version regex"));

/// Result of applying one resolution strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Tool found and meets the minimum version.
    Satisfied { version: Option<String>, local: bool },
    /// Tool found but below the minimum version.
    Outdated { version: String },
    /// Tool not found, or found but broken.
    Unavailable,
}

/// Pull the first x.y.z token out of a version-command's output.
pub fn parse_version(output: &str) -> Option<Version> {
    let m = VERSION_RE.find(output)?;
    Version::parse(m.as_str()).ok()
}

fn meets_minimum(found: &Version, prereq: &Prerequisite) -> bool {
    match &prereq.min_version {
        Some(min) => found >= min,
        None => true,
    }
}

async fn global_binary(session: &SessionContext, prereq: &Prerequisite) -> StrategyOutcome {
    let Some(path) = session.resolve(prereq.command) else {
        return StrategyOutcome::Unavailable;
    };
    let out = session
        .run(&path.to_string_lossy(), prereq.version_args, None, SHORT_TIMEOUT)
        .await;
    if !out.success {
        // Found on the path but refuses to run: broken install or missing
        // runtime deps. Callers may still recover through a local install.
        debug!("{} found at {:?} but version check failed", prereq.id, path);
        return StrategyOutcome::Unavailable;
    }
    classify_version(prereq, &out.combined(), false)
}

async fn local_package(session: &SessionContext, prereq: &Prerequisite) -> StrategyOutcome {
    let Some(package) = prereq.package else {
        return StrategyOutcome::Unavailable;
    };
    let mut args = vec!["--yes", package];
    args.extend_from_slice(prereq.version_args);
    let out = session.run("npx", &args, None, SHORT_TIMEOUT).await;
    if !out.success {
        return StrategyOutcome::Unavailable;
    }
    classify_version(prereq, &out.combined(), true)
}

fn classify_version(prereq: &Prerequisite, output: &str, local: bool) -> StrategyOutcome {
    match parse_version(output) {
        Some(v) if meets_minimum(&v, prereq) => {
            StrategyOutcome::Satisfied { version: Some(v.to_string()), local }
        }
        Some(v) => StrategyOutcome::Outdated { version: v.to_string() },
        None if prereq.min_version.is_none() => {
            // Found and runnable; with no minimum set that is enough.
            StrategyOutcome::Satisfied { version: None, local }
        }
        None => StrategyOutcome::Unavailable,
    }
}

/// Evaluate one prerequisite. A tool below its minimum version only
/// reports `Outdated` after the local-package recovery path has been
/// exhausted.
pub async fn check(session: &SessionContext, prereq: &Prerequisite) -> PrerequisiteResult {
    if prereq.bundled {
        return PrerequisiteResult {
            status: PrereqStatus::Ok,
            version: Some("bundled".to_string()),
        };
    }

    let global = global_binary(session, prereq).await;
    match global {
        StrategyOutcome::Satisfied { version, .. } => {
            PrerequisiteResult { status: PrereqStatus::Ok, version }
        }
        StrategyOutcome::Outdated { version } => {
            if prereq.local_install {
                match local_package(session, prereq).await {
                    StrategyOutcome::Satisfied { version, .. } => PrerequisiteResult {
                        status: PrereqStatus::InstalledLocally,
                        version,
                    },
                    _ => PrerequisiteResult {
                        status: PrereqStatus::Outdated,
                        version: Some(version),
                    },
                }
            } else {
                PrerequisiteResult { status: PrereqStatus::Outdated, version: Some(version) }
            }
        }
        StrategyOutcome::Unavailable => {
            if prereq.local_install {
                match local_package(session, prereq).await {
                    StrategyOutcome::Satisfied { version, .. } => PrerequisiteResult {
                        status: PrereqStatus::InstalledLocally,
                        version,
                    },
                    _ => PrerequisiteResult { status: PrereqStatus::Missing, version: None },
                }
            } else {
                PrerequisiteResult { status: PrereqStatus::Missing, version: None }
            }
        }
    }
}

/// Evaluate a set of prerequisites sequentially.
pub async fn check_all(
    session: &SessionContext,
    prereqs: &[&'static Prerequisite],
) -> Vec<(&'static Prerequisite, PrerequisiteResult)> {
    let mut results = Vec::with_capacity(prereqs.len());
    for prereq in prereqs {
        let result = check(session, prereq).await;
        debug!("prerequisite {}: {:?} {:?}", prereq.id, result.status, result.version);
        results.push((*prereq, result));
    }
    results
}
