//! Tool installation
//!
//! Installs a missing prerequisite through npm, globally or project-local.
//! A global install that dies on a permission error is retried locally
//! before giving up; failures come back as a boolean so the caller can
//! aggregate several installs into one consolidated report.

use super::Prerequisite;
use crate::exec::{CmdOutput, SessionContext, INSTALL_TIMEOUT};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Preferred installation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
    Global,
    Local,
}

fn permission_denied(out: &CmdOutput) -> bool {
    let text = out.combined();
    text.contains("EACCES")
        || text.contains("EPERM")
        || text.contains("permission denied")
        || text.contains("Permission denied")
        || text.contains("Access is denied")
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static spinner template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn attempt(
    session: &SessionContext,
    package: &str,
    scope: InstallScope,
    project_dir: Option<&Path>,
) -> CmdOutput {
    match scope {
        InstallScope::Global => {
            session.run("npm", &["install", "-g", package], None, INSTALL_TIMEOUT).await
        }
        InstallScope::Local => {
            session
                .run("npm", &["install", "--save-dev", package], project_dir, INSTALL_TIMEOUT)
                .await
        }
    }
}

/// Install one prerequisite, preferring the given scope. Returns true on
/// success. Never raises; the caller decides how to react to a failure.
pub async fn install(
    session: &SessionContext,
    prereq: &Prerequisite,
    preferred: InstallScope,
    project_dir: Option<&Path>,
) -> bool {
    let Some(package) = prereq.package else {
        // System tools (node, git) are not ours to install.
        warn!("{} cannot be installed automatically", prereq.id);
        return false;
    };

    let supports = |scope: InstallScope| match scope {
        InstallScope::Global => prereq.global_install,
        InstallScope::Local => prereq.local_install,
    };
    let other = match preferred {
        InstallScope::Global => InstallScope::Local,
        InstallScope::Local => InstallScope::Global,
    };

    let mut order = Vec::new();
    if supports(preferred) {
        order.push(preferred);
    }
    if supports(other) {
        order.push(other);
    }
    if order.is_empty() {
        warn!("{} supports no installation scope", prereq.id);
        return false;
    }

    for (i, scope) in order.iter().enumerate() {
        let pb = spinner(format!("Installing {} ({:?})...", prereq.id, scope));
        let out = attempt(session, package, *scope, project_dir).await;
        pb.finish_and_clear();

        if out.success {
            if *scope != preferred {
                println!(
                    "  {} {} installed {} instead of {:?}",
                    "!".yellow(),
                    prereq.id,
                    "project-locally".yellow(),
                    preferred
                );
            }
            info!("installed {} ({:?})", prereq.id, scope);
            session.invalidate(prereq.command);
            return true;
        }

        let is_last = i + 1 == order.len();
        if *scope == InstallScope::Global && permission_denied(&out) && !is_last {
            println!(
                "  {} global install of {} was denied, retrying project-locally",
                "!".yellow(),
                prereq.id
            );
            continue;
        }
        // Any other failure is terminal for this tool; the caller gets a
        // consolidated report instead of an exception.
        warn!("install of {} ({:?}) failed: {}", prereq.id, scope, out.stderr.trim());
        return false;
    }
    false
}

/// Install every listed prerequisite, returning the ids that could not be
/// installed so the caller can print one consolidated failure list.
pub async fn install_all(
    session: &SessionContext,
    prereqs: &[&'static Prerequisite],
    preferred: InstallScope,
    project_dir: Option<&Path>,
) -> Vec<&'static str> {
    let mut failed = Vec::new();
    for prereq in prereqs {
        if !install(session, prereq, preferred, project_dir).await {
            failed.push(prereq.id);
        }
    }
    failed
}
