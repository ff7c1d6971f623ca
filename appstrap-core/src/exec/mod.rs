//! Subprocess execution seam
//!
//! All external CLI invocations go through the [`CommandRunner`] trait so
//! the provisioning logic can be tested without spawning processes. The
//! real implementation wraps `tokio::process::Command` and bounds every
//! invocation with an explicit timeout; a timed-out invocation reports as
//! a plain failure so downstream classification never sees a special
//! "unknown" state.

pub mod session;
#[cfg(test)]
pub mod testing;

pub use session::SessionContext;

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Short timeout for version checks and other local probes.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for network-backed provider CLI calls.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for package installs.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for human-driven browser login flows.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Captured result of a subprocess invocation.
#[derive(Debug, Clone, Default)]
pub struct CmdOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CmdOutput {
    /// A synthetic failure, used when the process could not be spawned
    /// or did not finish in time.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, stdout: String::new(), stderr: message.into(), timed_out: false }
    }

    fn timeout(program: &str, after: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: format!("{} timed out after {:?}", program, after),
            timed_out: true,
        }
    }

    /// stdout and stderr concatenated, for substring classification.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Seam for running external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command with captured stdout/stderr.
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CmdOutput;

    /// Run a command with inherited stdio, for interactive flows such as
    /// browser-based logins. Only the exit status is observed.
    async fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CmdOutput;
}

/// Real runner backed by `tokio::process`.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CmdOutput {
        debug!("exec: {} {}", program, args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);

        let fut = cmd.output();
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(output)) => CmdOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                timed_out: false,
            },
            Ok(Err(e)) => {
                debug!("failed to spawn {}: {}", program, e);
                CmdOutput::failure(format!("failed to run {}: {}", program, e))
            }
            Err(_) => {
                warn!("{} did not finish within {:?}", program, timeout);
                CmdOutput::timeout(program, timeout)
            }
        }
    }

    async fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CmdOutput {
        debug!("exec (interactive): {} {}", program, args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::inherit()).stdout(Stdio::inherit()).stderr(Stdio::inherit());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);

        let fut = async {
            match cmd.status().await {
                Ok(status) => CmdOutput {
                    success: status.success(),
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: false,
                },
                Err(e) => CmdOutput::failure(format!("failed to run {}: {}", program, e)),
            }
        };
        match tokio::time::timeout(timeout, fut).await {
            Ok(output) => output,
            Err(_) => {
                warn!("{} did not finish within {:?}", program, timeout);
                CmdOutput::timeout(program, timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_failure_is_plain_failure() {
        let out = SystemRunner
            .run("appstrap-definitely-not-a-binary", &["--version"], None, SHORT_TIMEOUT)
            .await;
        assert!(!out.success);
        assert!(!out.timed_out);
        assert!(out.stderr.contains("failed to run"));
    }

    #[test]
    fn combined_includes_both_streams() {
        let out = CmdOutput {
            success: false,
            stdout: "created".into(),
            stderr: "already exists".into(),
            timed_out: false,
        };
        assert!(out.combined().contains("created"));
        assert!(out.combined().contains("already exists"));
    }
}
