//! Provider setup workflows
//!
//! One generic provisioning flow (discover, create-or-select, extract,
//! manual fallback) parameterized per provider, plus the error taxonomy the
//! retry wrapper classifies against. Errors are classified as close to the
//! provider CLI as possible so outer layers react on semantic grounds
//! instead of string-sniffing twice.

pub mod cloudflare;
pub mod custom;
pub mod firebase;
pub mod flow;
pub mod neon;
pub mod retry;
pub mod supabase;

pub use flow::{provision, Resource, ResourceProvider};
pub use retry::with_retry;

use crate::exec::{CmdOutput, SessionContext};
use crate::prereqs;
use crate::prompt::PromptError;
use colored::Colorize;
use std::time::Duration;
use thiserror::Error;

/// Timeout for provider resource creation, which can be slow server-side.
pub(crate) const CREATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Invoke a provider CLI through its prerequisite definition, so a tool
/// that was only installed project-locally still runs (via npx).
pub(crate) async fn run_provider_cli(
    session: &SessionContext,
    prereq_id: &str,
    args: &[&str],
    timeout: Duration,
) -> CmdOutput {
    let Some(prereq) = prereqs::by_id(prereq_id) else {
        return CmdOutput::failure(format!("unknown tool {prereq_id}"));
    };
    let (program, prefix) = prereqs::invocation(session, prereq);
    let mut full: Vec<&str> = prefix.iter().map(String::as_str).collect();
    full.extend_from_slice(args);
    session.run(&program, &full, None, timeout).await
}

/// Print the numbered steps of a manual fallback path.
pub(crate) fn print_manual_steps(provider: &str, url: &str, steps: &[&str]) {
    println!();
    println!("  {} manual setup for {}:", "->".blue(), provider.bold());
    for (i, step) in steps.iter().enumerate() {
        println!("    {}. {}", i + 1, step);
    }
    println!("    {}", url.cyan());
}

/// Policy conditions that are terminal for the current attempt and need
/// user action outside the CLI before a retry can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Provider terms of service not yet accepted.
    TermsOfService,
    /// The account's first resource must be created in the web console.
    FirstResourceManual,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient failure worth retrying (network blip, flaky CLI).
    #[error("{message}")]
    Transient { message: String },

    /// A provider CLI invocation failed for no recognized reason.
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Resource name already taken. Normally resolved by suffix-retry
    /// inside the workflow; rarely escapes to the retry wrapper.
    #[error("name '{name}' is already taken")]
    NameConflict { name: String },

    /// Blocked by provider policy; see [`PolicyKind`].
    #[error("{remediation}")]
    PolicyBlocked { kind: PolicyKind, remediation: String },

    /// The workflow found itself unauthenticated. Setup workflows fail
    /// fast here instead of silently falling back.
    #[error("not signed in to {provider}; run the login step first")]
    NotAuthenticated { provider: &'static str },

    /// User said no to a required confirmation.
    #[error("declined: {action}")]
    Declined { action: String },

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient { message: message.into() }
    }

    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed { command: command.into(), stderr: stderr.into() }
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::NameConflict { name: name.into() }
    }

    pub fn policy(kind: PolicyKind, remediation: impl Into<String>) -> Self {
        Self::PolicyBlocked { kind, remediation: remediation.into() }
    }

    pub fn declined(action: impl Into<String>) -> Self {
        Self::Declined { action: action.into() }
    }

    /// Eligible for the bounded retry loop.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Transient { .. }
                | ProviderError::CommandFailed { .. }
                | ProviderError::NameConflict { .. }
        )
    }

    /// Needs user remediation outside the CLI before retrying.
    pub fn is_policy(&self) -> bool {
        matches!(self, ProviderError::PolicyBlocked { .. })
    }

    /// Terminal immediately; the user chose not to proceed.
    pub fn is_decline(&self) -> bool {
        matches!(
            self,
            ProviderError::Declined { .. } | ProviderError::Prompt(PromptError::Cancelled)
        )
    }
}
