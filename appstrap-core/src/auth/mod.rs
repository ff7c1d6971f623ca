//! Provider authentication
//!
//! Determines which provider CLIs are already signed in and walks the user
//! through the missing logins, strictly one at a time. Any probe failure is
//! treated as "not authenticated", never the other way around.

pub mod batch;
pub mod status;

pub use batch::ensure_authenticated;
pub use status::check_all;

use crate::prompt::PromptError;
use thiserror::Error;

/// An external service with its own CLI and login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Firebase,
    Neon,
    Supabase,
    Cloudflare,
}

impl ProviderKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Firebase => "Firebase",
            ProviderKind::Neon => "Neon",
            ProviderKind::Supabase => "Supabase",
            ProviderKind::Cloudflare => "Cloudflare",
        }
    }

    /// Prerequisite id of the CLI that serves this provider.
    pub fn prereq_id(&self) -> &'static str {
        match self {
            ProviderKind::Firebase => "firebase",
            ProviderKind::Neon => "neonctl",
            ProviderKind::Supabase => "supabase",
            ProviderKind::Cloudflare => "wrangler",
        }
    }

    /// Arguments of the "who am I" probe.
    pub(crate) fn whoami_args(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Firebase => &["login:list"],
            ProviderKind::Neon => &["me"],
            ProviderKind::Supabase => &["projects", "list"],
            ProviderKind::Cloudflare => &["whoami"],
        }
    }

    /// Arguments of the interactive login flow.
    pub(crate) fn login_args(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Firebase => &["login"],
            ProviderKind::Neon => &["auth"],
            ProviderKind::Supabase => &["login"],
            ProviderKind::Cloudflare => &["login"],
        }
    }

    /// Whether a successful probe exit alone proves authentication, or an
    /// email-like marker must also appear in the output.
    pub(crate) fn success_exit_suffices(&self) -> bool {
        // `supabase projects list` fails outright when logged out.
        matches!(self, ProviderKind::Supabase)
    }
}

/// Per-provider authentication state for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthStatus {
    pub firebase: bool,
    pub neon: bool,
    pub supabase: bool,
    pub cloudflare: bool,
}

impl AuthStatus {
    pub fn get(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Firebase => self.firebase,
            ProviderKind::Neon => self.neon,
            ProviderKind::Supabase => self.supabase,
            ProviderKind::Cloudflare => self.cloudflare,
        }
    }

    pub fn set(&mut self, kind: ProviderKind, authenticated: bool) {
        match kind {
            ProviderKind::Firebase => self.firebase = authenticated,
            ProviderKind::Neon => self.neon = authenticated,
            ProviderKind::Supabase => self.supabase = authenticated,
            ProviderKind::Cloudflare => self.cloudflare = authenticated,
        }
    }

    /// The subset of `needed` still requiring an interactive login.
    pub fn pending(&self, needed: &[ProviderKind]) -> Vec<ProviderKind> {
        needed.iter().copied().filter(|k| !self.get(*k)).collect()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in declined")]
    Declined,

    #[error("login failed for {provider}: {message}")]
    LoginFailed { provider: &'static str, message: String },

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_filters_authenticated_providers() {
        let mut status = AuthStatus::default();
        status.set(ProviderKind::Firebase, true);
        let pending =
            status.pending(&[ProviderKind::Firebase, ProviderKind::Neon, ProviderKind::Cloudflare]);
        assert_eq!(pending, vec![ProviderKind::Neon, ProviderKind::Cloudflare]);
    }
}
