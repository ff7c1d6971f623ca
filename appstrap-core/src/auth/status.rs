//! Authentication status probes
//!
//! Each provider CLI is asked who is signed in; an email-like marker in the
//! output (or, where the CLI fails outright when logged out, a clean exit)
//! counts as authenticated. Probe failures of any kind count as not
//! authenticated.

use super::{AuthStatus, ProviderKind};
use crate::exec::{SessionContext, NETWORK_TIMEOUT};
use crate::prereqs;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});

/// Probe one provider's authentication state. Fail-closed.
pub async fn check(session: &SessionContext, kind: ProviderKind) -> bool {
    let Some(prereq) = prereqs::by_id(kind.prereq_id()) else {
        return false;
    };
    let (program, prefix) = prereqs::invocation(session, prereq);
    let mut args: Vec<&str> = prefix.iter().map(String::as_str).collect();
    args.extend_from_slice(kind.whoami_args());

    let out = session.run(&program, &args, None, NETWORK_TIMEOUT).await;
    if !out.success {
        debug!("{} auth probe failed: {}", kind.display_name(), out.stderr.trim());
        return false;
    }
    let authenticated = kind.success_exit_suffices() || EMAIL_RE.is_match(&out.combined());
    debug!("{} authenticated: {}", kind.display_name(), authenticated);
    authenticated
}

/// Probe every provider the run needs.
pub async fn check_all(session: &SessionContext, needed: &[ProviderKind]) -> AuthStatus {
    let mut status = AuthStatus::default();
    for kind in needed {
        let authenticated = check(session, *kind).await;
        status.set(*kind, authenticated);
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::{err_output, ok_output, MockRunner};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn session_with(runner: Arc<MockRunner>) -> SessionContext {
        let session = SessionContext::new(runner, false, false);
        for tool in ["firebase", "neonctl", "supabase", "wrangler"] {
            session.seed_path(tool, Some(PathBuf::from(format!("/usr/local/bin/{tool}"))));
        }
        session
    }

    #[tokio::test]
    async fn email_in_output_means_authenticated() {
        let runner = Arc::new(
            MockRunner::new()
                .on("wrangler", ok_output("You are logged in, associated with dev@example.com")),
        );
        let session = session_with(runner);
        assert!(check(&session, ProviderKind::Cloudflare).await);
    }

    #[tokio::test]
    async fn clean_exit_without_email_is_not_authenticated() {
        let runner =
            Arc::new(MockRunner::new().on("firebase", ok_output("No authorized accounts.")));
        let session = session_with(runner);
        assert!(!check(&session, ProviderKind::Firebase).await);
    }

    #[tokio::test]
    async fn probe_failure_is_fail_closed() {
        let runner =
            Arc::new(MockRunner::new().on("neonctl", err_output("ERROR: not authenticated")));
        let session = session_with(runner);
        assert!(!check(&session, ProviderKind::Neon).await);
    }

    #[tokio::test]
    async fn supabase_accepts_clean_exit() {
        let runner = Arc::new(
            MockRunner::new().on("supabase", ok_output("ID | NAME\nabc123 | my-project")),
        );
        let session = session_with(runner);
        assert!(check(&session, ProviderKind::Supabase).await);
    }

    #[tokio::test]
    async fn check_all_fills_only_needed_slots() {
        let runner = Arc::new(
            MockRunner::new().on("firebase", ok_output("user@example.com")),
        );
        let session = session_with(runner);
        let status =
            check_all(&session, &[ProviderKind::Firebase, ProviderKind::Cloudflare]).await;
        assert!(status.firebase);
        assert!(!status.cloudflare);
        assert!(!status.neon);
    }
}
