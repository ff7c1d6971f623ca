//! Batch authentication
//!
//! Browser logins cannot run in parallel without confusing the user about
//! which tab belongs to which provider, so missing logins are processed
//! strictly one after another, behind a single upfront confirmation.

use super::{AuthError, AuthStatus, ProviderKind};
use crate::exec::{SessionContext, LOGIN_TIMEOUT};
use crate::prereqs;
use crate::prompt::Prompter;
use colored::Colorize;
use tracing::info;

/// Walk the user through every missing login. Short-circuits when nothing
/// is pending; otherwise asks once before opening any browser tab, then
/// signs in sequentially. The first failed login aborts the rest.
pub async fn ensure_authenticated(
    session: &SessionContext,
    prompter: &dyn Prompter,
    status: &AuthStatus,
    needed: &[ProviderKind],
) -> Result<(), AuthError> {
    let pending = status.pending(needed);
    if pending.is_empty() {
        println!("  {} all providers already signed in", "✓".green());
        info!("no logins required");
        return Ok(());
    }

    let names: Vec<&str> = pending.iter().map(|k| k.display_name()).collect();
    let message = format!(
        "{} browser tab(s) will open to sign in to {} (roughly {} minute(s)). Continue?",
        pending.len(),
        names.join(", "),
        pending.len()
    );
    if !prompter.confirm(&message, true)? {
        return Err(AuthError::Declined);
    }

    for kind in pending {
        println!("  {} signing in to {}...", "->".blue(), kind.display_name());
        let prereq = prereqs::by_id(kind.prereq_id()).expect("provider prerequisite is registered");
        let (program, prefix) = prereqs::invocation(session, prereq);
        let mut args: Vec<&str> = prefix.iter().map(String::as_str).collect();
        args.extend_from_slice(kind.login_args());

        let out = session.run_interactive(&program, &args, None, LOGIN_TIMEOUT).await;
        if !out.success {
            // Abort the remaining batch; continuing would stack failed
            // browser flows on top of each other.
            return Err(AuthError::LoginFailed {
                provider: kind.display_name(),
                message: if out.timed_out {
                    "login did not complete within 5 minutes".to_string()
                } else {
                    out.stderr.trim().to_string()
                },
            });
        }
        info!("signed in to {}", kind.display_name());
    }
    Ok(())
}
