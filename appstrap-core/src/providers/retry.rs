//! Bounded retry around provider setup workflows
//!
//! Classifies workflow failures and decides whether another attempt is
//! worth anything: policy blocks wait for the user to fix the blocker,
//! declines and non-retryable errors are terminal immediately, and
//! retryable failures get a bounded "retry?" loop. On exhaustion the
//! wrapper prints the capability's manual
//! setup instructions and propagates the error; it never substitutes a
//! default.

use super::ProviderError;
use crate::prompt::Prompter;
use colored::Colorize;
use std::future::Future;
use tracing::warn;

/// Default attempt budget per capability.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Run `op` with up to `max_attempts` total invocations.
pub async fn with_retry<T, F, Fut>(
    capability: &str,
    max_attempts: u32,
    fast: bool,
    prompter: &dyn Prompter,
    manual_help: &str,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if err.is_decline() {
            // The user said no somewhere inside the workflow; asking
            // whether to retry would ask the same question twice.
            return Err(err);
        }

        if err.is_policy() {
            println!();
            println!("  {} {} setup is blocked by the provider:", "!".yellow(), capability);
            println!("    {err}");
            if attempt >= max_attempts {
                print_manual_help(capability, manual_help);
                return Err(err);
            }
            let resolved = prompter
                .confirm("Have you resolved this in the provider console? Retry now?", false)?;
            if !resolved {
                return Err(err);
            }
            attempt += 1;
            continue;
        }

        if !err.is_retryable() {
            // Running the workflow again cannot fix a missing login.
            print_manual_help(capability, manual_help);
            return Err(err);
        }

        warn!("{} setup attempt {}/{} failed: {}", capability, attempt, max_attempts, err);
        if attempt >= max_attempts {
            print_manual_help(capability, manual_help);
            return Err(err);
        }
        let again = if fast {
            true
        } else {
            println!(
                "  {} {} setup failed (attempt {}/{}): {}",
                "!".yellow(),
                capability,
                attempt,
                max_attempts,
                err
            );
            prompter.confirm("Retry?", true)?
        };
        if !again {
            print_manual_help(capability, manual_help);
            return Err(err);
        }
        attempt += 1;
    }
}

fn print_manual_help(capability: &str, manual_help: &str) {
    println!();
    println!("  {} {} could not be set up automatically.", "x".red(), capability);
    println!("  To finish it by hand:");
    for line in manual_help.lines() {
        println!("    {line}");
    }
}
