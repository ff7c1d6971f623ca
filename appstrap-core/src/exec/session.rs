//! Session-scoped execution context
//!
//! Holds the command runner, run-mode flags, and the resolved-path cache
//! for external tools. The cache is computed once per tool and must be
//! explicitly invalidated after an install or login changes what is on
//! the search path; it never self-corrects mid-run.

use super::{CmdOutput, CommandRunner, SystemRunner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Per-run context passed to every checking and provisioning function.
pub struct SessionContext {
    runner: Arc<dyn CommandRunner>,
    paths: Mutex<HashMap<String, Option<PathBuf>>>,
    /// Minimal prompts, derived defaults.
    pub fast: bool,
    /// Install missing prerequisites without asking.
    pub auto_install: bool,
}

impl SessionContext {
    pub fn new(runner: Arc<dyn CommandRunner>, fast: bool, auto_install: bool) -> Self {
        Self { runner, paths: Mutex::new(HashMap::new()), fast, auto_install }
    }

    /// Context backed by the real system runner.
    pub fn system(fast: bool, auto_install: bool) -> Self {
        Self::new(Arc::new(SystemRunner), fast, auto_install)
    }

    /// Resolve a tool on the search path, caching the result for the
    /// remainder of the run.
    pub fn resolve(&self, tool: &str) -> Option<PathBuf> {
        let mut cache = self.paths.lock().expect("path cache poisoned");
        cache
            .entry(tool.to_string())
            .or_insert_with(|| {
                let found = which::which(tool).ok();
                debug!("resolved {}: {:?}", tool, found);
                found
            })
            .clone()
    }

    /// Drop the cached resolution for a tool. Required after installing
    /// it so the recheck does not see a stale miss.
    pub fn invalidate(&self, tool: &str) {
        self.paths.lock().expect("path cache poisoned").remove(tool);
    }

    /// Pre-populate the resolution cache. Lets tests pin a tool to a known
    /// path (or a known miss) without touching the real search path.
    pub fn seed_path(&self, tool: &str, path: Option<PathBuf>) {
        self.paths.lock().expect("path cache poisoned").insert(tool.to_string(), path);
    }

    pub async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CmdOutput {
        self.runner.run(program, args, cwd, timeout).await
    }

    pub async fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CmdOutput {
        self.runner.run_interactive(program, args, cwd, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRunner(AtomicUsize);

    #[async_trait]
    impl CommandRunner for CountingRunner {
        async fn run(&self, _: &str, _: &[&str], _: Option<&Path>, _: Duration) -> CmdOutput {
            self.0.fetch_add(1, Ordering::SeqCst);
            CmdOutput::failure("not used")
        }

        async fn run_interactive(
            &self,
            _: &str,
            _: &[&str],
            _: Option<&Path>,
            _: Duration,
        ) -> CmdOutput {
            CmdOutput::failure("not used")
        }
    }

    #[test]
    fn resolve_is_cached_until_invalidated() {
        let session =
            SessionContext::new(Arc::new(CountingRunner(AtomicUsize::new(0))), false, false);
        // "sh" exists basically everywhere this test runs; the point here
        // is cache behavior, not resolution itself.
        let first = session.resolve("sh");
        let second = session.resolve("sh");
        assert_eq!(first, second);

        session.invalidate("sh");
        let third = session.resolve("sh");
        assert_eq!(first, third);
    }
}
