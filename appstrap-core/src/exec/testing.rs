//! Test doubles for the execution seam.

use super::{CmdOutput, CommandRunner};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted runner: maps a program name (or "program arg0") to a canned
/// output and counts every invocation. Commands are matched by the trailing
/// path component so resolved paths and bare names script the same way.
pub struct MockRunner {
    outputs: Mutex<HashMap<String, Vec<CmdOutput>>>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            outputs: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Script an output for a program name or a "program arg0" pair. When
    /// scripted multiple times for the same key, outputs are consumed in
    /// order, the last one repeating.
    pub fn on(self, key: &str, output: CmdOutput) -> Self {
        self.outputs.lock().unwrap().entry(key.to_string()).or_default().push(output);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every invocation as "program arg...", in order.
    pub fn invocations(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn lookup(&self, program: &str, args: &[&str]) -> CmdOutput {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = Path::new(program)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| program.to_string());
        self.log.lock().unwrap().push(format!("{} {}", name, args.join(" ")));

        let mut outputs = self.outputs.lock().unwrap();
        let keyed = args.first().map(|a| format!("{} {}", name, a));
        let key = match keyed {
            Some(ref k) if outputs.contains_key(k) => k.clone(),
            _ => name,
        };
        match outputs.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue.first().cloned().unwrap_or_else(|| {
                CmdOutput::failure("unscripted command")
            }),
            None => CmdOutput::failure("unscripted command"),
        }
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, program: &str, args: &[&str], _: Option<&Path>, _: Duration) -> CmdOutput {
        self.lookup(program, args)
    }

    async fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        _: Option<&Path>,
        _: Duration,
    ) -> CmdOutput {
        self.lookup(program, args)
    }
}

/// A successful invocation printing `stdout`.
pub fn ok_output(stdout: &str) -> CmdOutput {
    CmdOutput { success: true, stdout: stdout.to_string(), stderr: String::new(), timed_out: false }
}

/// A failed invocation printing `stderr`.
pub fn err_output(stderr: &str) -> CmdOutput {
    CmdOutput { success: false, stdout: String::new(), stderr: stderr.to_string(), timed_out: false }
}
