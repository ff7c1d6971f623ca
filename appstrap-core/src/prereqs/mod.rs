//! Prerequisite resolution
//!
//! Declares the external tools a setup run depends on and evaluates them
//! against the live environment. Definitions are static; only the
//! evaluation results change between runs.

pub mod checker;
pub mod installer;

pub use checker::{check, check_all};
pub use installer::{install, InstallScope};

use once_cell::sync::Lazy;
use semver::Version;

/// A named external tool requirement. Defined statically per supported
/// provider and never mutated at runtime.
#[derive(Debug, Clone)]
pub struct Prerequisite {
    pub id: &'static str,
    /// Binary name looked up on the search path.
    pub command: &'static str,
    pub version_args: &'static [&'static str],
    pub min_version: Option<Version>,
    /// npm package that provides the tool, when installable.
    pub package: Option<&'static str>,
    pub global_install: bool,
    pub local_install: bool,
    /// System tool managed outside any package manager (node, git).
    pub system_tool: bool,
    pub optional: bool,
    /// Ships with the template; no real binary dependency to probe.
    pub bundled: bool,
    pub install_url: &'static str,
    pub description: &'static str,
}

/// Outcome of evaluating one prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrereqStatus {
    Ok,
    Missing,
    Outdated,
    InstalledLocally,
}

#[derive(Debug, Clone)]
pub struct PrerequisiteResult {
    pub status: PrereqStatus,
    pub version: Option<String>,
}

impl PrerequisiteResult {
    pub fn satisfied(&self) -> bool {
        matches!(self.status, PrereqStatus::Ok | PrereqStatus::InstalledLocally)
    }
}

/// All tools appstrap knows how to evaluate.
pub static PREREQUISITES: Lazy<Vec<Prerequisite>> = Lazy::new(|| {
    vec![
        Prerequisite {
            id: "node",
            command: "node",
            version_args: &["--version"],
            min_version: Some(Version::new(20, 0, 0)),
            package: None,
            global_install: false,
            local_install: false,
            system_tool: true,
            optional: false,
            bundled: false,
            install_url: "https://nodejs.org/en/download",
            description: "Node.js runtime",
        },
        Prerequisite {
            id: "npm",
            command: "npm",
            version_args: &["--version"],
            min_version: None,
            package: None,
            global_install: false,
            local_install: false,
            system_tool: true,
            optional: false,
            bundled: false,
            install_url: "https://nodejs.org/en/download",
            description: "npm package manager (ships with Node.js)",
        },
        Prerequisite {
            id: "git",
            command: "git",
            version_args: &["--version"],
            min_version: None,
            package: None,
            global_install: false,
            local_install: false,
            system_tool: true,
            optional: false,
            bundled: false,
            install_url: "https://git-scm.com/downloads",
            description: "git version control",
        },
        Prerequisite {
            id: "firebase",
            command: "firebase",
            version_args: &["--version"],
            min_version: Some(Version::new(13, 0, 0)),
            package: Some("firebase-tools"),
            global_install: true,
            local_install: true,
            system_tool: false,
            optional: false,
            bundled: false,
            install_url: "https://firebase.google.com/docs/cli",
            description: "Firebase CLI (authentication provider)",
        },
        Prerequisite {
            id: "wrangler",
            command: "wrangler",
            version_args: &["--version"],
            min_version: Some(Version::new(3, 0, 0)),
            package: Some("wrangler"),
            global_install: true,
            local_install: true,
            system_tool: false,
            optional: false,
            bundled: false,
            install_url: "https://developers.cloudflare.com/workers/wrangler/install-and-update/",
            description: "Cloudflare Wrangler CLI (deploy provider)",
        },
        Prerequisite {
            id: "neonctl",
            command: "neonctl",
            version_args: &["--version"],
            min_version: None,
            package: Some("neonctl"),
            global_install: true,
            local_install: true,
            system_tool: false,
            optional: true,
            bundled: false,
            install_url: "https://neon.tech/docs/reference/neon-cli",
            description: "Neon CLI (database provider)",
        },
        // Supabase forbids global npm installs of its CLI.
        Prerequisite {
            id: "supabase",
            command: "supabase",
            version_args: &["--version"],
            min_version: None,
            package: Some("supabase"),
            global_install: false,
            local_install: true,
            system_tool: false,
            optional: true,
            bundled: false,
            install_url: "https://supabase.com/docs/guides/cli",
            description: "Supabase CLI (database provider)",
        },
        Prerequisite {
            id: "local-db",
            command: "",
            version_args: &[],
            min_version: None,
            package: None,
            global_install: false,
            local_install: false,
            system_tool: false,
            optional: true,
            bundled: true,
            install_url: "",
            description: "embedded development database (ships with the template)",
        },
    ]
});

/// Look up a prerequisite definition by id.
pub fn by_id(id: &str) -> Option<&'static Prerequisite> {
    PREREQUISITES.iter().find(|p| p.id == id)
}

/// How to invoke a tool right now: directly when it resolves on the search
/// path, otherwise through npx against its package (the project-local
/// indirection). Returns the program plus the argument prefix to prepend.
pub fn invocation(
    session: &crate::exec::SessionContext,
    prereq: &Prerequisite,
) -> (String, Vec<String>) {
    if let Some(path) = session.resolve(prereq.command) {
        return (path.to_string_lossy().to_string(), Vec::new());
    }
    if let Some(package) = prereq.package {
        return ("npx".to_string(), vec!["--yes".to_string(), package.to_string()]);
    }
    (prereq.command.to_string(), Vec::new())
}

/// The prerequisites a run needs, given the selected capabilities.
/// `database` is the prerequisite id of the chosen database CLI, if any.
pub fn required(auth: bool, database: Option<&str>, deploy: bool) -> Vec<&'static Prerequisite> {
    let mut ids = vec!["node", "npm", "git"];
    if auth {
        ids.push("firebase");
    }
    if let Some(db) = database {
        ids.push(db);
    } else {
        ids.push("local-db");
    }
    if deploy {
        ids.push("wrangler");
    }
    ids.into_iter().filter_map(by_id).collect()
}
