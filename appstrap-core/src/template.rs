//! Starter template acquisition
//!
//! The project skeleton comes from a git repository cloned shallowly into
//! the target directory. The clone's git history is discarded so the new
//! project starts with a clean tree, and the result is structure-checked
//! before any provider setup runs.

use crate::exec::SessionContext;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_TEMPLATE_URL: &str = "https://github.com/appstrap-dev/starter-template";

const CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Paths every usable template must contain.
const REQUIRED_PATHS: &[&str] = &["package.json", "web", "server"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to fetch template: {message}")]
    Fetch { message: String },

    #[error("template is missing required path '{missing}'")]
    Structure { missing: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where to clone from. `branch` of `None` means the remote default.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub url: String,
    pub branch: Option<String>,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self { url: DEFAULT_TEMPLATE_URL.to_string(), branch: None }
    }
}

/// Shallow-clone the template into `dest`, strip its git history, and
/// verify the expected layout.
pub async fn fetch(
    session: &SessionContext,
    spec: &TemplateSpec,
    dest: &Path,
) -> Result<(), TemplateError> {
    let dest_str = dest.to_string_lossy().to_string();
    let mut args = vec!["clone", "--depth", "1"];
    if let Some(branch) = &spec.branch {
        args.push("--branch");
        args.push(branch);
    }
    args.push(&spec.url);
    args.push(&dest_str);

    info!("fetching template from {}", spec.url);
    let out = session.run("git", &args, None, CLONE_TIMEOUT).await;
    if !out.success {
        let message = if out.timed_out {
            "git clone timed out".to_string()
        } else {
            out.combined().trim().to_string()
        };
        return Err(TemplateError::Fetch { message });
    }

    match fs::remove_dir_all(dest.join(".git")) {
        Ok(()) => debug!("stripped template git history"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    verify_structure(dest)
}

/// Check the cloned tree has everything the rest of setup relies on.
pub fn verify_structure(dir: &Path) -> Result<(), TemplateError> {
    for required in REQUIRED_PATHS {
        if !dir.join(required).exists() {
            return Err(TemplateError::Structure { missing: (*required).to_string() });
        }
    }
    Ok(())
}
