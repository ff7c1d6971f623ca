use crate::cli::app::NewArgs;
use anyhow::{bail, Context, Result};
use appstrap_core::config::{sanitize_name, ConnectionFlags, DbProvider};
use appstrap_core::exec::SessionContext;
use appstrap_core::orchestrator::{self, SetupOptions};
use appstrap_core::prompt::InteractivePrompter;
use appstrap_core::template::TemplateSpec;
use colored::Colorize;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Resolve the positional name into a project name and target directory.
/// "." scaffolds into the current directory under its own name.
fn resolve_target(raw: &str) -> Result<(String, PathBuf)> {
    if raw == "." {
        let dir = env::current_dir().context("cannot determine the current directory")?;
        let name = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .context("the current directory has no usable name")?;
        return Ok((name, dir));
    }
    if sanitize_name(raw).is_empty() {
        bail!("'{raw}' cannot be turned into a usable project name");
    }
    let dir = env::current_dir()
        .context("cannot determine the current directory")?
        .join(raw);
    Ok((raw.to_string(), dir))
}

pub async fn execute(args: NewArgs) -> Result<()> {
    let (name, dir) = resolve_target(&args.name)?;

    let flags = if args.production {
        ConnectionFlags::all()
    } else {
        ConnectionFlags {
            auth: args.auth,
            database: args.database.is_some(),
            deploy: args.deploy,
        }
    };
    let database: DbProvider = match args.database {
        Some(choice) => choice.into(),
        None => DbProvider::Neon,
    };

    let mut template = TemplateSpec::default();
    if let Some(url) = args.template {
        template.url = url;
    }
    template.branch = args.branch;

    let options = SetupOptions {
        name: name.clone(),
        dir: dir.clone(),
        flags,
        database,
        template,
        skip_checks: args.skip_checks,
    };
    let session = SessionContext::system(args.fast, args.auto_install);
    let prompter = InteractivePrompter;

    info!("scaffolding '{}' into {}", name, dir.display());
    let existed_before = dir.exists();
    tokio::select! {
        result = orchestrator::run_setup(&session, &prompter, options) => {
            result?;
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            // Leave nothing half-scaffolded behind.
            if !existed_before {
                let _ = fs::remove_dir_all(&dir);
            }
            println!();
            println!("  {} setup interrupted", "✗".red());
            bail!("interrupted");
        }
    }
}
