use crate::cli::app::{ConnectArgs, ConnectCommand, ConnectTarget};
use anyhow::{Context, Result};
use appstrap_core::config::DbProvider;
use appstrap_core::exec::SessionContext;
use appstrap_core::orchestrator::{self, Capability};
use appstrap_core::prompt::InteractivePrompter;
use std::path::PathBuf;

fn project_dir(args: &ConnectArgs) -> Result<PathBuf> {
    match &args.dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().context("cannot determine the current directory"),
    }
}

pub async fn execute(cmd: ConnectCommand) -> Result<()> {
    let (capability, database, common) = match cmd.target {
        ConnectTarget::Auth(args) => (Capability::Auth, DbProvider::Neon, args),
        ConnectTarget::Database(args) => {
            (Capability::Database, args.provider.into(), args.common)
        }
        ConnectTarget::Deploy(args) => (Capability::Deploy, DbProvider::Neon, args),
    };

    let dir = project_dir(&common)?;
    let session = SessionContext::system(common.fast, common.auto_install);
    let prompter = InteractivePrompter;

    orchestrator::run_connect(&session, &prompter, &dir, capability, database).await?;
    Ok(())
}
