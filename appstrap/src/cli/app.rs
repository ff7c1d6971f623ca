use appstrap_core::config::DbProvider;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "appstrap",
    version,
    about = "Appstrap - scaffold a full-stack app with auth, database, and deployment",
    long_about = "Appstrap clones a full-stack starter template and wires it to Firebase \
                  auth, a Postgres database, and Cloudflare Workers deployment, or to local \
                  stand-ins for any of them. Each capability can be connected to production \
                  later with 'appstrap connect'."
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new project
    #[command(about = "Scaffold a new project from the starter template")]
    New(NewArgs),

    /// Connect an existing project to production services
    #[command(about = "Connect one capability of an existing project to its production provider")]
    Connect(ConnectCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatabaseChoice {
    Neon,
    Supabase,
    Custom,
}

impl From<DatabaseChoice> for DbProvider {
    fn from(choice: DatabaseChoice) -> Self {
        match choice {
            DatabaseChoice::Neon => DbProvider::Neon,
            DatabaseChoice::Supabase => DbProvider::Supabase,
            DatabaseChoice::Custom => DbProvider::Custom,
        }
    }
}

#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Project name, or "." for the current directory
    #[arg(help = "Name of the project to create ('.' uses the current directory)")]
    pub name: String,

    /// Run everything against local stand-ins (this is the default)
    #[arg(long, conflicts_with_all = ["production", "auth", "database", "deploy"])]
    pub local: bool,

    /// Connect every capability to its production provider
    #[arg(long)]
    pub production: bool,

    /// Connect auth to a real Firebase project
    #[arg(long)]
    pub auth: bool,

    /// Connect to a production database and pick its provider
    #[arg(long, value_enum)]
    pub database: Option<DatabaseChoice>,

    /// Connect deployment to Cloudflare Workers
    #[arg(long)]
    pub deploy: bool,

    /// Template repository to clone instead of the default
    #[arg(long)]
    pub template: Option<String>,

    /// Branch of the template repository
    #[arg(long)]
    pub branch: Option<String>,

    /// Skip optional prompts and take the derived defaults
    #[arg(long)]
    pub fast: bool,

    /// Install missing tools without asking
    #[arg(long, short = 'y')]
    pub auto_install: bool,

    /// Skip prerequisite checks entirely
    #[arg(long)]
    pub skip_checks: bool,
}

#[derive(Parser, Debug)]
pub struct ConnectCommand {
    #[command(subcommand)]
    pub target: ConnectTarget,
}

#[derive(Subcommand, Debug)]
pub enum ConnectTarget {
    /// Connect auth to a real Firebase project
    Auth(ConnectArgs),

    /// Connect to a production Postgres database
    Database(ConnectDatabaseArgs),

    /// Connect deployment to Cloudflare Workers
    Deploy(ConnectArgs),
}

#[derive(Parser, Debug)]
pub struct ConnectArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Skip optional prompts and take the derived defaults
    #[arg(long)]
    pub fast: bool,

    /// Install missing tools without asking
    #[arg(long, short = 'y')]
    pub auto_install: bool,
}

#[derive(Parser, Debug)]
pub struct ConnectDatabaseArgs {
    /// Database provider to connect
    #[arg(long, value_enum, default_value = "neon")]
    pub provider: DatabaseChoice,

    #[command(flatten)]
    pub common: ConnectArgs,
}
