//! Command-line surface for the deployment engine.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the module deployment engine.
#[derive(Parser, Debug)]
#[command(
    name = "modman",
    about = "Manifest-driven module deployment engine",
    version
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the project root (defaults to the nearest ancestor containing .modman)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Replace conflicting files or directories at link destinations
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Copy files into place instead of creating symlinks
    #[arg(long, global = true)]
    pub copy: bool,

    /// Skip modman.local companion manifests (local processing is on by default)
    #[arg(long = "no-local", global = true, action = clap::ArgAction::SetFalse)]
    pub local: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a module store in the current directory
    Init,
    /// List modules in the store
    List,
    /// Deploy one module's manifest
    Deploy(DeployOpts),
    /// Deploy every module in the store
    DeployAll,
    /// Update one module from version control, then redeploy it
    Update(ModuleOpts),
    /// Update and redeploy every module, then sweep dead links
    UpdateAll,
    /// Rebuild all links from scratch without touching version control
    Repair,
    /// Remove dead symlinks under the project root
    Clean,
    /// Clone a git repository into the store and deploy it
    Clone(CheckoutOpts),
    /// Check out a Subversion repository into the store and deploy it
    Checkout(CheckoutOpts),
    /// Delete a module from the store and sweep its dead links
    Remove(ModuleOpts),
    /// Show working-copy status for every module
    Status,
    /// Show upstream changes not yet pulled, for every module
    Incoming,
    /// Print version information
    Version,
}

impl Command {
    /// Stable command name, used to pick the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::List => "list",
            Self::Deploy(_) => "deploy",
            Self::DeployAll => "deploy-all",
            Self::Update(_) => "update",
            Self::UpdateAll => "update-all",
            Self::Repair => "repair",
            Self::Clean => "clean",
            Self::Clone(_) => "clone",
            Self::Checkout(_) => "checkout",
            Self::Remove(_) => "remove",
            Self::Status => "status",
            Self::Incoming => "incoming",
            Self::Version => "version",
        }
    }
}

/// Options for the `deploy` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DeployOpts {
    /// Name of the module to deploy
    pub module: String,

    /// Persist a base-directory override for the module before deploying
    #[arg(long)]
    pub basedir: Option<String>,
}

/// Options for subcommands that name a single module.
#[derive(Parser, Debug, Clone)]
pub struct ModuleOpts {
    /// Name of the module
    pub module: String,
}

/// Options for the `clone` and `checkout` subcommands.
#[derive(Parser, Debug, Clone)]
pub struct CheckoutOpts {
    /// Repository URL to fetch the module from
    pub url: String,

    /// Module name (defaults to the last path segment of the URL)
    pub name: Option<String>,

    /// Persist a base-directory override for the module before deploying
    #[arg(long)]
    pub basedir: Option<String>,
}
