use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod config;
mod error;
mod plan;
mod prelude;
mod routes;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Plan the page links, arrows and ellipses of a pagination control"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Route table and namespace file (TOML)
    #[clap(long, env = "PAGELINKS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Namespace tried when a route name doesn't resolve as given
    #[clap(long, env = "PAGELINKS_NAMESPACE", global = true)]
    namespace: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "PAGELINKS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Plan the links for one page of a paginated result set
    Plan(crate::plan::App),

    /// Inspect and reverse configured routes
    Routes(crate::routes::App),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Plan(sub_app) => crate::plan::run(sub_app, app.global),
        SubCommands::Routes(sub_app) => crate::routes::run(sub_app, app.global),
    }
}
