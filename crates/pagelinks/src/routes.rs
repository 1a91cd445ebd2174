use crate::config::Settings;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use pagelinks_core::url::{Kwargs, NamespaceFallback, RouteResolver};

#[derive(Debug, clap::Parser)]
#[command(name = "routes")]
#[command(about = "Inspect and reverse configured routes")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List the routes in the config file
    #[clap(name = "list")]
    List(ListOptions),

    /// Reverse a route name into a path
    #[clap(name = "reverse")]
    Reverse(ReverseOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ReverseOptions {
    /// Route name, optionally namespaced (e.g. "blog:archive")
    pub name: String,

    /// Positional arguments
    #[arg(value_name = "ARG")]
    pub args: Vec<String>,

    /// Keyword argument as key=value (repeatable)
    #[arg(short, long = "kwarg", value_name = "KEY=VALUE")]
    pub kwargs: Vec<String>,

    /// Application instance used to pick between routes with the same name
    #[arg(long)]
    pub current_app: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, serde::Serialize)]
struct ReverseOutput {
    name: String,
    path: String,
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let settings = Settings::load(&global)?;

    if global.verbose {
        eprintln!("Namespace: {}", settings.namespace.as_deref().unwrap_or("(none)"));
        eprintln!("Routes loaded: {}", settings.routes.len());
        eprintln!();
    }

    match app.command {
        Commands::List(options) => list(&settings, &options),
        Commands::Reverse(options) => reverse(&settings, &options),
    }
}

fn list(settings: &Settings, options: &ListOptions) -> Result<()> {
    if settings.routes.is_empty() {
        return Err(Error::NoRoutes.into());
    }

    if options.json {
        println!("{}", format_routes_json(settings)?);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Name".bold().cyan(),
        "Path".bold().cyan(),
        "App".bold().cyan()
    ]);
    for route in settings.routes.routes() {
        table.add_row(prettytable::row![
            route.name.green(),
            route.path.bright_white(),
            route.app.as_deref().unwrap_or("").bright_black()
        ]);
    }
    table.printstd();

    Ok(())
}

fn reverse(settings: &Settings, options: &ReverseOptions) -> Result<()> {
    let path = reverse_data(settings, options)?;

    if options.json {
        println!("{}", format_reverse_json(&options.name, path)?);
    } else {
        println!("{}", path);
    }

    Ok(())
}

/// Format the route table as JSON
pub fn format_routes_json(settings: &Settings) -> Result<String> {
    let routes: Vec<_> = settings.routes.routes().collect();
    serde_json::to_string_pretty(&routes).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_reverse_json(name: &str, path: String) -> Result<String> {
    let output = ReverseOutput {
        name: name.to_string(),
        path,
    };
    serde_json::to_string_pretty(&output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Reverses a route with the same namespace fallback used for page links
pub fn reverse_data(settings: &Settings, options: &ReverseOptions) -> Result<String> {
    let kwargs = parse_kwargs(&options.kwargs)?;
    let resolver = NamespaceFallback::new(&settings.routes, settings.namespace.clone());

    resolver
        .reverse(
            &options.name,
            &options.args,
            &kwargs,
            options.current_app.as_deref(),
        )
        .map_err(|e| eyre!("{}", e))
}

fn parse_kwargs(values: &[String]) -> Result<Kwargs> {
    let mut kwargs = Kwargs::new();

    for value in values {
        let Some((key, val)) = value.split_once('=').filter(|(key, _)| !key.is_empty()) else {
            return Err(Error::InvalidArgument(f!("expected KEY=VALUE, got '{value}'")).into());
        };
        kwargs.insert(key.to_string(), val.to_string());
    }

    Ok(kwargs)
}
