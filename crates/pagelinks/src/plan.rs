use crate::config::Settings;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use log::debug;
use pagelinks_core::options::PaginateOptions;
use pagelinks_core::plan::{PageEntry, PageInfo, PageLinkPlanner, PagePlan};
use pagelinks_core::query::QueryParams;

#[derive(Debug, clap::Parser, Clone)]
#[command(name = "plan")]
#[command(about = "Plan the links for one page of a paginated result set")]
pub struct App {
    /// Current page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Total number of pages
    #[arg(short, long)]
    pub total: usize,

    /// Path that rewritten query strings are appended to
    #[arg(long, default_value = "")]
    pub path: String,

    /// Query string of the current request (e.g. "q=rust&sort=new")
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Items per page, used for index ranges
    #[arg(long, requires = "count")]
    pub per_page: Option<usize>,

    /// Total number of items, used for index ranges
    #[arg(long, requires = "per_page")]
    pub count: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Pagination options as key=value (range=10 url_anchor=top show_first_last=true ...)
    #[arg(value_name = "OPTION")]
    pub options: Vec<String>,
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let settings = Settings::load(&global)?;
    let options = PaginateOptions::parse(&app.options).context("Invalid pagination options")?;

    if global.verbose {
        eprintln!("Options: {:?}", options);
        eprintln!("Routes loaded: {}", settings.routes.len());
        eprintln!();
    }

    let page = page_info(&app)?;
    let query = QueryParams::parse(&app.query);
    let plan = plan_data(&settings, options, &app.path, &page, &query)?;

    if app.json {
        println!("{}", format_plan_json(&plan)?);
    } else {
        println!("{}", format_plan_text(&plan));
    }

    Ok(())
}

fn page_info(app: &App) -> Result<PageInfo> {
    let page = PageInfo::new(app.page, app.total);

    match (app.per_page, app.count) {
        (Some(0), _) => Err(Error::InvalidArgument(
            "--per-page must be greater than 0".to_string(),
        )
        .into()),
        (Some(per_page), Some(count)) => Ok(page.with_counts(per_page, count)),
        _ => Ok(page),
    }
}

/// Plans the page links and returns them as a structured PagePlan
pub fn plan_data(
    settings: &Settings,
    options: PaginateOptions,
    path: &str,
    page: &PageInfo,
    query: &QueryParams,
) -> Result<PagePlan> {
    debug!("Planning with namespace {:?}", settings.namespace);

    PageLinkPlanner::new(options, &settings.routes)
        .with_namespace(settings.namespace.clone())
        .with_path(path)
        .plan(page, query)
        .map_err(|e| eyre!("Failed to plan page links: {}", e))
}

/// Convert the plan to a JSON string
fn format_plan_json(plan: &PagePlan) -> Result<String> {
    serde_json::to_string_pretty(plan).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert the plan to a table, one row per control
fn format_plan_text(plan: &PagePlan) -> String {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "".bold().cyan(),
        "Page".bold().cyan(),
        "URL".bold().cyan(),
        "Items".bold().cyan()
    ]);

    let arrow = |label: &str, url: &Option<String>| {
        url.as_ref()
            .map(|url| prettytable::row![label.green(), "", url, ""])
    };

    if let Some(row) = arrow("«", &plan.first_url) {
        table.add_row(row);
    }
    if let Some(row) = arrow("←", &plan.previous_url) {
        table.add_row(row);
    }

    for entry in &plan.entries {
        match entry {
            PageEntry::Number {
                page,
                is_current,
                url,
                index_range,
            } => {
                let items = index_range
                    .map(|r| f!("{}-{}", r.start, r.end))
                    .unwrap_or_default();
                if *is_current {
                    table.add_row(prettytable::row![
                        "*".bright_yellow().bold(),
                        page.to_string().bright_yellow().bold(),
                        url,
                        items
                    ]);
                } else {
                    table.add_row(prettytable::row!["", page, url, items]);
                }
            }
            PageEntry::Ellipsis => {
                table.add_row(prettytable::row!["", "…".bright_black(), "", ""]);
            }
        }
    }

    if let Some(row) = arrow("→", &plan.next_url) {
        table.add_row(row);
    }
    if let Some(row) = arrow("»", &plan.last_url) {
        table.add_row(row);
    }

    let mut result = String::new();
    result.push_str(&f!(
        "\n{}\n\n",
        f!("PAGE {} OF {}", plan.current_page, plan.total_pages)
            .bright_cyan()
            .bold()
    ));
    result.push_str(&table.to_string());
    result
}
