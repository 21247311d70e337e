//! multisearch CLI - query several search providers at once.

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use multisearch::{
    DebugOptions, SafeSearch, Search, SearchConfig, SearchKind, SearchRequest, SearchResult,
    SortBy, SortOrder, KNOWN_PROVIDERS,
};

/// multisearch - concurrent multi-provider web search
#[derive(Parser)]
#[command(name = "multisearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search across the selected providers
    Search(SearchArgs),

    /// List available providers and the environment variables they need
    Providers,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: Option<String>,

    /// Comma-separated document ids (arXiv)
    #[arg(long)]
    id_list: Option<String>,

    /// Providers to use (comma-separated); defaults to the configured set
    #[arg(short, long, value_delimiter = ',')]
    providers: Option<Vec<String>>,

    /// Maximum number of results per provider
    #[arg(short, long)]
    limit: Option<u32>,

    /// Result page (1-based)
    #[arg(long, default_value = "1")]
    page: u32,

    /// Result language (e.g. en)
    #[arg(long)]
    language: Option<String>,

    /// Result region (e.g. us)
    #[arg(long)]
    region: Option<String>,

    /// Safe-search level
    #[arg(long, default_value = "moderate")]
    safe: SafeArg,

    /// Per-provider timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Kind of results
    #[arg(long, default_value = "text")]
    kind: KindArg,

    /// Sort key (arXiv)
    #[arg(long)]
    sort_by: Option<SortByArg>,

    /// Sort order (arXiv)
    #[arg(long)]
    sort_order: Option<SortOrderArg>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// JSON configuration file
    #[arg(long, env = "MULTISEARCH_CONFIG")]
    config: Option<String>,

    /// Log request, response and aggregation diagnostics
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[derive(Clone, Copy, ValueEnum)]
enum SafeArg {
    Off,
    Moderate,
    Strict,
}

impl From<SafeArg> for SafeSearch {
    fn from(arg: SafeArg) -> Self {
        match arg {
            SafeArg::Off => SafeSearch::Off,
            SafeArg::Moderate => SafeSearch::Moderate,
            SafeArg::Strict => SafeSearch::Strict,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Text,
    Images,
    News,
}

impl From<KindArg> for SearchKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Text => SearchKind::Text,
            KindArg::Images => SearchKind::Images,
            KindArg::News => SearchKind::News,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortByArg {
    Relevance,
    LastUpdatedDate,
    SubmittedDate,
}

impl From<SortByArg> for SortBy {
    fn from(arg: SortByArg) -> Self {
        match arg {
            SortByArg::Relevance => SortBy::Relevance,
            SortByArg::LastUpdatedDate => SortBy::LastUpdatedDate,
            SortByArg::SubmittedDate => SortBy::SubmittedDate,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrderArg {
    Ascending,
    Descending,
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Ascending => SortOrder::Ascending,
            SortOrderArg::Descending => SortOrder::Descending,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Commands::Search(args) if args.debug);
    if cli.verbose || debug {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Providers => list_providers(),
    }
}

fn list_providers() -> Result<()> {
    println!("Available providers:\n");
    for (name, description, vars) in KNOWN_PROVIDERS {
        let needs = if vars.is_empty() {
            "no key required".to_string()
        } else {
            vars.join(", ")
        };
        println!("  {:<11} - {} [{}]", name, description, needs);
    }
    println!();
    println!("Usage: multisearch search \"query\" -p brave,tavily,duckduckgo");
    println!("       multisearch search --id-list 2301.00001 -p arxiv");
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::from_env(),
    };

    let handles = match &args.providers {
        Some(names) => config.select(names, |key| std::env::var(key).ok())?,
        None => config.build()?,
    };
    let search = Search::with_providers(handles);
    let request = build_request(&args, &config);

    if matches!(args.format, OutputFormat::Text) {
        eprintln!("Querying: {}", search.provider_names().join(", "));
    }

    let start = Instant::now();
    let results = search.search(&request).await?;
    let elapsed = start.elapsed().as_millis();

    match args.format {
        OutputFormat::Text => print_text(&args, &results, elapsed),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Compact => {
            for result in &results {
                println!("{}\t{}\t{}", result.provider, result.title, result.url);
            }
        }
    }

    Ok(())
}

/// Layers command-line arguments over the configured defaults.
fn build_request(args: &SearchArgs, config: &SearchConfig) -> SearchRequest {
    let mut request = config
        .apply(SearchRequest::default())
        .with_page(args.page)
        .with_safe_search(args.safe.into())
        .with_kind(args.kind.into());
    if let Some(query) = &args.query {
        request = request.with_query(query.as_str());
    }
    if let Some(ids) = &args.id_list {
        request = request.with_id_list(ids.as_str());
    }
    if let Some(limit) = args.limit {
        request = request.with_max_results(limit);
    }
    if let Some(timeout) = args.timeout {
        request = request.with_timeout(Duration::from_secs(timeout));
    }
    if let Some(language) = &args.language {
        request = request.with_language(language.as_str());
    }
    if let Some(region) = &args.region {
        request = request.with_region(region.as_str());
    }
    if let Some(sort_by) = args.sort_by {
        request = request.with_sort_by(sort_by.into());
    }
    if let Some(sort_order) = args.sort_order {
        request = request.with_sort_order(sort_order.into());
    }
    if args.debug {
        request = request.with_debug(DebugOptions::verbose());
    }

    request
}

fn print_text(args: &SearchArgs, results: &[SearchResult], elapsed_ms: u128) {
    let label = args
        .query
        .as_deref()
        .or(args.id_list.as_deref())
        .unwrap_or_default();
    println!(
        "\nSearch results for \"{}\" ({} results in {}ms):\n",
        label,
        results.len(),
        elapsed_ms
    );

    for (i, result) in results.iter().enumerate() {
        println!("{}. {}", i + 1, result.title);
        println!("   URL: {}", result.url);
        if let Some(snippet) = &result.snippet {
            let mut content: String = snippet.chars().take(150).collect();
            if content.len() < snippet.len() {
                content.push_str("...");
            }
            println!("   {}", content);
        }
        let mut meta = format!("   Provider: {}", result.provider);
        if let Some(domain) = &result.domain {
            meta.push_str(&format!(" | Domain: {}", domain));
        }
        if let Some(date) = &result.published_date {
            meta.push_str(&format!(" | Published: {}", date));
        }
        println!("{}", meta);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> SearchArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Search(args) => args,
            Commands::Providers => panic!("expected search command"),
        }
    }

    #[test]
    fn test_sort_order_without_sort_by() {
        let args = parse(&["multisearch", "search", "q", "-p", "arxiv", "--sort-order", "ascending"]);
        let request = build_request(&args, &SearchConfig::default());
        assert_eq!(request.sort_by, None);
        assert_eq!(request.sort_order, Some(SortOrder::Ascending));
    }

    #[test]
    fn test_sort_flags_absent() {
        let args = parse(&["multisearch", "search", "q"]);
        let request = build_request(&args, &SearchConfig::default());
        assert_eq!(request.sort_by, None);
        assert_eq!(request.sort_order, None);
    }

    #[test]
    fn test_sort_by_and_order() {
        let args = parse(&[
            "multisearch",
            "search",
            "q",
            "--sort-by",
            "submitted-date",
            "--sort-order",
            "descending",
        ]);
        let request = build_request(&args, &SearchConfig::default());
        assert_eq!(request.sort_by, Some(SortBy::SubmittedDate));
        assert_eq!(request.sort_order, Some(SortOrder::Descending));
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = parse(&["multisearch", "search", "q", "-l", "3", "-t", "2", "--page", "2"]);
        let request = build_request(&args, &SearchConfig::default());
        assert_eq!(request.query.as_deref(), Some("q"));
        assert_eq!(request.max_results, 3);
        assert_eq!(request.timeout, Duration::from_secs(2));
        assert_eq!(request.page, 2);
    }
}
