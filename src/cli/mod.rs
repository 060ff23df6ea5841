use std::env;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::resolve::{resolve_config_with_override, ResolvedConfig};
use crate::config::DepgraphConfig;
use crate::core::node::DependencyNode;
use crate::error::{DepgraphError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::factory::{AggregatingGraphFactory, GraphSettings, SimpleGraphFactory};
use crate::graph::ops::find_cycles;
use crate::graph::viz::{DotFormatter, JsonFormatter, TextFormatter};
use crate::resolver::json::{load_reactor, load_tree, single_project};
use crate::style::{StyleConfiguration, StyleResolver};
use crate::util::{output, parallel};

const DEFAULT_GRAPH_NAME: &str = "dependencies";

#[derive(Parser, Debug)]
#[command(name = "depgraph")]
#[command(about = "Dependency graphs from resolved dependency trees", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One graph per resolved dependency tree
    Graph(GraphArgs),
    /// One graph for all modules of a reactor
    Aggregate(AggregateArgs),
    /// Report dependency cycles
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GraphOptions {
    #[arg(long, default_value = "dot")]
    pub format: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "target")]
    pub targets: Vec<String>,
    #[arg(long = "include")]
    pub includes: Vec<String>,
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,
    #[arg(long)]
    pub reduce: bool,
    #[arg(long)]
    pub omit_reachable: bool,
    #[arg(long)]
    pub show_duplicates: bool,
    #[arg(long)]
    pub show_conflicts: bool,
    #[arg(long)]
    pub style: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    #[arg(required = true)]
    pub trees: Vec<PathBuf>,
    #[arg(short = 'j', long, env = "DEPGRAPH_JOBS")]
    pub jobs: Option<usize>,
    #[command(flatten)]
    pub options: GraphOptions,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    pub reactor: PathBuf,
    #[command(flatten)]
    pub options: GraphOptions,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    pub tree: PathBuf,
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Dot,
    Json,
    Text,
}

fn parse_output_format(input: &str) -> Result<OutputFormat> {
    match input.to_ascii_lowercase().as_str() {
        "dot" => Ok(OutputFormat::Dot),
        "json" => Ok(OutputFormat::Json),
        "text" => Ok(OutputFormat::Text),
        _ => Err(DepgraphError::Other(anyhow!(
            "unknown output format '{}'",
            input
        ))),
    }
}

pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    if cli.no_color {
        output::set_color(false);
    }
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_filter = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "depgraph=info,warn",
        _ => "depgraph=debug,info",
    };
    let filter =
        EnvFilter::try_from_env("DEPGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    let format = env::var("DEPGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Graph(args) => handle_graph(args, cli.config),
        Commands::Aggregate(args) => handle_aggregate(args, cli.config),
        Commands::Check(args) => handle_check(args, cli.config),
    }
}

/// Configuration, settings and styles shared by every graph of one invocation.
struct Request {
    config: DepgraphConfig,
    settings: GraphSettings,
    styles: StyleResolver,
}

fn load_request(config_path: Option<PathBuf>, options: &GraphOptions) -> Result<Request> {
    let cwd = env::current_dir()?;
    let resolved: ResolvedConfig = resolve_config_with_override(&cwd, config_path)?;
    match resolved.path.as_ref() {
        Some(path) => debug!(config = %path.display(), "loaded configuration"),
        None => debug!("no configuration file, using defaults"),
    }
    let mut config = resolved.config.clone();
    apply_overrides(&mut config, options);

    // Styles are validated here so a bad rule fails before any traversal.
    let settings = config.graph_settings()?;
    let styles = match options.style.as_ref() {
        Some(style_path) => StyleResolver::new(StyleConfiguration::load(style_path)?)?,
        None => config.style_resolver(resolved.base_dir())?,
    };

    Ok(Request {
        config,
        settings,
        styles,
    })
}

fn apply_overrides(config: &mut DepgraphConfig, options: &GraphOptions) {
    if !options.targets.is_empty() {
        config.filter.targets = Some(options.targets.clone());
    }
    if !options.includes.is_empty() {
        config
            .filter
            .includes
            .get_or_insert_with(Vec::new)
            .extend(options.includes.iter().cloned());
    }
    if !options.excludes.is_empty() {
        config
            .filter
            .excludes
            .get_or_insert_with(Vec::new)
            .extend(options.excludes.iter().cloned());
    }
    if options.reduce {
        config.graph.reduce_edges = Some(true);
    }
    if options.omit_reachable {
        config.graph.omit_reachable_paths = Some(true);
    }
    if options.show_duplicates {
        config.graph.show_duplicates = Some(true);
    }
    if options.show_conflicts {
        config.graph.show_conflicts = Some(true);
    }
    if let Some(name) = options.name.as_ref() {
        config.graph.name = Some(name.clone());
    }
}

fn format_graph(
    builder: &GraphBuilder<DependencyNode>,
    format: OutputFormat,
    styles: &StyleResolver,
    graph_name: &str,
) -> String {
    match format {
        OutputFormat::Dot => builder.format(&DotFormatter::new(styles), graph_name),
        OutputFormat::Json => builder.format(&JsonFormatter, graph_name),
        OutputFormat::Text => builder.format(&TextFormatter, graph_name),
    }
}

fn handle_graph(args: GraphArgs, config_path: Option<PathBuf>) -> Result<()> {
    let format = parse_output_format(&args.options.format)?;
    let request = load_request(config_path, &args.options)?;

    let results = parallel::run_in_parallel(args.trees.clone(), args.jobs, |path| {
        render_tree_file(&path, &request, format)
    });

    let several = args.trees.len() > 1;
    let mut failed = 0;
    for (path, result) in args.trees.iter().zip(results) {
        if several {
            output::graph_header(&path.display().to_string());
        }
        match result {
            Ok(rendered) => print!("{rendered}"),
            Err(err) => {
                failed += 1;
                output::error(&format!("{}: {}", path.display(), err));
            }
        }
    }

    if failed > 0 {
        return Err(DepgraphError::Other(anyhow!(
            "{} of {} graphs failed",
            failed,
            args.trees.len()
        )));
    }
    Ok(())
}

fn render_tree_file(path: &Path, request: &Request, format: OutputFormat) -> Result<String> {
    let tree = load_tree(path)?;
    let (project, resolver) = single_project(tree)?;
    let builder = SimpleGraphFactory::new(&resolver, &request.settings).create_graph(&project)?;
    let graph_name = request
        .config
        .graph
        .name
        .clone()
        .unwrap_or_else(|| project.artifact.coordinates());
    Ok(format_graph(&builder, format, &request.styles, &graph_name))
}

fn handle_aggregate(args: AggregateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let format = parse_output_format(&args.options.format)?;
    let request = load_request(config_path, &args.options)?;

    let reactor = load_reactor(&args.reactor)?;
    let reactor_name = reactor.name.clone();
    let (projects, resolver) = reactor.into_parts();
    info!(projects = projects.len(), "aggregating reactor");

    let builder =
        AggregatingGraphFactory::new(&resolver, &request.settings).create_graph(&projects)?;
    let graph_name = request
        .config
        .graph
        .name
        .clone()
        .or(reactor_name)
        .unwrap_or_else(|| DEFAULT_GRAPH_NAME.to_string());
    print!(
        "{}",
        format_graph(&builder, format, &request.styles, &graph_name)
    );
    Ok(())
}

fn handle_check(args: CheckArgs, config_path: Option<PathBuf>) -> Result<()> {
    let request = load_request(config_path, &GraphOptions::default())?;
    let tree = load_tree(&args.tree)?;
    let (project, resolver) = single_project(tree)?;
    let builder = SimpleGraphFactory::new(&resolver, &request.settings).create_graph(&project)?;

    let definitions = builder.node_definitions();
    let cycles = find_cycles(
        definitions.iter().map(|definition| definition.id.as_str()),
        builder.edges(),
    );

    if args.json {
        let report = serde_json::to_string_pretty(&cycles).map_err(anyhow::Error::from)?;
        println!("{report}");
    } else if cycles.is_empty() {
        output::info("no dependency cycles");
    } else {
        for cycle in &cycles {
            output::warn(&format!("cycle: {}", cycle.join(" -> ")));
        }
    }

    if !cycles.is_empty() {
        return Err(DepgraphError::Other(anyhow!(
            "{} dependency cycle(s) in {}",
            cycles.len(),
            project.artifact.coordinates()
        )));
    }
    Ok(())
}
