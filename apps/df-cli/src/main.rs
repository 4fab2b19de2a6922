use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use df_cli::{GraphReport, Sketch, SketchError};
use df_editor::{ConfigError, EditorConfig};
use df_expr::ParseError;
use df_graph::GraphError;

#[derive(Parser)]
#[command(name = "df-cli")]
#[command(about = "dagflow CLI - inspect expression graphs and build their scripts", long_about = None)]
struct Cli {
    /// Editor configuration YAML (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show nodes, ports and links of a sketch
    Inspect {
        /// Path to the sketch YAML file
        sketch_path: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the script that computes a node
    Script {
        /// Path to the sketch YAML file
        sketch_path: PathBuf,
        /// Name of the node
        node: String,
    },
    /// Print the free variables of an expression
    Vars {
        expression: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No node named {name:?}")]
    UnknownNode { name: String },
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect { sketch_path, json } => cmd_inspect(&config, &sketch_path, json),
        Commands::Script { sketch_path, node } => cmd_script(&config, &sketch_path, &node),
        Commands::Vars { expression } => cmd_vars(&expression),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<EditorConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Ok(EditorConfig::load(path)?)
        }
        None => Ok(EditorConfig::default()),
    }
}

fn cmd_inspect(config: &EditorConfig, sketch_path: &Path, json: bool) -> CliResult<()> {
    let store = Sketch::load(sketch_path)?.build(config)?;
    let report = GraphReport::of(&store)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_table());
    }
    Ok(())
}

fn cmd_script(config: &EditorConfig, sketch_path: &Path, node: &str) -> CliResult<()> {
    let store = Sketch::load(sketch_path)?.build(config)?;
    let id = store.node_by_name(node).ok_or_else(|| CliError::UnknownNode {
        name: node.to_string(),
    })?;
    print!("{}", store.build_script(id)?);
    Ok(())
}

fn cmd_vars(expression: &str) -> CliResult<()> {
    let vars = df_expr::free_variables(expression)?;
    if vars.is_empty() {
        println!("No free variables");
    } else {
        for var in vars {
            println!("{var}");
        }
    }
    Ok(())
}
