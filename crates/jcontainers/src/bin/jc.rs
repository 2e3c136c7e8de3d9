//! `jc`: inspect and edit container documents from the command line

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jcontainers::{json, path, JsonContext, PluginTable};

#[derive(Parser, Debug)]
#[command(name = "jc", version, about = "Query and edit container documents")]
struct Cli {
    /// JSON file listing plugins in load order: {"plugins": [...]}
    #[arg(long, global = true)]
    plugins: Option<PathBuf>,

    /// Indentation of written documents
    #[arg(long, global = true, default_value_t = jcontainers::context::DEFAULT_INDENT)]
    indent: usize,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value at a path
    Get {
        /// Document to read
        file: PathBuf,
        /// Path such as `.npcs[0].name`; empty for the whole document
        #[arg(default_value = "")]
        path: String,
    },

    /// Store a scalar at a path and rewrite the document
    Set {
        /// Document to edit
        file: PathBuf,
        /// Path to assign
        path: String,
        /// JSON scalar: number, string (quoted), true/false or null
        value: String,
        /// Create missing map keys along the path
        #[arg(short, long)]
        create: bool,
    },

    /// Load a document and write it back out, rebuilding references
    Normalize {
        /// Document to read
        file: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = context(&cli)?;

    match cli.command {
        Command::Get { file, path: target } => {
            let root = json::from_file(&ctx, &file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let Some(item) = path::resolve(&ctx, &root, &target) else {
                bail!("path not found: {target:?}");
            };
            println!("{}", json::print(&ctx, &json::item_to_value(&ctx, &item))?);
        }

        Command::Set {
            file,
            path: target,
            value,
            create,
        } => {
            let root = json::from_file(&ctx, &file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let value: serde_json::Value =
                serde_json::from_str(&value).with_context(|| format!("invalid JSON value {value:?}"))?;
            let Some(item) = json::scalar_item(&ctx, &value) else {
                bail!("only scalars can be assigned, got {}", jcontainers::error::json_type_name(&value));
            };
            if !path::assign(&ctx, &root, &target, item, create) {
                bail!("path not found: {target:?}");
            }
            json::to_file(&ctx, &root, &file)?;
        }

        Command::Normalize { file, output } => {
            let root = json::from_file(&ctx, &file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            match output {
                Some(out) => json::to_file(&ctx, &root, &out)?,
                None => println!("{}", json::to_string(&ctx, &root)?),
            }
        }
    }

    Ok(())
}

fn context(cli: &Cli) -> Result<JsonContext> {
    let plugins = match &cli.plugins {
        Some(file) => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("failed to read plugin list {}", file.display()))?;
            PluginTable::from_json(&text)?
        }
        None => PluginTable::default(),
    };

    Ok(JsonContext::with_plugins(plugins).with_indent(cli.indent))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "jcontainers=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}
