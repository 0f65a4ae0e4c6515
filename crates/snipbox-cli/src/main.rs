//! Snipbox CLI
//!
//! A command-line tool for executing code snippets through the snipbox
//! backends.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snipbox::{Config, EXAMPLE_CONFIG, ExecutionRequest, Runner};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snipbox")]
#[command(about = "A tool for executing code snippets in isolated backends")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: snipbox.toml)
        #[arg(short, long, default_value = "snipbox.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a snippet (from a file or stdin) and print the response as JSON
    Run {
        /// Source file to run (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        source: Option<PathBuf>,

        /// Language tag (e.g., js, python, cpp, wasm)
        #[arg(short, long)]
        language: String,

        /// Request id echoed in the response (default: random)
        #[arg(short, long)]
        id: Option<String>,
    },

    /// List supported language tags
    Languages,

    /// Show the configured toolchains
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Run {
            source,
            language,
            id,
        } => run_snippet(config, source.as_deref(), &language, id).await,
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_snippet(
    config: Config,
    source: Option<&std::path::Path>,
    language: &str,
    id: Option<String>,
) -> Result<()> {
    let code = match source {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .context("failed to read source file")?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let request = ExecutionRequest::new(language, code);

    info!(%language, %id, "running snippet");
    let runner = Runner::new(config);
    let response = runner.run(&id, &request).await;

    // Response goes to stdout as JSON, logs stay on stderr for piping
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn list_languages(config: &Config) {
    println!("Supported language tags:\n");
    println!("  javascript (js)  in-process evaluator");
    println!("  python (py)      in-process evaluator");
    println!("  lua              in-process evaluator");
    println!("  php              degraded (no output capture)");
    println!("  wasm             WebAssembly host, base64 module");
    println!("  zig              WebAssembly host, base64 module");
    println!("  go               TinyGo source build or base64 module");

    let mut toolchains: Vec<_> = config.toolchains.iter().collect();
    toolchains.sort_by_key(|(tag, _)| *tag);
    for (tag, toolchain) in toolchains {
        println!("  {:<16} compiled via {}", tag, toolchain.name);
    }
}

fn show_config(config: &Config) {
    println!("Toolchains configured: {}\n", config.toolchains.len());

    let mut toolchains: Vec<_> = config.toolchains.iter().collect();
    toolchains.sort_by_key(|(tag, _)| *tag);

    for (tag, toolchain) in toolchains {
        println!("[{tag}] {}", toolchain.name);
        println!("  source:   {}", toolchain.source_name);
        println!(
            "  artifact: {} ({:?})",
            toolchain.output_name, toolchain.artifact
        );
        for candidate in &toolchain.candidates {
            println!("  probe:    {}", candidate.probe.join(" "));
        }
        println!();
    }
}

async fn init_config(output: &PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
