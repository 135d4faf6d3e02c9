use anyhow::Result;
use clap::{Parser, Subcommand};
use inline_port::commands::{
    import_baseline_command, init_project_command, list_baseline_command, list_runs_command,
    project_info_command, show_failures_command, translate_command, TranslateArgs,
};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Translate C inline-function bodies into C# `unsafe` static methods.
///
/// This CLI is a thin wrapper around `inline-port-core`. All substantive
/// logic lives in the library so it can be tested and reused.
#[derive(Parser, Debug)]
#[command(name = "inline-port", version, about = "C inline function transpiler", long_about = None)]
struct Cli {
    /// Log progress (info level) to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    /// Log per-function pipeline detail (debug level) to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new project at the given root.
    ///
    /// Creates `.inline-port/project.json`, the project database and `generated/`.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show configuration and database counts for an existing project.
    ProjectInfo {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Seed the stability baseline from a previously generated C# file.
    ///
    /// Functions whose body still throws the stub exception are skipped.
    ImportBaseline {
        #[arg(long, default_value = ".")]
        root: String,

        /// Generated source file (relative to the project root unless absolute).
        #[arg(long)]
        file: String,
    },

    /// List stability baseline entries.
    ListBaseline {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Translate a unit manifest and write the generated C# file.
    Translate {
        #[arg(long, default_value = ".")]
        root: String,

        /// Unit manifest (.yaml, .yml or .json), relative to the project root unless absolute.
        #[arg(long)]
        units: String,

        /// Override the configured output file.
        #[arg(long)]
        output: Option<String>,

        /// Worker threads; defaults to the project config value.
        #[arg(long)]
        workers: Option<usize>,

        /// Translate and record the run without writing the file or the baseline.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List recorded translation runs.
    ListRuns {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the failure artifacts recorded for a run.
    ShowFailures {
        #[arg(long, default_value = ".")]
        root: String,

        /// Run id; defaults to the most recent run.
        #[arg(long)]
        run: Option<i64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("inline-port v{}", inline_port_core::version());

    match cli.command {
        Command::InitProject { root, name } => init_project_command(&root, name)?,
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::ImportBaseline { root, file } => import_baseline_command(&root, &file)?,
        Command::ListBaseline { root, json } => list_baseline_command(&root, json)?,
        Command::Translate { root, units, output, workers, dry_run, json } => {
            translate_command(&TranslateArgs { root, units, output, workers, dry_run, json })?
        }
        Command::ListRuns { root, json } => list_runs_command(&root, json)?,
        Command::ShowFailures { root, run, json } => show_failures_command(&root, run, json)?,
    }

    Ok(())
}
