use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsmith::cli::commands::analyze::AnalyzeOptions;
use docsmith::cli::commands::batch::BatchOptions;

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(
    version,
    about = "AI-driven repository documentation generator with batch merge-request publishing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analysis tasks against a local repository
    Analyze {
        #[arg(long, default_value = ".", help = "Path to the repository")]
        repo_path: PathBuf,

        #[arg(long, help = "Exclude code structure analysis")]
        exclude_code_structure: bool,
        #[arg(long, help = "Exclude dependencies analysis")]
        exclude_dependencies: bool,
        #[arg(long, help = "Exclude data flow analysis")]
        exclude_data_flow: bool,
        #[arg(long, help = "Exclude request flow analysis")]
        exclude_request_flow: bool,
        #[arg(long, help = "Exclude API surface analysis")]
        exclude_api_analysis: bool,
    },

    /// Synthesize a README.md from existing analysis artifacts
    Document {
        #[arg(long, default_value = ".", help = "Path to the repository")]
        repo_path: PathBuf,

        #[arg(long, help = "Use the existing README as context")]
        use_existing_readme: bool,
    },

    /// Analyze every eligible repository of a registry group and open
    /// merge requests with the results
    Batch {
        #[arg(long, help = "Registry group whose projects are candidates")]
        group_id: Option<u64>,

        #[arg(long, help = "Working root for temporary clones")]
        work_dir: Option<PathBuf>,

        #[arg(long, help = "Skip candidates with no activity in this many days")]
        recency_days: Option<i64>,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rt = Runtime::new()?;

    match cli.command {
        Commands::Analyze {
            repo_path,
            exclude_code_structure,
            exclude_dependencies,
            exclude_data_flow,
            exclude_request_flow,
            exclude_api_analysis,
        } => {
            rt.block_on(docsmith::cli::commands::analyze::run(
                &repo_path,
                AnalyzeOptions {
                    exclude_code_structure,
                    exclude_dependencies,
                    exclude_data_flow,
                    exclude_request_flow,
                    exclude_api_analysis,
                },
            ))?;
        }
        Commands::Document {
            repo_path,
            use_existing_readme,
        } => {
            rt.block_on(docsmith::cli::commands::document::run(
                &repo_path,
                use_existing_readme,
            ))?;
        }
        Commands::Batch {
            group_id,
            work_dir,
            recency_days,
        } => {
            rt.block_on(docsmith::cli::commands::batch::run(BatchOptions {
                group_id,
                work_dir,
                recency_days,
            }))?;
        }
    }

    Ok(())
}
