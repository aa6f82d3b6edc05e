//! copycat CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "copycat", version, about = "Cheating-cluster review for course submissions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config
    Init,

    /// Check the config against the corpus
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Unpack each student's newest submission
    Extract {
        /// Only this assignment (default: all configured)
        #[arg(long)]
        assignment: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Group detector matches into clusters and write the cheating report
    Cluster {
        /// Assignment name
        #[arg(long)]
        assignment: String,

        /// Candidate groups JSON produced by the similarity detector
        #[arg(long)]
        candidates: PathBuf,

        /// Report filename under the assignment's output directory
        /// (default: clusters.json)
        #[arg(long, conflicts_with = "file")]
        output: Option<String>,

        /// Name the report after this source file, e.g. main.c -> main_c_
        #[arg(long)]
        file: Option<String>,

        /// Allow two-person collaboration even if the config does not
        #[arg(long)]
        allow_partners: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record a reviewer's verdict on one stored cluster
    Evaluate {
        /// Assignment name
        #[arg(long)]
        assignment: String,

        /// Report filename under the assignment's output directory
        #[arg(long, default_value = "clusters.json")]
        report: String,

        /// Position of the cluster in the report, starting at 0
        #[arg(long)]
        index: usize,

        /// cheating or clear
        #[arg(long, value_parser = ["cheating", "clear"])]
        verdict: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize every stored report
    Analyze {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the flagged clusters naming a student
    Student {
        /// Student identifier
        id: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("copycat=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Extract { assignment, config } => {
            commands::extract::execute(assignment, config).await
        }
        Commands::Cluster {
            assignment,
            candidates,
            output,
            file,
            allow_partners,
            config,
        } => {
            let output = match (output, file) {
                (Some(output), _) => output,
                (None, Some(file)) => copycat_corpus::make_filename_safe(&file),
                (None, None) => "clusters.json".to_string(),
            };
            commands::cluster::execute(assignment, candidates, output, allow_partners, config)
        }
        Commands::Evaluate {
            assignment,
            report,
            index,
            verdict,
            config,
        } => commands::evaluate::execute(assignment, report, index, verdict, config),
        Commands::Analyze { format, config } => commands::analyze::execute(format, config),
        Commands::Student { id, config } => commands::student::execute(id, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
