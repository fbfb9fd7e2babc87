use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "civic-triage")]
#[command(
    author,
    version,
    about = "Route civic complaints to a department and priority"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine config file (YAML); defaults apply when omitted
    #[arg(short, long, global = true, env = "CIVIC_TRIAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the dataset and cached model artifacts
    #[arg(long, global = true, env = "CIVIC_TRIAGE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the synthetic training dataset
    GenerateDataset {
        /// Rows per (department, priority) cell
        #[arg(long)]
        samples_per_category: Option<usize>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output path (defaults to the configured dataset file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print row counts and label balance of a dataset
    InspectDataset {
        /// Dataset path (defaults to the configured dataset file)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Train the classifier and write the model cache
    Train {
        /// Retrain even if a cached model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Route a single complaint and print the prediction as JSON
    Predict {
        /// Complaint text
        text: String,

        /// Minimum model probability for accepting the model's department
        #[arg(short, long)]
        threshold: Option<f32>,
    },

    /// Run the built-in acceptance scenarios
    Evaluate {
        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },
}
