use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_cli::commands;
use triage_cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = commands::load_config(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::GenerateDataset {
            samples_per_category,
            seed,
            output,
        } => commands::generate_dataset(config, samples_per_category, seed, output)?,

        Commands::InspectDataset { path, json } => commands::inspect_dataset(&config, path, json)?,

        Commands::Train { force } => commands::train(&config, force)?,

        Commands::Predict { text, threshold } => commands::predict(&config, &text, threshold)?,

        Commands::Evaluate { json } => commands::run_evaluation(&config, json)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "civic_triage=debug,triage_cli=debug,triage_classifiers=debug"
    } else {
        "civic_triage=info,triage_cli=info,triage_classifiers=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
