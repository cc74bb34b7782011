use clap::Parser;
use slack_support_tracker::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Track {
            support_handle,
            output,
            final_output,
            min_date,
            max_date,
        } => slack_support_tracker::commands::run_track(
            &support_handle,
            &output,
            &final_output,
            min_date,
            max_date,
        ),
        Commands::Finalize { input, output } => {
            slack_support_tracker::commands::run_finalize(&input, &output)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
