use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slack-support-tracker")]
#[command(about = "Track support requests raised against a Slack user group. \
Your Slack token should be saved in the SLACK_TOKEN environment variable.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect support requests and save them to CSV
    Track {
        /// The support handle (don't include '@')
        #[arg(short, long)]
        support_handle: String,

        /// Path to save a CSV of support request information
        #[arg(short, long, default_value = "support_requests.csv")]
        output: String,

        /// Path to save the curated support request report
        #[arg(short, long, default_value = "final_support_requests.csv")]
        final_output: String,

        /// Earliest date to return messages from (YYYY-MM-DD)
        #[arg(long)]
        min_date: Option<String>,

        /// Latest date to return messages from (YYYY-MM-DD)
        #[arg(long)]
        max_date: Option<String>,
    },

    /// Rebuild the curated report from a saved support request CSV
    Finalize {
        /// Support request CSV written by `track`
        #[arg(short, long, default_value = "support_requests.csv")]
        input: String,

        /// Output CSV path
        #[arg(short, long, default_value = "final_support_requests.csv")]
        output: String,
    },
}
