use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "malachite-bot")]
#[command(author, version, about = "Telegram storefront bot for the Malachite shop", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Export the price sheet to a CSV file and exit
    ExportPrices {
        /// Output path; defaults to PRICES_EXPORT_PATH
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Send a one-off broadcast to every registered user and exit
    Broadcast {
        /// Message text
        #[arg(short, long)]
        message: String,

        /// Optional photo path to attach
        #[arg(short, long)]
        image: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
