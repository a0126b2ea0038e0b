mod calendar;
mod console;
mod converter;
mod fetch;
mod parser;
mod ratings;
mod sentiment;

use std::future::Future;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "market_pulse", about = "Console pollers for analyst ratings, ES/SPX prices and market sentiment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the analyst upgrades/downgrades calendar
    Ratings {
        /// Calendar page to scrape
        #[arg(long, default_value = ratings::RATINGS_URL)]
        url: String,
        /// Seconds between refreshes
        #[arg(short, long, default_value = "1500")]
        interval: u64,
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
        /// Print the sectioned records as JSON instead of trace lines
        #[arg(long)]
        json: bool,
    },
    /// Convert between ES futures and SPX index prices (live ES bid when no value is given)
    Convert {
        /// ES value to convert to SPX
        #[arg(long, conflicts_with = "spx")]
        es: Option<f64>,
        /// SPX value to convert to ES
        #[arg(long)]
        spx: Option<f64>,
    },
    /// Poll the Fear & Greed index and today's economic calendar
    Sentiment {
        /// Seconds between refreshes
        #[arg(short, long, default_value = "60")]
        interval: u64,
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = fetch::client()?;
    let client = &client;

    match cli.command {
        Commands::Ratings {
            url,
            interval,
            once,
            json,
        } => {
            let url = url.as_str();
            poll(Duration::from_secs(interval), once, move || {
                ratings::run_cycle(client, url, json)
            })
            .await
        }
        Commands::Convert { es, spx } => converter::run(client, es, spx).await,
        Commands::Sentiment { interval, once } => {
            poll(Duration::from_secs(interval), once, move || {
                sentiment::run_cycle(client)
            })
            .await
        }
    }
}

/// Run `cycle` forever with a fixed pause between runs. A failed cycle is
/// logged and the loop carries on; with `once` its error is returned instead.
async fn poll<F, Fut>(interval: Duration, once: bool, mut cycle: F) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    if once {
        return cycle().await;
    }

    loop {
        console::clear();
        if let Err(e) = cycle().await {
            error!("Cycle failed: {:#}", e);
        }
        console::countdown(interval).await;
    }
}
