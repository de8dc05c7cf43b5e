//! RateWatch CLI
//!
//! Shows the current rate, the trend over a trailing window and related
//! news for a currency pair.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ratewatch_common::{CurrencyPair, DEFAULT_CURRENCIES};
use ratewatch_fx::{FileNewsLookup, FxConfig, PairQuery, RateEngine};

mod interactive;
mod report;

use report::{render, OutputFormat};

/// RateWatch CLI
#[derive(Parser, Debug)]
#[command(name = "ratewatch")]
#[command(about = "Exchange-rate trends from a public rate source")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a single currency pair
    Analyze {
        /// Currency to convert from
        #[arg(short, long, default_value = "USD")]
        from: String,

        /// Currency to convert to
        #[arg(short, long, default_value = "EUR")]
        to: String,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Read pairs from stdin; a blank line repeats the last one
    Interactive {
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// List the default currency codes
    Currencies,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// History window in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Day fetches allowed in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// JSON news document to attach to each analysis
    #[arg(long)]
    news_file: Option<PathBuf>,
}

impl EngineArgs {
    fn config(&self) -> FxConfig {
        let mut config = FxConfig::from_env();
        if let Some(days) = self.days {
            config.window_days = days;
        }
        if let Some(limit) = self.concurrency {
            config.max_concurrency = limit;
        }
        config
    }

    fn build_engine(&self) -> anyhow::Result<RateEngine> {
        let config = self.config();
        if let Err(e) = config.validate() {
            error!(error = %e, "Invalid configuration");
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        }

        let mut engine = RateEngine::new(config)?;
        if let Some(path) = &self.news_file {
            engine = engine.with_news(Arc::new(FileNewsLookup::new(path)));
        }
        Ok(engine)
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Command::Analyze { from, to, engine } => {
            let pair = CurrencyPair::parse(&from, &to)?;
            let rate_engine = engine.build_engine()?;
            let query = PairQuery::new(pair, rate_engine.config().window_days);

            info!(pair = %query.pair, window_days = query.window_days, "Analyzing currency pair");

            let analysis = rate_engine.analyze(&query).await?;
            print!("{}", render(&analysis, engine.format)?);
        }
        Command::Interactive { engine } => {
            let rate_engine = engine.build_engine()?;
            let window_days = rate_engine.config().window_days;
            interactive::run(&rate_engine, window_days, engine.format).await?;
        }
        Command::Currencies => {
            for code in DEFAULT_CURRENCIES {
                println!("{}", code);
            }
        }
    }

    Ok(())
}
