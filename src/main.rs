use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sluice::catalog::SourceCatalog;
use sluice::config::Config;
use sluice::crawler::Crawler;
use sluice::harvest::{FeedHarvest, WikiHarvest};
use sluice::scheduler::{CyclicScheduler, Harvest};

#[derive(Parser)]
#[command(
    name = "sluice",
    version,
    about = "Rate-limited harvester forwarding feed and encyclopedia items to a search index",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables still override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every catalog feed on a fixed cycle
    Feeds {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Catalog file replacing the bundled source list
        #[arg(short, long)]
        sources: Option<PathBuf>,
    },

    /// Harvest encyclopedia page summaries
    Wiki {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Language edition, e.g. ja or en
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Print the source catalog
    Sources {
        /// Catalog file replacing the bundled source list
        #[arg(short, long)]
        sources: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Commands::Wiki { lang: Some(lang), .. } = &cli.command {
        config.wiki.lang = lang.clone();
    }
    config.validate().context("Invalid configuration")?;

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Feeds { once, sources } => {
            let path = sources.or_else(|| config.feeds.catalog_path.clone());
            let catalog = SourceCatalog::load(path.as_deref())?;
            let crawler = Crawler::new(&config)?;

            tracing::info!(
                sources = catalog.len(),
                interval_secs = config.http.request_interval_secs,
                endpoint = %config.index.endpoint,
                "Starting feed harvest"
            );

            let harvest = FeedHarvest::new(catalog, &crawler, &config.feeds);
            drive(CyclicScheduler::new(harvest, config.feeds.cycle_sleep()), once).await;
        }

        Commands::Wiki { once, .. } => {
            let crawler = Crawler::new(&config)?;

            tracing::info!(
                lang = %config.wiki.lang,
                interval_secs = config.http.request_interval_secs,
                endpoint = %config.index.endpoint,
                "Starting encyclopedia harvest"
            );

            let mut harvest = WikiHarvest::new(&crawler, &config.wiki);
            harvest.load_categories().await;
            drive(CyclicScheduler::new(harvest, config.wiki.cycle_sleep()), once).await;
        }

        Commands::Sources { sources } => {
            let path = sources.or_else(|| config.feeds.catalog_path.clone());
            let catalog = SourceCatalog::load(path.as_deref())?;
            list_sources(&catalog);
        }
    }

    Ok(())
}

/// Run one cycle, or loop; either way Ctrl-C stops cleanly
async fn drive<H: Harvest>(mut scheduler: CyclicScheduler<H>, once: bool) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt");
                // Dropping the sender would read as a shutdown request
                std::future::pending::<()>().await;
            }
        }
    });

    if once {
        if scheduler.run_once_until(shutdown_rx).await.is_none() {
            tracing::info!("Single cycle interrupted");
        }
        return;
    }

    scheduler.run(shutdown_rx).await;
}

fn list_sources(catalog: &SourceCatalog) {
    println!("{} sources", catalog.len());
    for source in catalog {
        let plugins = if source.plugins.is_empty() {
            String::new()
        } else {
            format!(" [{}]", source.plugins.join(", "))
        };
        println!(
            "  {:<32} {} ({}){}",
            source.name,
            source.url,
            source.effective_tags().join(", "),
            plugins
        );
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        String::from("sluice=debug,info")
    } else {
        format!("sluice={level},warn")
    };
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&default_filter))?;

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
