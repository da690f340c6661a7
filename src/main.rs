use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toonview::config::Config;
use toonview::crawler::Crawler;
use toonview::error::{Error, ToonviewErrorTrait};

#[derive(Parser)]
#[command(
    name = "toonview",
    version,
    about = "Browse Naver webtoons: series, episode listings, strip images and best comments",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a series' title and thumbnail size
    Series {
        /// Series id (`titleId`)
        id: u32,
    },

    /// List a series' episodes, newest first
    Episodes {
        /// Series id (`titleId`)
        id: u32,

        /// Number of "load more" rounds
        #[arg(short, long, default_value = "1")]
        loads: u32,
    },

    /// List the strip image URLs of an episode
    Images {
        /// Series id (`titleId`)
        id: u32,

        /// Episode number (`no`)
        no: u32,

        /// Download the images as well
        #[arg(long, default_value = "false")]
        fetch: bool,

        /// Directory to save downloaded images into
        #[arg(short, long, requires = "fetch")]
        out: Option<PathBuf>,
    },

    /// Show the best comments of an episode
    Comments {
        /// Series id (`titleId`)
        id: u32,

        /// Episode number (`no`)
        no: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging.level, cli.verbose)?;

    let crawler = Crawler::from_config(config)?;

    // Ctrl-C cancels whatever is in flight
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling");
                cancel.cancel();
            }
        });
    }

    let outcome = match cli.command {
        Commands::Series { id } => series(&crawler, id).await,
        Commands::Episodes { id, loads } => episodes(&crawler, id, loads, &cancel).await,
        Commands::Images { id, no, fetch, out } => {
            images(&crawler, id, no, fetch, out, &cancel).await
        }
        Commands::Comments { id, no } => comments(&crawler, id, no).await,
    };

    if let Err(e) = &outcome {
        tracing::error!(
            category = ?e.category(),
            state = e.user_state().label(),
            error = %e,
            "Command failed"
        );
    }

    outcome.map_err(anyhow::Error::from)
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("toonview=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("toonview={level},warn"))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("toonview=info,warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
    }

    Ok(())
}

async fn series(crawler: &Crawler, id: u32) -> Result<(), Error> {
    let series = crawler.load_series(id).await?;

    println!("{} ({})", series.title, series.series_id);
    println!("  Thumbnail: {} bytes", series.thumbnail.len());
    Ok(())
}

async fn episodes(
    crawler: &Crawler,
    id: u32,
    loads: u32,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    for _ in 0..loads.max(1) {
        let report = crawler.load_more_episodes(id, cancel).await?;
        if report.exhausted {
            break;
        }
    }

    let episodes = crawler.episodes(id).await;
    for episode in &episodes {
        println!("{:>5}  {}", episode.episode_index, episode.title);
    }
    println!("{} episodes", episodes.len());
    Ok(())
}

async fn images(
    crawler: &Crawler,
    id: u32,
    no: u32,
    fetch: bool,
    out: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let urls = crawler.episode_images(id, no).await?;

    if !fetch {
        for url in &urls {
            println!("{url}");
        }
        return Ok(());
    }

    if let Some(dir) = &out {
        tokio::fs::create_dir_all(dir).await?;
    }

    let results = crawler.fetch_images(&urls, cancel).await?;
    for (n, (url, result)) in urls.iter().zip(results).enumerate() {
        match result {
            Ok(bytes) => {
                println!("{url}  {} bytes", bytes.len());
                if let Some(dir) = &out {
                    let path = dir.join(format!("{id}_{no}_{n:03}.jpg"));
                    tokio::fs::write(&path, &bytes).await?;
                }
            }
            Err(e) => println!("{url}  failed: {e}"),
        }
    }
    Ok(())
}

async fn comments(crawler: &Crawler, id: u32, no: u32) -> Result<(), Error> {
    let comments = crawler.best_comments(id, no).await?;

    for comment in &comments {
        println!("{}: {}", comment.user_name, comment.contents);
    }
    if comments.is_empty() {
        println!("No best comments");
    }
    Ok(())
}
