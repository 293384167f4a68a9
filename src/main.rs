//! CLI for post impact analysis
//!
//! Usage:
//! ```bash
//! cargo run -- --help
//! cargo run -- clean --posts data/elon_tweets.csv
//! cargo run -- impact --posts data/elon_tweets.csv --prices data/DOGE-USD.csv --days 3
//! cargo run -- charts --posts data/elon_tweets.csv --asset DOGE=data/DOGE-USD.csv --asset BTC=data/BTC-USD.csv
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use tweet_impact::{
    charts::{did, did_differences, scaled_prices, standardized_prices},
    nlp::hashtag_counts,
    utils::load_config,
    AnalysisConfig, DataLoader, ImpactAligner, ImpactTable, Post, PriceBar, StopWords,
    TextNormalizer,
};

#[derive(Parser)]
#[command(name = "tweet_impact")]
#[command(version = "0.1.0")]
#[command(about = "Check whether crypto posts are followed by price moves", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (json, toml or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a post corpus and list its hashtags
    Clean {
        /// Post CSV (id, tweet, date)
        #[arg(long)]
        posts: PathBuf,

        /// Number of cleaned posts to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Number of hashtags to show
        #[arg(long, default_value = "10")]
        hashtags: usize,
    },

    /// Rank post dates by the price move that followed them
    Impact {
        /// Post CSV (id, tweet, date)
        #[arg(long)]
        posts: PathBuf,

        /// Price CSV (Date, Open, Close, High)
        #[arg(long)]
        prices: PathBuf,

        /// Days averaged after each post
        #[arg(short, long)]
        days: Option<u32>,

        /// Use posts that do not mention the keywords
        #[arg(short, long)]
        invert: bool,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Write the full table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sparklines, standardized prices and difference-in-differences for several assets
    Charts {
        /// Post CSV (id, tweet, date)
        #[arg(long)]
        posts: PathBuf,

        /// Asset price CSV as NAME=path; the first asset is also compared with off-topic posts
        #[arg(short, long = "asset", value_parser = parse_asset, required = true)]
        assets: Vec<(String, PathBuf)>,

        /// Days averaged after each post
        #[arg(short, long)]
        days: Option<u32>,

        /// Subtitle for the standardized price chart
        #[arg(long, default_value = " ")]
        subtitle: String,
    },
}

fn parse_asset(raw: &str) -> std::result::Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=path, got {:?}", raw)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => AnalysisConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    // Logging setup
    let log_level = match config.logging.level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Clean { posts, limit, hashtags } => {
            run_clean(&config, &posts, limit, hashtags)?;
        }
        Commands::Impact { posts, prices, days, invert, limit, output } => {
            if let Some(days) = days {
                config.window_days = days;
            }
            config.invert_filter |= invert;
            run_impact(&config, &posts, &prices, limit, output.as_deref())?;
        }
        Commands::Charts { posts, assets, days, subtitle } => {
            if let Some(days) = days {
                config.window_days = days;
            }
            run_charts(&config, &posts, &assets, &subtitle)?;
        }
    }

    Ok(())
}

fn load_posts(config: &AnalysisConfig, path: &Path) -> Result<Vec<Post>> {
    DataLoader::new()
        .with_url_template(config.url_template.clone())
        .load_posts(path)
        .with_context(|| format!("Failed to load posts: {:?}", path))
}

fn load_prices(path: &Path) -> Result<Vec<PriceBar>> {
    DataLoader::load_prices(path).with_context(|| format!("Failed to load prices: {:?}", path))
}

fn run_clean(config: &AnalysisConfig, path: &Path, limit: usize, top_hashtags: usize) -> Result<()> {
    let posts = load_posts(config, path)?;
    let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();

    let stop_words = StopWords::english_french();
    let cleaned = TextNormalizer::new(&stop_words).clean(&texts);
    info!("{} of {} posts left after cleaning", cleaned.len(), posts.len());

    println!("\nCleaned posts ({} of {})\n", cleaned.len(), posts.len());
    for post in cleaned.iter().take(limit) {
        println!("  {}", post.tidier);
    }

    let hashtags = hashtag_counts(&texts);
    if !hashtags.is_empty() {
        println!("\nTop hashtags\n");
        for (tag, count) in hashtags.iter().take(top_hashtags) {
            println!("  #{:<20} {}", tag, count);
        }
    }

    Ok(())
}

fn run_impact(
    config: &AnalysisConfig,
    posts_path: &Path,
    prices_path: &Path,
    limit: usize,
    output: Option<&Path>,
) -> Result<()> {
    let posts = load_posts(config, posts_path)?;
    let prices = load_prices(prices_path)?;

    let table = ImpactAligner::from_config(config).align(&posts, &prices)?;

    let partition = if config.invert_filter { "not mentioning" } else { "mentioning" };
    println!(
        "\nPosts {} {:?}, {}-day window: {} dates\n",
        partition,
        config.keywords,
        config.window_days,
        table.len()
    );
    print!("{}", ImpactTable::new(table.top(limit).to_vec()));

    if let Some(means) = table.scaled_means() {
        println!(
            "\nMean standardized: before {:.3}, after {:.3}, difference {:.3}",
            means.before, means.after, means.differ
        );
    }

    if let Some(path) = output {
        DataLoader::save_impact_table(&table, path)
            .with_context(|| format!("Failed to write impact table: {:?}", path))?;
        println!("\nSaved {} rows to {:?}", table.len(), path);
    }

    Ok(())
}

fn run_charts(
    config: &AnalysisConfig,
    posts_path: &Path,
    assets: &[(String, PathBuf)],
    subtitle: &str,
) -> Result<()> {
    let posts = load_posts(config, posts_path)?;
    let prices: Vec<(String, Vec<PriceBar>)> = assets
        .iter()
        .map(|(name, path)| Ok((name.clone(), load_prices(path)?)))
        .collect::<Result<_>>()?;

    println!();
    for (name, bars) in &prices {
        println!("{}", scaled_prices(bars, name, &config.palette, &config.chart)?);
    }

    let series: Vec<(&str, &[PriceBar])> = prices
        .iter()
        .map(|(name, bars)| (name.as_str(), bars.as_slice()))
        .collect();
    println!("{}", standardized_prices(&series, &config.palette, &config.chart, subtitle)?);

    let aligner = ImpactAligner::from_config(config);
    let mut groups: Vec<(String, ImpactTable)> = Vec::with_capacity(prices.len() + 1);
    for (name, bars) in &prices {
        groups.push((name.clone(), aligner.align(&posts, bars)?));
    }

    if let Some((name, bars)) = prices.first() {
        let other = format!("non {}", name);
        if config.palette.color(&other).is_ok() {
            let inverted = aligner.clone().inverted(!aligner.filter().is_inverted());
            groups.push((other, inverted.align(&posts, bars)?));
        } else {
            let known: Vec<&str> = config.palette.names().collect();
            warn!(
                "No palette color for {:?} (palette has {:?}), skipping the off-topic group",
                other, known
            );
        }
    }

    let keyword = config.keywords.last().map(String::as_str).unwrap_or("keyword");
    let tables: Vec<(&str, &ImpactTable)> = groups
        .iter()
        .map(|(name, table)| (name.as_str(), table))
        .collect();
    println!("{}", did(&tables, &config.palette, keyword)?);
    println!("{}", did_differences(&tables, &config.palette, keyword)?);

    Ok(())
}
