//! Video-game sales report CLI
//!
//! Trains the sales forest once and prints its metrics, feature importances
//! and any requested genre/theme drill-downs.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vgsales_core::{FeatureShare, MetricsSummary, PipelineConfig};
use vgsales_trainer::{Drilldown, Pipeline, SalesAnalytics, VERSION};

#[derive(Parser, Debug)]
#[command(name = "vgsales-report")]
#[command(author = "VGSales Contributors")]
#[command(version = VERSION)]
#[command(about = "Random-forest sales report for video-game data", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset CSV path (overrides the configuration)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Seed for both the split and the main forest
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trees in the main forest
    #[arg(long)]
    trees: Option<usize>,

    /// Genre to drill into (repeatable)
    #[arg(long = "genre", value_name = "LABEL")]
    genres: Vec<String>,

    /// Theme to drill into (repeatable)
    #[arg(long = "theme", value_name = "LABEL")]
    themes: Vec<String>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: MetricsSummary,
    breakdown: Vec<FeatureShare>,
    top_features: Vec<String>,
    bottom_features: Vec<String>,
    importances: Vec<(&'a str, f64)>,
    predictions: &'a [f64],
    residuals: Vec<f64>,
    drilldowns: Vec<Drilldown>,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config
        .load_from_env()
        .context("Invalid environment override")?;

    if let Some(dataset) = &args.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(seed) = args.seed {
        config.split.seed = seed;
        config.forest.seed = Some(seed);
    }
    if let Some(trees) = args.trees {
        config.forest.n_trees = trees;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse::<Level>()
            .with_context(|| format!("Invalid log level {:?}", config.logging.level))?
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Video-Game Sales Report v{}", VERSION);
    info!("═══════════════════════════════════════════");

    let analytics = SalesAnalytics::new(config);
    info!("Dataset: {}", analytics.config().dataset.path.display());
    let pipeline = analytics.train().context("Failed to train pipeline")?;

    let mut drilldowns = Vec::with_capacity(args.genres.len() + args.themes.len());
    for genre in &args.genres {
        drilldowns.push(
            pipeline
                .by_genre(genre)
                .with_context(|| format!("Genre drill-down for {genre:?} failed"))?,
        );
    }
    for theme in &args.themes {
        drilldowns.push(
            pipeline
                .by_theme(theme)
                .with_context(|| format!("Theme drill-down for {theme:?} failed"))?,
        );
    }

    if args.json {
        let report = Report {
            summary: pipeline.summary(),
            breakdown: pipeline.feature_importance_breakdown(),
            top_features: pipeline.top_features(),
            bottom_features: pipeline.bottom_features(),
            importances: pipeline.importances(),
            predictions: pipeline.predictions(),
            residuals: pipeline.residuals(),
            drilldowns,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        log_report(pipeline, &drilldowns);
    }

    Ok(())
}

fn log_report(pipeline: &Pipeline, drilldowns: &[Drilldown]) {
    let summary = pipeline.summary();
    let thresholds = &pipeline.config().metrics;
    info!("═══════════════════════════════════════════");
    info!(
        "Test metrics ({} rows, scaled {}):",
        summary.test_rows,
        pipeline.table().target_name()
    );
    info!("  MSE: {:.4}", summary.mse);
    info!("  R²: {:.4}", summary.r_squared);
    info!("  Explained variance: {:.4}", summary.explained_variance);
    info!("  Value range: {:.4}", summary.value_range);
    match summary.error_margin_percent {
        Some(margin) => info!("  Error margin: {:.2}% of the value range", margin),
        None => info!("  Error margin: undefined (zero value range)"),
    }

    let points = pipeline.residual_points();
    if !points.is_empty() {
        let n = points.len() as f64;
        let mean = points.iter().map(|p| p.residual).sum::<f64>() / n;
        let (low, high) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(l, h), p| {
            (l.min(p.residual), h.max(p.residual))
        });
        info!(
            "  Residuals: mean {:.4}, min {:.4}, max {:.4}",
            mean, low, high
        );
        let under = points.iter().filter(|p| p.residual > 0.0).count();
        info!(
            "  {} of {} predictions fall below the true value",
            under,
            points.len()
        );
    }

    info!("Importance breakdown:");
    for share in pipeline.feature_importance_breakdown() {
        info!(
            "  {} accounted for {:.2}% of the variability in sales figures",
            share.name, share.percent
        );
    }
    info!(
        "Top features (> {}): {}",
        thresholds.top_threshold,
        pipeline.top_features().join(", ")
    );
    info!(
        "Bottom features (< {}): {}",
        thresholds.bottom_threshold,
        pipeline.bottom_features().join(", ")
    );

    for drilldown in drilldowns {
        info!("═══════════════════════════════════════════");
        info!(
            "{} ({} rows):",
            drilldown.selected.label(),
            drilldown.rows
        );
        for bucket in &drilldown.buckets {
            info!(
                "  {:<20} actual {:>12.2}  predicted {:>12.2}",
                bucket.label, bucket.mean_actual, bucket.mean_predicted
            );
        }
    }
}
