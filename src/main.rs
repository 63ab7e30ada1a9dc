// src/main.rs

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use health_globe_render::aggregation::{aggregate, AggregatedTable};
use health_globe_render::config::RenderConfig;
use health_globe_render::constants::{
    DEFAULT_AGGREGATE_OUTPUT, DEFAULT_GIF_OUTPUT, DEFAULT_HTML_OUTPUT,
};
use health_globe_render::data_input::csv_parser::parse_country_file;
use health_globe_render::export::gif::{render_gif, GifOptions};
use health_globe_render::export::html::write_html;
use health_globe_render::export::select_metrics;
use health_globe_render::geo::geometry::load_geometry;
use health_globe_render::metrics::Metric;
use health_globe_render::{crate_version, Result};

#[derive(Parser)]
#[command(name = "health_globe_render")]
#[command(version = crate_version())]
#[command(
    about = "Rotating choropleth globes of health-workforce and hypertension data",
    long_about = None
)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the per-country means as CSV
    Aggregate {
        /// Input CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV file
        #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_AGGREGATE_OUTPUT)]
        output: PathBuf,
    },

    /// Write an interactive HTML globe
    Html {
        /// Input CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output HTML file
        #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_HTML_OUTPUT)]
        output: PathBuf,

        /// Metric to show (repeatable; several metrics add a dropdown)
        #[arg(short = 'm', long = "metric", value_name = "METRIC")]
        metrics: Vec<Metric>,

        #[command(flatten)]
        animation: AnimationArgs,

        /// Page title (HTML markup allowed)
        #[arg(long)]
        title: Option<String>,

        /// Inline this local plotly.js bundle instead of loading it from the CDN
        #[arg(long, value_name = "FILE")]
        plotly_js: Option<PathBuf>,
    },

    /// Write an animated GIF of the rotating globe
    Gif {
        /// Input CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// GeoJSON FeatureCollection with country outlines
        #[arg(long, value_name = "WORLD.geojson")]
        geometry: PathBuf,

        /// Output GIF file
        #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_GIF_OUTPUT)]
        output: PathBuf,

        /// Metric to show
        #[arg(short = 'm', long = "metric", value_name = "METRIC", default_value = "htn")]
        metric: Metric,

        #[command(flatten)]
        animation: AnimationArgs,

        /// Frame size in pixels, e.g. 900x700
        #[arg(long, value_name = "WxH", value_parser = parse_frame_size)]
        size: Option<(u32, u32)>,

        /// Also save every frame as PNG in this directory
        #[arg(long, value_name = "DIR")]
        frames_dir: Option<PathBuf>,

        /// Skip titles, colorbar ticks and the note (no system fonts needed)
        #[arg(long)]
        no_labels: bool,
    },
}

#[derive(Args)]
struct AnimationArgs {
    /// Rotation step between frames, in degrees
    #[arg(long, value_name = "DEG")]
    step: Option<f64>,

    /// Frame duration in milliseconds
    #[arg(long, value_name = "MS")]
    frame_ms: Option<u32>,
}

impl AnimationArgs {
    fn apply(&self, config: &mut RenderConfig) {
        if let Some(step) = self.step {
            config.animation.step_deg = step;
        }
        if let Some(frame_ms) = self.frame_ms {
            config.animation.frame_ms = frame_ms;
        }
    }
}

fn parse_frame_size(text: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size '{text}': {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_table(input: &Path, config: &RenderConfig) -> Result<AggregatedTable> {
    let parsed = parse_country_file(input, &config.columns)?;
    aggregate(&parsed)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    match cli.command {
        Commands::Aggregate { input, output } => {
            let table = load_table(&input, &config)?;
            table.write_csv(&output)?;
        }
        Commands::Html {
            input,
            output,
            metrics,
            animation,
            title,
            plotly_js,
        } => {
            animation.apply(&mut config);
            if title.is_some() {
                config.title = title;
            }
            config.validate()?;

            let table = load_table(&input, &config)?;
            let selected = select_metrics(&table, &metrics)?;
            write_html(&table, &selected, &config, plotly_js.as_deref(), &output)?;
        }
        Commands::Gif {
            input,
            geometry,
            output,
            metric,
            animation,
            size,
            frames_dir,
            no_labels,
        } => {
            animation.apply(&mut config);
            if let Some((width, height)) = size {
                config.gif.width = width;
                config.gif.height = height;
            }
            if no_labels {
                config.gif.draw_labels = false;
            }
            config.validate()?;

            let table = load_table(&input, &config)?;
            let shapes = load_geometry(&geometry, &config.geometry)?;
            let mut options = GifOptions::from_config(&config, &table, metric, &output);
            options.frames_dir = frames_dir;

            let summary = render_gif(&table, &shapes, metric, &options)?;
            info!(
                "Done: {} frames, {} countries with data, {} without.",
                summary.frames_written, summary.countries_with_data, summary.countries_without_data
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_frame_size() {
        assert_eq!(parse_frame_size("900x700"), Ok((900, 700)));
        assert_eq!(parse_frame_size("120X80"), Ok((120, 80)));
        assert!(parse_frame_size("900").is_err());
        assert!(parse_frame_size("ax700").is_err());
    }

    #[test]
    fn test_html_metrics_repeat() {
        let cli = Cli::try_parse_from([
            "health_globe_render",
            "-v",
            "html",
            "data.csv",
            "-m",
            "htn",
            "--metric",
            "Nurses",
            "--step",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Html {
                metrics, animation, ..
            } => {
                assert_eq!(metrics, vec![Metric::Htn, Metric::Nurses]);
                assert_eq!(animation.step, Some(5.0));
                assert_eq!(animation.frame_ms, None);
            }
            _ => panic!("expected html subcommand"),
        }
    }

    #[test]
    fn test_gif_requires_geometry() {
        assert!(Cli::try_parse_from(["health_globe_render", "gif", "data.csv"]).is_err());
        let cli = Cli::try_parse_from([
            "health_globe_render",
            "gif",
            "data.csv",
            "--geometry",
            "world.geojson",
            "--size",
            "200x150",
            "--no-labels",
        ])
        .unwrap();
        match cli.command {
            Commands::Gif {
                metric,
                size,
                no_labels,
                output,
                ..
            } => {
                assert_eq!(metric, Metric::Htn);
                assert_eq!(size, Some((200, 150)));
                assert!(no_labels);
                assert_eq!(output, PathBuf::from(DEFAULT_GIF_OUTPUT));
            }
            _ => panic!("expected gif subcommand"),
        }
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        assert!(Cli::try_parse_from(["health_globe_render", "html", "data.csv", "-m", "dentists"])
            .is_err());
    }
}
