use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use forecast_service::batch::read_meal_requests_from_path;
use forecast_service::export::write_records_csv;
use forecast_service::{
    ForecastService, MealComposition, MealToWasteOutput, MetricCategory, OutputMode,
    RestaurantKey, ServiceConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Forecast restaurant receipts, occupancy, biowaste and meal mix, and
/// estimate waste and CO2 for a planned menu.
#[derive(Parser)]
#[command(name = "fwo-forecast", author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the model artifacts (overrides config and FWO_MODEL_ROOT)
    #[arg(long, global = true)]
    model_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

/// Number of portions per meal type
#[derive(Args)]
struct MealArgs {
    #[arg(long, default_value_t = 0.0)]
    fish: f64,
    #[arg(long, default_value_t = 0.0)]
    chicken: f64,
    #[arg(long, default_value_t = 0.0)]
    vegetarian: f64,
    #[arg(long, default_value_t = 0.0)]
    meat: f64,
    #[arg(long, default_value_t = 0.0)]
    vegan: f64,
}

impl MealArgs {
    fn composition(&self) -> forecast_service::Result<MealComposition> {
        MealComposition::new(self.fish, self.chicken, self.vegetarian, self.meat, self.vegan)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast a time-series category for every restaurant
    Series {
        /// receipt, occupancy, biowaste or meal
        #[arg(long)]
        category: MetricCategory,

        /// Horizon in days (nine hourly steps per day for receipt and occupancy)
        #[arg(long)]
        days: usize,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict waste per customer for a menu on a given business day
    Waste {
        #[arg(long)]
        restaurant: RestaurantKey,

        /// Target date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        #[command(flatten)]
        meals: MealArgs,

        /// Write the SVG summary here instead of printing numbers
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Predict the CO2 footprint of a menu
    Co2 {
        #[arg(long)]
        restaurant: RestaurantKey,

        #[command(flatten)]
        meals: MealArgs,
    },

    /// Run meal requests from a CSV file
    ///
    /// Columns: restaurant,date,fish,chicken,vegetarian,meat,vegan. Rows with
    /// an empty date only get a CO2 estimate.
    Batch {
        #[arg(long)]
        input: PathBuf,

        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only results.
    let level = cli.verbose.log_level_filter().to_string().to_lowercase();
    let filter = EnvFilter::new(format!("warn,forecast_service={level},fwo_forecast={level}"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServiceConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(root) = cli.model_root {
        config.model_root = root;
    }
    let service = ForecastService::from_config(config).context("loading models")?;

    match cli.command {
        Commands::Series {
            category,
            days,
            format,
            output,
        } => {
            let records = service.forecast_series(category, days)?;
            let mut writer = open_output(output.as_ref())?;
            match format {
                Format::Json => {
                    serde_json::to_writer_pretty(&mut writer, &records)?;
                    writeln!(writer)?;
                }
                Format::Csv => write_records_csv(&records, &mut writer)?,
            }
            writer.flush()?;
        }
        Commands::Waste {
            restaurant,
            date,
            meals,
            image,
        } => {
            let mode = if image.is_some() {
                OutputMode::Image
            } else {
                OutputMode::Numeric
            };
            let output =
                service.forecast_meal_to_waste(restaurant, &meals.composition()?, &date, mode)?;

            match (output, image) {
                (MealToWasteOutput::Image(rendered), Some(path)) => {
                    std::fs::write(&path, &rendered.bytes)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), content_type = rendered.content_type, "wrote summary");
                }
                (MealToWasteOutput::Numeric(result), _) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                (MealToWasteOutput::Image(_), None) => {
                    anyhow::bail!("image output requested without a path")
                }
            }
        }
        Commands::Co2 { restaurant, meals } => {
            let prediction = service.forecast_meal_to_co2(restaurant, &meals.composition()?)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Commands::Batch { input, output } => {
            let rows = read_meal_requests_from_path(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let outcomes = service.run_batch(&rows);
            let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
            info!(rows = outcomes.len(), failed, "batch finished");

            let mut writer = open_output(output.as_ref())?;
            serde_json::to_writer_pretty(&mut writer, &outcomes)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}
