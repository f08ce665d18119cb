//! `animal-classifier` CLI - Tell cats, dogs and pandas apart.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use animal_classifier::{image, Config, Controller, Floor};

/// Classify an image as CAT, DOG or PANDA.
#[derive(Parser, Debug)]
#[command(name = "animal-classifier")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image to classify.
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Model file. Defaults to animals.onnx in the user data directory.
    #[arg(short, long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Download the model from this URL if it is not cached yet.
    #[arg(long, value_name = "URL")]
    model_url: Option<String>,

    /// Pick the largest output even when no output is positive.
    #[arg(long)]
    hardened_argmax: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("animal_classifier={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    if !args.image.exists() {
        anyhow::bail!("Image does not exist: {}", args.image.display());
    }

    let config = Config {
        model_path: args.model.clone(),
        model_url: args.model_url.clone(),
        floor: if args.hardened_argmax {
            Floor::NegInfinity
        } else {
            Floor::Zero
        },
    };
    config.validate().context("Invalid arguments")?;

    // Decode first so a bad image fails before the model is fetched
    let picture = image::load_image(&args.image).context("Failed to load image")?;

    let mut controller = Controller::new(&config);
    controller.select(picture);

    let prediction = controller.predict().context("Failed to classify image")?;

    println!("{prediction}");

    Ok(())
}
