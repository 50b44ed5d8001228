//! Yolokit: Pascal VOC to YOLO dataset preparation, plus training and
//! prediction through the Ultralytics `yolo` tool.
//!
//! # Modules
//!
//! - [`ir`]: Annotation and label types, VOC XML reading, YOLO label and
//!   manifest I/O
//! - [`classes`]: Class registry and class discovery
//! - [`conversion`]: VOC annotation to YOLO label conversion
//! - [`prepare`]: The dataset preparation driver and its report
//! - [`external`]: Spawning the `yolo` tool
//! - [`train`] and [`predict`]: The two tasks delegated to it
//! - [`error`]: Error types for yolokit operations

pub mod classes;
pub mod conversion;
pub mod error;
pub mod external;
pub mod ir;
pub mod predict;
pub mod prepare;
pub mod train;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::YolokitError;

use external::{ProcessEnv, YoloCli, DEFAULT_YOLO_BIN};

/// The yolokit CLI application.
#[derive(Parser)]
#[command(name = "yolokit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a VOC dataset into a YOLO train/val layout.
    Prepare(PrepareArgs),
    /// Train a detector with the `yolo` tool.
    Train(TrainArgs),
    /// Run a trained detector on one image.
    Predict(PredictArgs),
}

/// How a report is printed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    /// Source root containing `images/` and `annotations/`.
    #[arg(long, env = "YOLOKIT_SOURCE")]
    source: PathBuf,

    /// Output root for `train/`, `val/` and `data.yaml`.
    #[arg(long, env = "YOLOKIT_OUTPUT")]
    output: PathBuf,

    /// Seed for the train/val shuffle.
    #[arg(long, default_value_t = prepare::DEFAULT_SEED)]
    seed: u64,

    /// Fraction of files assigned to the training split.
    #[arg(long, default_value_t = prepare::DEFAULT_TRAIN_RATIO)]
    train_ratio: f64,

    /// Annotation files read to discover class names (0 reads all).
    #[arg(long, default_value_t = classes::DEFAULT_SAMPLE_LIMIT)]
    class_sample_limit: usize,

    /// Comma-separated class names; skips discovery.
    #[arg(long, use_value_delimiter = true)]
    classes: Vec<String>,

    /// Log progress every N files (0 disables).
    #[arg(long, default_value_t = prepare::DEFAULT_PROGRESS_EVERY)]
    progress_every: usize,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Options shared by tasks that spawn the `yolo` tool.
#[derive(clap::Args)]
struct YoloBinArgs {
    /// The `yolo` executable to run.
    #[arg(long, env = "YOLOKIT_YOLO_BIN", default_value = DEFAULT_YOLO_BIN)]
    yolo_bin: PathBuf,

    /// Set KMP_DUPLICATE_LIB_OK=TRUE for the spawned process.
    #[arg(long)]
    allow_duplicate_openmp: bool,
}

impl YoloBinArgs {
    fn runner(&self) -> YoloCli {
        let env = ProcessEnv::new().with_duplicate_openmp(self.allow_duplicate_openmp);
        YoloCli::new(&self.yolo_bin, env)
    }
}

/// Arguments for the train subcommand.
#[derive(clap::Args)]
struct TrainArgs {
    /// Pretrained checkpoint to start from.
    #[arg(long, env = "YOLOKIT_MODEL")]
    model: Option<PathBuf>,

    /// Dataset manifest written by `prepare`.
    #[arg(long, env = "YOLOKIT_DATA")]
    data: Option<PathBuf>,

    /// YAML file overriding the default hyperparameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of training epochs.
    #[arg(long)]
    epochs: Option<u32>,

    /// Square input size in pixels.
    #[arg(long)]
    imgsz: Option<u32>,

    /// Images per batch.
    #[arg(long)]
    batch: Option<u32>,

    /// Run name under the tool's output directory.
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    yolo: YoloBinArgs,
}

/// Arguments for the predict subcommand.
#[derive(clap::Args)]
struct PredictArgs {
    /// Trained checkpoint.
    #[arg(long, env = "YOLOKIT_MODEL")]
    model: PathBuf,

    /// Image to run detection on.
    #[arg(long)]
    image: PathBuf,

    /// Dataset manifest used to name classes.
    #[arg(long, env = "YOLOKIT_DATA")]
    data: Option<PathBuf>,

    /// Directory the tool writes runs into.
    #[arg(long, default_value = predict::DEFAULT_PROJECT_DIR)]
    project: PathBuf,

    /// Run name under the project directory.
    #[arg(long, default_value = predict::DEFAULT_RUN_NAME)]
    name: String,

    /// Minimum confidence for a detection.
    #[arg(long, default_value_t = predict::DEFAULT_CONFIDENCE)]
    conf: f64,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    #[command(flatten)]
    yolo: YoloBinArgs,
}

/// Run the yolokit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), YolokitError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Prepare(args)) => run_prepare(args),
        Some(Commands::Train(args)) => run_train(args),
        Some(Commands::Predict(args)) => run_predict(args),
        None => {
            println!("yolokit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("VOC to YOLO dataset preparation, training and prediction.");
            println!();
            println!("Run 'yolokit --help' for usage information.");
            Ok(())
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<(), YolokitError> {
    let opts = prepare::PrepareOptions {
        source_dir: args.source,
        output_dir: args.output,
        seed: args.seed,
        train_ratio: args.train_ratio,
        class_sample_limit: args.class_sample_limit,
        classes: args.classes,
        progress_every: args.progress_every,
    };

    let report = prepare::prepare_dataset(&opts)?;
    print_report(&report, args.report)
}

fn run_train(args: TrainArgs) -> Result<(), YolokitError> {
    let mut config = match &args.config {
        Some(path) => train::TrainConfig::from_yaml_file(path)?,
        None => train::TrainConfig::default(),
    };

    if args.model.is_some() {
        config.model = args.model;
    }
    if args.data.is_some() {
        config.data = args.data;
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(imgsz) = args.imgsz {
        config.imgsz = imgsz;
    }
    if let Some(batch) = args.batch {
        config.batch = batch;
    }
    if let Some(name) = args.name {
        config.name = name;
    }

    train::run_training(&args.yolo.runner(), &config)?;
    println!("Training run '{}' finished", config.name);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<(), YolokitError> {
    let opts = predict::PredictOptions {
        model: args.model,
        image: args.image,
        data: args.data,
        project: args.project,
        name: args.name,
        conf: args.conf,
    };

    let report = predict::run_prediction(&args.yolo.runner(), &opts)?;
    print_report(&report, args.report)
}

fn print_report<R>(report: &R, format: ReportFormat) -> Result<(), YolokitError>
where
    R: Serialize + std::fmt::Display,
{
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => print!("{report}"),
    }
    Ok(())
}
