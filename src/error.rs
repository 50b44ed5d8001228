use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for yolokit operations.
///
/// Only fatal conditions live here. Per-file problems met while preparing a
/// dataset are recorded as [`SkipReason`](crate::prepare::SkipReason)s in the
/// report instead.
#[derive(Debug, Error)]
pub enum YolokitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse VOC XML {path}: {message}")]
    VocXmlParse { path: PathBuf, message: String },

    #[error("{kind} directory does not exist: {path}")]
    SourceDirMissing { kind: &'static str, path: PathBuf },

    #[error("No .xml annotation files found in {path}")]
    NoAnnotationFiles { path: PathBuf },

    #[error("No class names discovered in {path}; pass them explicitly with --classes")]
    NoClasses { path: PathBuf },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to parse dataset manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize dataset manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse training config {path}: {source}")]
    TrainConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse YOLO label {path}:{line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to launch {program}: {source}")]
    ExternalSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    ExternalFailed { program: PathBuf, status: ExitStatus },

    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[from] serde_json::Error),
}
