//! Single-image inference through the external `yolo` tool.
//!
//! The tool is asked to save an annotated copy of the image and a text file
//! of `cls cx cy w h conf` rows. The rows are read back and turned into
//! pixel-space [`Detection`]s.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::YolokitError;
use crate::external::{kv, py_bool, TaskRunner};
use crate::ir::io_yolo::{self, LABEL_EXTENSION};
use crate::ir::{BBoxXYXY, Pixel};

pub const DEFAULT_PROJECT_DIR: &str = "runs/detect";
pub const DEFAULT_RUN_NAME: &str = "predict";
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// Options for [`run_prediction`].
#[derive(Clone, Debug)]
pub struct PredictOptions {
    pub model: PathBuf,
    pub image: PathBuf,
    /// Manifest used to name class indices.
    pub data: Option<PathBuf>,
    /// The tool writes its output to `<project>/<name>`.
    pub project: PathBuf,
    pub name: String,
    pub conf: f64,
}

impl PredictOptions {
    pub fn new(model: impl Into<PathBuf>, image: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            image: image.into(),
            data: None,
            project: PathBuf::from(DEFAULT_PROJECT_DIR),
            name: DEFAULT_RUN_NAME.to_string(),
            conf: DEFAULT_CONFIDENCE,
        }
    }

    pub fn run_dir(&self) -> PathBuf {
        self.project.join(&self.name)
    }

    /// Where the tool writes the rows for this image.
    pub fn labels_path(&self) -> PathBuf {
        let stem = self.image.file_stem().unwrap_or_default();
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(LABEL_EXTENSION);
        self.run_dir().join("labels").join(file_name)
    }

    /// Where the tool saves the image with boxes drawn on it.
    pub fn annotated_image_path(&self) -> PathBuf {
        let file_name = self.image.file_name().unwrap_or_default();
        self.run_dir().join(file_name)
    }

    /// Arguments for the `yolo` tool, starting with `detect predict`.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "detect".to_string(),
            "predict".to_string(),
            kv("model", self.model.display()),
            kv("source", self.image.display()),
            kv("conf", self.conf),
            kv("save", py_bool(true)),
            kv("save_txt", py_bool(true)),
            kv("save_conf", py_bool(true)),
            kv("project", self.project.display()),
            kv("name", &self.name),
            kv("exist_ok", py_bool(true)),
        ]
    }

    fn validate(&self) -> Result<(), YolokitError> {
        if !(0.0..=1.0).contains(&self.conf) {
            return Err(YolokitError::InvalidOptions(format!(
                "confidence threshold must be in [0.0, 1.0], got {}",
                self.conf
            )));
        }
        for (what, path) in [("model checkpoint", &self.model), ("image", &self.image)] {
            if !path.is_file() {
                return Err(YolokitError::InvalidOptions(format!(
                    "{what} not found: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// One predicted box.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f64,
    #[serde(serialize_with = "serialize_bbox")]
    pub bbox: BBoxXYXY<Pixel>,
}

fn serialize_bbox<S: serde::Serializer>(bbox: &BBoxXYXY<Pixel>, serializer: S) -> Result<S::Ok, S::Error> {
    [bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax].serialize(serializer)
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} [{}, {}, {}, {}]",
            self.class_name,
            self.confidence,
            self.bbox.xmin as i64,
            self.bbox.ymin as i64,
            self.bbox.xmax as i64,
            self.bbox.ymax as i64
        )
    }
}

/// Result of a prediction run.
#[derive(Clone, Debug, Serialize)]
pub struct PredictionReport {
    pub image: PathBuf,
    /// The image with boxes drawn by the tool, if it was saved.
    pub annotated_image: Option<PathBuf>,
    pub detections: Vec<Detection>,
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Detected {} object(s) in {}",
            self.detections.len(),
            self.image.display()
        )?;
        for detection in &self.detections {
            writeln!(f, "  - {detection}")?;
        }
        if let Some(path) = &self.annotated_image {
            writeln!(f, "Annotated image: {}", path.display())?;
        }
        Ok(())
    }
}

/// Read the tool's rows for one image into pixel-space detections.
///
/// A missing file means no detections. Class ids beyond `class_names` are
/// named `class_<id>`. Rows without a confidence get 1.0.
pub fn read_detections(
    labels_path: &Path,
    image_path: &Path,
    class_names: &[String],
) -> Result<Vec<Detection>, YolokitError> {
    if !labels_path.is_file() {
        return Ok(Vec::new());
    }

    let (width, height) = read_image_dimensions(image_path)?;
    let rows = io_yolo::read_label_file(labels_path)?;

    let mut detections: Vec<Detection> = rows
        .into_iter()
        .map(|row| Detection {
            class_id: row.label.class_id,
            class_name: class_names
                .get(row.label.class_id)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", row.label.class_id)),
            confidence: row.confidence.unwrap_or(1.0),
            bbox: row.label.pixel_box(width, height),
        })
        .collect();

    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(detections)
}

fn read_image_dimensions(path: &Path) -> Result<(u32, u32), YolokitError> {
    let size = imagesize::size(path).map_err(|source| YolokitError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let to_u32 = |value: usize, what: &str| {
        u32::try_from(value).map_err(|_| {
            YolokitError::InvalidOptions(format!(
                "image {what} {value} of {} does not fit in u32",
                path.display()
            ))
        })
    };

    Ok((to_u32(size.width, "width")?, to_u32(size.height, "height")?))
}

/// Run prediction on one image and collect the detections.
pub fn run_prediction(
    runner: &dyn TaskRunner,
    opts: &PredictOptions,
) -> Result<PredictionReport, YolokitError> {
    opts.validate()?;

    let class_names = match &opts.data {
        Some(path) => io_yolo::read_data_yaml(path)?.class_names(),
        None => Vec::new(),
    };

    let labels_path = opts.labels_path();
    if labels_path.is_file() {
        // The tool appends to existing label files.
        std::fs::remove_file(&labels_path).map_err(YolokitError::Io)?;
    }

    runner.run_task(&opts.to_args())?;

    let detections = read_detections(&labels_path, &opts.image, &class_names)?;
    let annotated = opts.annotated_image_path();
    log::info!("{} detection(s) in {}", detections.len(), opts.image.display());

    Ok(PredictionReport {
        image: opts.image.clone(),
        annotated_image: annotated.is_file().then_some(annotated),
        detections,
    })
}
