//! Ultralytics-style YOLO label files and `data.yaml` manifest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use super::model::YoloLabel;
use crate::error::YolokitError;

pub const LABEL_EXTENSION: &str = "txt";
pub const MANIFEST_FILE_NAME: &str = "data.yaml";

const MANIFEST_HEADER: &str = "# YOLO dataset configuration\n";

/// Join labels one per line, without a trailing newline.
pub fn format_label_lines(labels: &[YoloLabel]) -> String {
    labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn write_label_file(path: &Path, labels: &[YoloLabel]) -> Result<(), YolokitError> {
    fs::write(path, format_label_lines(labels)).map_err(YolokitError::Io)
}

/// The `data.yaml` document consumed by the trainer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataManifest {
    /// Dataset root; `train` and `val` are relative to it.
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default = "default_train_dir")]
    pub train: String,
    #[serde(default = "default_val_dir")]
    pub val: String,
    #[serde(default)]
    pub nc: usize,
    #[serde(deserialize_with = "deserialize_names")]
    pub names: BTreeMap<usize, String>,
}

impl DataManifest {
    /// Manifest for the `{train,val}/images` layout under `root`.
    pub fn new(root: impl Into<PathBuf>, class_names: &[String]) -> Self {
        Self {
            path: root.into(),
            train: default_train_dir(),
            val: default_val_dir(),
            nc: class_names.len(),
            names: class_names.iter().cloned().enumerate().collect(),
        }
    }

    /// Class names by index. Gaps in a sparse mapping become `class_<idx>`.
    pub fn class_names(&self) -> Vec<String> {
        let Some(max_index) = self.names.keys().max().copied() else {
            return Vec::new();
        };

        (0..=max_index)
            .map(|idx| match self.names.get(&idx) {
                Some(name) if !name.trim().is_empty() => name.clone(),
                _ => format!("class_{idx}"),
            })
            .collect()
    }
}

fn default_train_dir() -> String {
    "train/images".to_string()
}

fn default_val_dir() -> String {
    "val/images".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn deserialize_names<'de, D>(deserializer: D) -> Result<BTreeMap<usize, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match DataYamlNames::deserialize(deserializer)? {
        DataYamlNames::Sequence(names) => names.into_iter().enumerate().collect(),
        DataYamlNames::Mapping(mapping) => mapping,
    })
}

/// Write `data.yaml` under `output_root` and return its path.
pub fn write_data_yaml(output_root: &Path, manifest: &DataManifest) -> Result<PathBuf, YolokitError> {
    let path = output_root.join(MANIFEST_FILE_NAME);
    let body = serde_yaml::to_string(manifest).map_err(|source| YolokitError::ManifestWrite {
        path: path.clone(),
        source,
    })?;

    fs::create_dir_all(output_root).map_err(YolokitError::Io)?;
    fs::write(&path, format!("{MANIFEST_HEADER}{body}")).map_err(YolokitError::Io)?;
    Ok(path)
}

pub fn read_data_yaml(path: &Path) -> Result<DataManifest, YolokitError> {
    let data = fs::read_to_string(path).map_err(YolokitError::Io)?;
    serde_yaml::from_str(&data).map_err(|source| YolokitError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// A parsed label row. Prediction output carries a trailing confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloLabelRow {
    pub label: YoloLabel,
    pub confidence: Option<f64>,
}

/// Read every non-empty row of a label file.
pub fn read_label_file(path: &Path) -> Result<Vec<YoloLabelRow>, YolokitError> {
    let content = fs::read_to_string(path).map_err(YolokitError::Io)?;
    let mut rows = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_label_line(line, path, line_idx + 1)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<YoloLabelRow>, YolokitError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 7 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(7).collect();

    let label_error = |message: String| YolokitError::LabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message,
    };

    match tokens.len() {
        5 | 6 => {}
        n if n < 5 => return Err(label_error(format!("expected 5 or 6 tokens, found {n}"))),
        _ => {
            return Err(label_error(
                "segmentation/pose rows are not supported; expected a detection box".to_string(),
            ))
        }
    }

    let class_id = tokens[0].parse::<usize>().map_err(|_| {
        label_error(format!(
            "invalid class_id '{}'; expected non-negative integer",
            tokens[0]
        ))
    })?;

    let parse = |raw: &str, field: &str| {
        raw.parse::<f64>()
            .map_err(|_| label_error(format!("invalid {field} '{raw}'; expected floating-point number")))
    };

    let cx = parse(tokens[1], "x_center")?;
    let cy = parse(tokens[2], "y_center")?;
    let w = parse(tokens[3], "width")?;
    let h = parse(tokens[4], "height")?;
    let confidence = tokens.get(5).copied().map(|raw| parse(raw, "confidence")).transpose()?;

    Ok(Some(YoloLabelRow {
        label: YoloLabel {
            class_id,
            cx,
            cy,
            w,
            h,
        },
        confidence,
    }))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), YolokitError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}
