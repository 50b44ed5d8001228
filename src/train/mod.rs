//! Model training through the external `yolo` tool.
//!
//! [`TrainConfig`] carries the full hyperparameter set. Its defaults are the
//! configuration the pothole model was trained with; a YAML file can override
//! any subset of fields, and the CLI can override a few common ones on top.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::YolokitError;
use crate::external::{kv, py_bool, TaskRunner};

/// Training configuration rendered as `yolo detect train key=value ...`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Pretrained checkpoint to start from.
    pub model: Option<PathBuf>,
    /// Dataset manifest (`data.yaml`).
    pub data: Option<PathBuf>,

    pub epochs: u32,
    pub imgsz: u32,
    pub batch: u32,
    pub workers: u32,

    // Augmentation
    pub augment: bool,
    pub scale: f64,
    pub fliplr: f64,

    // Optimizer
    pub optimizer: String,
    pub lr0: f64,
    pub lrf: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    pub warmup_epochs: f64,
    pub warmup_momentum: f64,
    pub warmup_bias_lr: f64,

    // Schedule / regularization
    pub patience: u32,
    pub dropout: f64,
    pub erasing: f64,
    pub auto_augment: String,

    // Run bookkeeping
    pub name: String,
    pub exist_ok: bool,
    pub resume: bool,
    pub verbose: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model: None,
            data: None,
            epochs: 100,
            imgsz: 640,
            batch: 4,
            workers: 0,
            augment: true,
            scale: 0.5,
            fliplr: 0.5,
            optimizer: "auto".to_string(),
            lr0: 0.01,
            lrf: 0.01,
            momentum: 0.937,
            weight_decay: 0.0005,
            warmup_epochs: 3.0,
            warmup_momentum: 0.8,
            warmup_bias_lr: 0.1,
            patience: 50,
            dropout: 0.2,
            erasing: 0.4,
            auto_augment: "randaugment".to_string(),
            name: "pothole_detection_v2".to_string(),
            exist_ok: true,
            resume: false,
            verbose: true,
        }
    }
}

impl TrainConfig {
    /// Load a YAML config; missing fields keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, YolokitError> {
        let data = fs::read_to_string(path).map_err(YolokitError::Io)?;
        serde_yaml::from_str(&data).map_err(|source| YolokitError::TrainConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checkpoint and manifest paths, checked to exist.
    pub fn validated_paths(&self) -> Result<(&Path, &Path), YolokitError> {
        let model = require_file(self.model.as_deref(), "model checkpoint")?;
        let data = require_file(self.data.as_deref(), "dataset manifest")?;
        Ok((model, data))
    }

    /// Arguments for the `yolo` tool, starting with `detect train`.
    pub fn to_args(&self) -> Result<Vec<String>, YolokitError> {
        let (model, data) = self.validated_paths()?;

        Ok(vec![
            "detect".to_string(),
            "train".to_string(),
            kv("model", model.display()),
            kv("data", data.display()),
            kv("epochs", self.epochs),
            kv("imgsz", self.imgsz),
            kv("batch", self.batch),
            kv("workers", self.workers),
            kv("augment", py_bool(self.augment)),
            kv("scale", self.scale),
            kv("fliplr", self.fliplr),
            kv("optimizer", &self.optimizer),
            kv("lr0", self.lr0),
            kv("lrf", self.lrf),
            kv("momentum", self.momentum),
            kv("weight_decay", self.weight_decay),
            kv("warmup_epochs", self.warmup_epochs),
            kv("warmup_momentum", self.warmup_momentum),
            kv("warmup_bias_lr", self.warmup_bias_lr),
            kv("patience", self.patience),
            kv("dropout", self.dropout),
            kv("erasing", self.erasing),
            kv("auto_augment", &self.auto_augment),
            kv("name", &self.name),
            kv("exist_ok", py_bool(self.exist_ok)),
            kv("resume", py_bool(self.resume)),
            kv("verbose", py_bool(self.verbose)),
        ])
    }
}

fn require_file<'a>(path: Option<&'a Path>, what: &str) -> Result<&'a Path, YolokitError> {
    let path = path.ok_or_else(|| YolokitError::InvalidOptions(format!("no {what} given")))?;
    if !path.is_file() {
        return Err(YolokitError::InvalidOptions(format!(
            "{what} not found: {}",
            path.display()
        )));
    }
    Ok(path)
}

/// Validate the config and run training to completion.
pub fn run_training(runner: &dyn TaskRunner, config: &TrainConfig) -> Result<(), YolokitError> {
    let args = config.to_args()?;
    log::info!(
        "training '{}' for {} epochs (imgsz {}, batch {})",
        config.name,
        config.epochs,
        config.imgsz,
        config.batch
    );
    runner.run_task(&args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl TaskRunner for RecordingRunner {
        fn run_task(&self, args: &[String]) -> Result<(), YolokitError> {
            self.calls.borrow_mut().push(args.to_vec());
            Ok(())
        }
    }

    fn config_with_files(dir: &Path) -> TrainConfig {
        let model = dir.join("best.pt");
        let data = dir.join("data.yaml");
        fs::write(&model, b"weights").expect("write model");
        fs::write(&data, "names: [pothole]\n").expect("write data");
        TrainConfig {
            model: Some(model),
            data: Some(data),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn default_args_match_fixed_hyperparameters() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let args = config_with_files(temp.path()).to_args().expect("args");

        assert_eq!(&args[..2], ["detect", "train"]);
        for expected in [
            "epochs=100",
            "imgsz=640",
            "batch=4",
            "workers=0",
            "augment=True",
            "scale=0.5",
            "fliplr=0.5",
            "optimizer=auto",
            "lr0=0.01",
            "lrf=0.01",
            "momentum=0.937",
            "weight_decay=0.0005",
            "warmup_epochs=3",
            "warmup_momentum=0.8",
            "warmup_bias_lr=0.1",
            "patience=50",
            "dropout=0.2",
            "erasing=0.4",
            "auto_augment=randaugment",
            "name=pothole_detection_v2",
            "exist_ok=True",
            "resume=False",
            "verbose=True",
        ] {
            assert!(args.iter().any(|arg| arg == expected), "missing {expected}");
        }
    }

    #[test]
    fn yaml_overrides_only_given_fields() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("train.yaml");
        fs::write(&path, "epochs: 5\nbatch: 16\nname: quick\n").expect("write yaml");

        let config = TrainConfig::from_yaml_file(&path).expect("parse config");
        assert_eq!(config.epochs, 5);
        assert_eq!(config.batch, 16);
        assert_eq!(config.name, "quick");
        assert_eq!(config.imgsz, 640);
        assert_eq!(config.momentum, 0.937);
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("train.yaml");
        fs::write(&path, "epoch: 5\n").expect("write yaml");
        let err = TrainConfig::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, YolokitError::TrainConfigParse { .. }));
    }

    #[test]
    fn missing_checkpoint_fails_before_running() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut config = config_with_files(temp.path());
        config.model = Some(temp.path().join("missing.pt"));

        let runner = RecordingRunner::default();
        let err = run_training(&runner, &config).unwrap_err();
        assert!(matches!(err, YolokitError::InvalidOptions(_)));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn run_training_passes_args_to_runner() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = config_with_files(temp.path());
        let runner = RecordingRunner::default();
        run_training(&runner, &config).expect("train");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&format!("model={}", temp.path().join("best.pt").display())));
    }
}
