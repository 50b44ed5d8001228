//! Dataset preparation: VOC source tree in, YOLO training layout out.
//!
//! The source root must contain `images/` and `annotations/`. The output
//! root receives `train/{images,labels}`, `val/{images,labels}` and
//! `data.yaml`:
//!
//! ```text
//! <output>/
//!   data.yaml
//!   train/images/*   train/labels/*.txt
//!   val/images/*     val/labels/*.txt
//! ```
//!
//! Files are processed one at a time. A missing source directory or an empty
//! annotation directory aborts the run; anything wrong with a single file is
//! recorded in the [`PrepareReport`] and the run continues. Output written
//! before an abort is left in place.

mod pair;
mod report;
mod split;

use std::fs;
use std::path::{Path, PathBuf};

pub use pair::{find_image_for_stem, process_file_pair, SplitDirs, IMAGE_EXTENSIONS};
pub use report::{
    ItemOutcome, ItemReport, PrepareReport, SkipReason, SplitCounts, SplitName,
};
pub use split::{
    split_dataset, train_count, validate_train_ratio, DatasetSplit, DEFAULT_SEED,
    DEFAULT_TRAIN_RATIO,
};

use crate::classes::{self, ClassRegistry, DEFAULT_SAMPLE_LIMIT};
use crate::error::YolokitError;
use crate::ir::io_voc_xml;
use crate::ir::io_yolo::{self, DataManifest};

/// How often progress is logged, in files.
pub const DEFAULT_PROGRESS_EVERY: usize = 100;

/// Options for [`prepare_dataset`].
#[derive(Clone, Debug)]
pub struct PrepareOptions {
    /// Root holding `images/` and `annotations/`.
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub seed: u64,
    /// Fraction of files assigned to the training split.
    pub train_ratio: f64,
    /// Annotation files read for class discovery; `0` reads all of them.
    pub class_sample_limit: usize,
    /// Explicit class list. Skips discovery when non-empty.
    pub classes: Vec<String>,
    /// Log progress every N files; `0` disables progress lines.
    pub progress_every: usize,
}

impl PrepareOptions {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            seed: DEFAULT_SEED,
            train_ratio: DEFAULT_TRAIN_RATIO,
            class_sample_limit: DEFAULT_SAMPLE_LIMIT,
            classes: Vec::new(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Validated source directories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLayout {
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
}

/// Check that `root`, `root/annotations` and `root/images` all exist.
pub fn discover_source_layout(root: &Path) -> Result<SourceLayout, YolokitError> {
    let annotations_dir = root.join("annotations");
    let images_dir = root.join("images");

    for (kind, path) in [
        ("Source dataset", root),
        ("Annotation", annotations_dir.as_path()),
        ("Image", images_dir.as_path()),
    ] {
        if !path.is_dir() {
            return Err(YolokitError::SourceDirMissing {
                kind,
                path: path.to_path_buf(),
            });
        }
    }

    Ok(SourceLayout {
        images_dir,
        annotations_dir,
    })
}

/// Run the whole conversion and return the per-file report.
pub fn prepare_dataset(opts: &PrepareOptions) -> Result<PrepareReport, YolokitError> {
    validate_train_ratio(opts.train_ratio)?;
    let layout = discover_source_layout(&opts.source_dir)?;

    let xml_files = io_voc_xml::collect_xml_files(&layout.annotations_dir)?;
    if xml_files.is_empty() {
        return Err(YolokitError::NoAnnotationFiles {
            path: layout.annotations_dir,
        });
    }
    log::info!("found {} annotation files", xml_files.len());

    let registry = classes::resolve_registry(
        &opts.classes,
        &xml_files,
        opts.class_sample_limit,
        &layout.annotations_dir,
    )?;
    log::info!("classes: {}", describe_classes(&registry));

    let train_dirs = SplitDirs::new(&opts.output_dir.join(SplitName::Train.dir_name()));
    let val_dirs = SplitDirs::new(&opts.output_dir.join(SplitName::Val.dir_name()));
    train_dirs.ensure()?;
    val_dirs.ensure()?;

    let split = split_dataset(xml_files, opts.train_ratio, opts.seed);
    log::info!(
        "split: {} train, {} val (seed {})",
        split.train.len(),
        split.val.len(),
        opts.seed
    );

    let mut report = PrepareReport::new(registry.names().to_vec(), opts.seed);
    report.train.assigned = split.train.len();
    report.val.assigned = split.val.len();

    for (name, files, dirs) in [
        (SplitName::Train, split.train, &train_dirs),
        (SplitName::Val, split.val, &val_dirs),
    ] {
        process_split(
            name,
            files,
            &layout.images_dir,
            dirs,
            &registry,
            opts.progress_every,
            &mut report,
        );
    }

    let root = fs::canonicalize(&opts.output_dir).map_err(YolokitError::Io)?;
    let manifest = DataManifest::new(root, registry.names());
    let manifest_path = io_yolo::write_data_yaml(&opts.output_dir, &manifest)?;
    log::info!("wrote dataset manifest {}", manifest_path.display());
    report.manifest = Some(manifest_path);

    Ok(report)
}

fn process_split(
    name: SplitName,
    files: Vec<PathBuf>,
    images_dir: &Path,
    dirs: &SplitDirs,
    registry: &ClassRegistry,
    progress_every: usize,
    report: &mut PrepareReport,
) {
    log::info!("processing {name} split");
    let total = files.len();

    for (idx, xml_path) in files.into_iter().enumerate() {
        let outcome = process_file_pair(&xml_path, images_dir, dirs, registry);
        report.record(name, xml_path, outcome);

        let done = idx + 1;
        if progress_every > 0 && done % progress_every == 0 {
            log::info!("processed {done}/{total} {name} files");
        }
    }
}

fn describe_classes(registry: &ClassRegistry) -> String {
    registry
        .names()
        .iter()
        .enumerate()
        .map(|(idx, name)| format!("{idx}={name}"))
        .collect::<Vec<_>>()
        .join(", ")
}
