//! Processing of one annotation/image pair into a split directory.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classes::ClassRegistry;
use crate::conversion::convert_voc_file;
use crate::ir::io_yolo::{self, LABEL_EXTENSION};

use super::report::{ItemOutcome, SkipReason};

/// Image extensions probed for a given stem, in order. Matching is
/// case-sensitive, so upper-case variants are listed separately.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "JPG", "JPEG", "PNG"];

/// `<split>/images` and `<split>/labels` for one split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitDirs {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl SplitDirs {
    pub fn new(split_root: &Path) -> Self {
        Self {
            images: split_root.join("images"),
            labels: split_root.join("labels"),
        }
    }

    /// Create both directories. Safe to call repeatedly.
    pub fn ensure(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.images)?;
        fs::create_dir_all(&self.labels)
    }
}

/// First existing `<images_dir>/<stem>.<ext>` for [`IMAGE_EXTENSIONS`].
pub fn find_image_for_stem(images_dir: &Path, stem: &OsStr) -> Option<PathBuf> {
    IMAGE_EXTENSIONS.iter().find_map(|ext| {
        let candidate = images_dir.join(stem_with_extension(stem, ext));
        candidate.is_file().then_some(candidate)
    })
}

/// `<stem>.<ext>` without touching dots already inside the stem.
fn stem_with_extension(stem: &OsStr, ext: &str) -> OsString {
    let mut file_name = OsString::from(stem);
    file_name.push(".");
    file_name.push(ext);
    file_name
}

/// Convert one annotation file and materialize it in `dirs`.
///
/// Nothing is written unless the annotation has an image and at least one
/// registered object. Every failure becomes a [`SkipReason`].
pub fn process_file_pair(
    xml_path: &Path,
    images_dir: &Path,
    dirs: &SplitDirs,
    registry: &ClassRegistry,
) -> ItemOutcome {
    let stem = xml_path.file_stem().unwrap_or_default();
    let skip = |reason: SkipReason| {
        log::warn!("skipping {}: {}", xml_path.display(), reason);
        ItemOutcome::Skipped { reason }
    };

    let Some(image_src) = find_image_for_stem(images_dir, stem) else {
        return skip(SkipReason::ImageNotFound {
            stem: stem.to_string_lossy().to_string(),
        });
    };

    let converted = match convert_voc_file(xml_path, registry) {
        Ok(converted) => converted,
        Err(err) => {
            return skip(SkipReason::ParseFailed {
                message: err.to_string(),
            })
        }
    };

    if converted.is_empty() {
        return skip(SkipReason::NoValidObjects {
            unknown_classes: converted.unknown_classes,
        });
    }

    if let Err(err) = dirs.ensure() {
        return skip(SkipReason::WriteFailed {
            label: dirs.labels.clone(),
            message: err.to_string(),
        });
    }

    let image_dest = match image_src.file_name() {
        Some(name) => dirs.images.join(name),
        None => dirs.images.join(stem),
    };
    if let Err(err) = fs::copy(&image_src, &image_dest) {
        return skip(SkipReason::CopyFailed {
            image: image_src,
            message: err.to_string(),
        });
    }

    let label_dest = dirs.labels.join(stem_with_extension(stem, LABEL_EXTENSION));
    if let Err(err) = io_yolo::write_label_file(&label_dest, &converted.labels) {
        return skip(SkipReason::WriteFailed {
            label: label_dest,
            message: err.to_string(),
        });
    }

    log::debug!(
        "wrote {} label(s) for {}",
        converted.labels.len(),
        image_dest.display()
    );

    ItemOutcome::Written {
        image: image_dest,
        label: label_dest,
        objects: converted.labels.len(),
        unknown_classes: converted.unknown_classes,
    }
}
