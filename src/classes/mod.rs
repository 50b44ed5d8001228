//! Class registry: the ordered class-name list behind YOLO class indices.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::YolokitError;
use crate::ir::io_voc_xml;

/// How many annotation files class discovery reads by default.
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// Ordered, deduplicated class names mapped to indices `0..len`.
///
/// Built once per run and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassRegistry {
    names: Vec<String>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl ClassRegistry {
    /// Registry in the given order. Blank names are dropped and duplicates
    /// keep their first position.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        for name in names {
            let name: String = name.into();
            let name = name.trim();
            if name.is_empty() || registry.index.contains_key(name) {
                continue;
            }
            registry.index.insert(name.to_string(), registry.names.len());
            registry.names.push(name.to_string());
        }
        registry
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Result of scanning annotation files for class names.
#[derive(Clone, Debug)]
pub struct ClassDiscovery {
    /// Lexicographically sorted registry.
    pub registry: ClassRegistry,
    /// Number of files read (successfully or not).
    pub scanned: usize,
    /// Files that could not be parsed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Discover class names from the first `limit` files of `files`.
///
/// `limit == 0` scans every file. Classes that only appear past the limit
/// are not registered. Unreadable files are logged and skipped.
pub fn discover_class_names(files: &[PathBuf], limit: usize) -> ClassDiscovery {
    let take = if limit == 0 { files.len() } else { limit };

    let mut names = BTreeSet::new();
    let mut failed = Vec::new();
    let mut scanned = 0;

    for path in files.iter().take(take) {
        scanned += 1;
        match io_voc_xml::read_voc_class_names(path) {
            Ok(found) => names.extend(found),
            Err(err) => {
                log::warn!("skipping {} during class discovery: {}", path.display(), err);
                failed.push((path.clone(), err.to_string()));
            }
        }
    }

    if limit != 0 && files.len() > limit {
        log::debug!(
            "class discovery sampled {} of {} annotation files",
            limit,
            files.len()
        );
    }

    ClassDiscovery {
        registry: ClassRegistry::from_names(names),
        scanned,
        failed,
    }
}

/// Build the registry for a run: explicit names win, otherwise discover.
///
/// Fails when neither source yields a class.
pub fn resolve_registry(
    explicit: &[String],
    files: &[PathBuf],
    limit: usize,
    annotations_dir: &Path,
) -> Result<ClassRegistry, YolokitError> {
    let registry = if explicit.is_empty() {
        discover_class_names(files, limit).registry
    } else {
        ClassRegistry::from_names(explicit.iter().cloned())
    };

    if registry.is_empty() {
        return Err(YolokitError::NoClasses {
            path: annotations_dir.to_path_buf(),
        });
    }

    Ok(registry)
}
