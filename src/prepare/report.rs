//! Per-file outcomes and the summary report of a prepare run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which half of the split a file was assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitName {
    Train,
    Val,
}

impl SplitName {
    pub fn dir_name(&self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Val => "val",
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Why a file was left out of the output.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SkipReason {
    /// No same-stem image with a known extension exists.
    ImageNotFound { stem: String },
    /// The XML could not be read or parsed.
    ParseFailed { message: String },
    /// Every object was of an unregistered class, or there were none.
    NoValidObjects { unknown_classes: Vec<String> },
    CopyFailed { image: PathBuf, message: String },
    WriteFailed { label: PathBuf, message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ImageNotFound { stem } => write!(f, "no image found for '{stem}'"),
            SkipReason::ParseFailed { message } => write!(f, "unreadable annotation: {message}"),
            SkipReason::NoValidObjects { unknown_classes } if unknown_classes.is_empty() => {
                f.write_str("no objects")
            }
            SkipReason::NoValidObjects { unknown_classes } => write!(
                f,
                "no valid objects (unknown classes: {})",
                unknown_classes.join(", ")
            ),
            SkipReason::CopyFailed { image, message } => {
                write!(f, "failed to copy {}: {message}", image.display())
            }
            SkipReason::WriteFailed { label, message } => {
                write!(f, "failed to write {}: {message}", label.display())
            }
        }
    }
}

/// Outcome for one annotation file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Written {
        image: PathBuf,
        label: PathBuf,
        objects: usize,
        /// Objects dropped because their class is not registered.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        unknown_classes: Vec<String>,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl ItemOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ItemOutcome::Written { .. })
    }
}

/// One row of the report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemReport {
    pub split: SplitName,
    pub annotation: PathBuf,
    pub outcome: ItemOutcome,
}

/// Counts for one split.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    /// Annotation files assigned to the split.
    pub assigned: usize,
    /// Image/label pairs written.
    pub written: usize,
    pub skipped: usize,
    /// Label lines written across the split.
    pub objects: usize,
}

/// Summary of a prepare run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PrepareReport {
    pub classes: Vec<String>,
    pub seed: u64,
    pub train: SplitCounts,
    pub val: SplitCounts,
    pub manifest: Option<PathBuf>,
    pub items: Vec<ItemReport>,
}

impl PrepareReport {
    pub fn new(classes: Vec<String>, seed: u64) -> Self {
        Self {
            classes,
            seed,
            ..Default::default()
        }
    }

    /// Record a file's outcome and update the split counts.
    pub fn record(&mut self, split: SplitName, annotation: PathBuf, outcome: ItemOutcome) {
        let counts = match split {
            SplitName::Train => &mut self.train,
            SplitName::Val => &mut self.val,
        };

        match &outcome {
            ItemOutcome::Written { objects, .. } => {
                counts.written += 1;
                counts.objects += objects;
            }
            ItemOutcome::Skipped { .. } => counts.skipped += 1,
        }

        self.items.push(ItemReport {
            split,
            annotation,
            outcome,
        });
    }

    pub fn written_count(&self) -> usize {
        self.train.written + self.val.written
    }

    pub fn skipped_count(&self) -> usize {
        self.train.skipped + self.val.skipped
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&ItemReport, &SkipReason)> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ItemOutcome::Skipped { reason } => Some((item, reason)),
            ItemOutcome::Written { .. } => None,
        })
    }
}

impl fmt::Display for PrepareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classes ({}): {}", self.classes.len(), self.classes.join(", "))?;
        writeln!(
            f,
            "  train: {} written, {} skipped of {} ({} objects)",
            self.train.written, self.train.skipped, self.train.assigned, self.train.objects
        )?;
        writeln!(
            f,
            "  val: {} written, {} skipped of {} ({} objects)",
            self.val.written, self.val.skipped, self.val.assigned, self.val.objects
        )?;

        if let Some(manifest) = &self.manifest {
            writeln!(f, "  manifest: {}", manifest.display())?;
        }

        let skipped = self.skipped_count();
        if skipped > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped ({}):", skipped)?;
            for (item, reason) in self.skipped() {
                writeln!(
                    f,
                    "  - [{}] {}: {}",
                    item.split,
                    item.annotation.display(),
                    reason
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(objects: usize) -> ItemOutcome {
        ItemOutcome::Written {
            image: PathBuf::from("out/train/images/a.jpg"),
            label: PathBuf::from("out/train/labels/a.txt"),
            objects,
            unknown_classes: vec![],
        }
    }

    #[test]
    fn record_updates_split_counts() {
        let mut report = PrepareReport::new(vec!["pothole".to_string()], 42);
        report.record(SplitName::Train, PathBuf::from("a.xml"), written(2));
        report.record(
            SplitName::Train,
            PathBuf::from("b.xml"),
            ItemOutcome::Skipped {
                reason: SkipReason::ImageNotFound {
                    stem: "b".to_string(),
                },
            },
        );
        report.record(SplitName::Val, PathBuf::from("c.xml"), written(1));

        assert_eq!(report.train.written, 1);
        assert_eq!(report.train.skipped, 1);
        assert_eq!(report.train.objects, 2);
        assert_eq!(report.val.written, 1);
        assert_eq!(report.written_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped().count(), 1);
    }

    #[test]
    fn text_report_lists_skips() {
        let mut report = PrepareReport::new(vec!["crack".to_string(), "pothole".to_string()], 7);
        report.record(
            SplitName::Val,
            PathBuf::from("z.xml"),
            ItemOutcome::Skipped {
                reason: SkipReason::NoValidObjects {
                    unknown_classes: vec!["flooded".to_string()],
                },
            },
        );

        let text = report.to_string();
        assert!(text.contains("Classes (2): crack, pothole"));
        assert!(text.contains("Skipped (1):"));
        assert!(text.contains("[val] z.xml: no valid objects (unknown classes: flooded)"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = PrepareReport::new(vec!["pothole".to_string()], 42);
        report.record(SplitName::Train, PathBuf::from("a.xml"), written(1));
        report.record(
            SplitName::Train,
            PathBuf::from("b.xml"),
            ItemOutcome::Skipped {
                reason: SkipReason::ParseFailed {
                    message: "bad".to_string(),
                },
            },
        );

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"seed\":42"));
        assert!(json.contains("\"split\":\"train\""));
        assert!(json.contains("\"status\":\"written\""));
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(json.contains("\"code\":\"parse_failed\""));
        assert!(!json.contains("unknown_classes"));
    }
}
