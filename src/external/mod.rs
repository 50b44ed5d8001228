//! Launching the Ultralytics `yolo` command-line tool.
//!
//! Training and prediction are delegated to the external framework. This
//! module owns how its process is started: which program, which arguments,
//! and which extra environment variables. Nothing is set on the current
//! process environment.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::error::YolokitError;

/// Default program name, resolved through `PATH`.
pub const DEFAULT_YOLO_BIN: &str = "yolo";

/// Lets an Intel OpenMP runtime load when another copy is already loaded.
pub const DUPLICATE_OPENMP_ENV: &str = "KMP_DUPLICATE_LIB_OK";

/// Environment variables applied to spawned processes only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    vars: BTreeMap<String, String>,
}

impl ProcessEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `KMP_DUPLICATE_LIB_OK=TRUE` for the child when `allow` is true.
    pub fn with_duplicate_openmp(mut self, allow: bool) -> Self {
        if allow {
            self.vars
                .insert(DUPLICATE_OPENMP_ENV.to_string(), "TRUE".to_string());
        }
        self
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Something that can run a `yolo`-style task with `key=value` arguments.
pub trait TaskRunner {
    fn run_task(&self, args: &[String]) -> Result<(), YolokitError>;
}

/// The real `yolo` executable.
#[derive(Clone, Debug)]
pub struct YoloCli {
    pub program: PathBuf,
    pub env: ProcessEnv,
}

impl YoloCli {
    pub fn new(program: impl Into<PathBuf>, env: ProcessEnv) -> Self {
        Self {
            program: program.into(),
            env,
        }
    }

    /// The command that [`TaskRunner::run_task`] would spawn.
    pub fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args);
        for (key, value) in self.env.vars() {
            command.env(key, value);
        }
        command
    }
}

impl TaskRunner for YoloCli {
    fn run_task(&self, args: &[String]) -> Result<(), YolokitError> {
        log::info!("running {} {}", self.program.display(), args.join(" "));

        let status = self
            .command(args)
            .status()
            .map_err(|source| YolokitError::ExternalSpawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(YolokitError::ExternalFailed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// Render one `key=value` argument.
pub fn kv(key: &str, value: impl fmt::Display) -> String {
    format!("{key}={value}")
}

/// Booleans in the capitalized form the `yolo` CLI documents.
pub fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
