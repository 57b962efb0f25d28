//! Run File Parser
//!
//! Loads run definitions for the command-line runner from YAML.
//!
//! # Format
//!
//! ```yaml
//! actions: [print, add_random, fail_random]
//! input:
//!   "0": {name: first}
//!   "1": {name: second}
//!   "2": {random: true}
//!   other: some other info
//! max_restores: 100
//! ```
//!
//! Keys of `input` must be strings; quote numeric step indices.

use std::fs;
use std::io;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::Document;
use crate::execution::ActionRegistry;

/// Default number of resumes the runner attempts after a failed run.
pub const DEFAULT_MAX_RESTORES: usize = 10;

fn default_max_restores() -> usize {
    DEFAULT_MAX_RESTORES
}

/// Errors raised while loading a run file.
#[derive(Debug, Error)]
pub enum RunFileError {
    #[error("Failed to read run file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse run file YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid run file: {0}")]
    Invalid(String),
}

/// A run definition: which actions to execute against which event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunFile {
    /// Ordered action identifiers
    pub actions: Vec<String>,

    /// Event payload for the run
    #[serde(default)]
    pub input: Document,

    /// How many times a failed run is resumed before giving up
    #[serde(default = "default_max_restores")]
    pub max_restores: usize,
}

impl RunFile {
    /// Identifiers referenced by this run that `registry` does not know.
    pub fn unknown_actions<'a>(&'a self, registry: &ActionRegistry) -> Vec<&'a str> {
        self.actions
            .iter()
            .map(String::as_str)
            .filter(|id| !registry.contains(id))
            .collect()
    }

    fn validate(&mut self) -> Result<(), RunFileError> {
        for action in &mut self.actions {
            *action = action.trim().to_string();
        }

        if self.actions.is_empty() {
            return Err(RunFileError::Invalid(
                "at least one action is required".to_string(),
            ));
        }

        if let Some(index) = self.actions.iter().position(|id| id.is_empty()) {
            return Err(RunFileError::Invalid(format!(
                "action {} has an empty identifier",
                index
            )));
        }

        Ok(())
    }
}

/// Parses and validates a run definition from YAML text.
pub fn parse_run_file(yaml: &str) -> Result<RunFile, RunFileError> {
    let mut run: RunFile = serde_yaml::from_str(yaml)?;
    run.validate()?;

    debug!(
        "Parsed run file: {} actions, {} input keys",
        run.actions.len(),
        run.input.len()
    );
    Ok(run)
}

/// Loads a run definition from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use durable_runner::workflow::load_run_file;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let run = load_run_file("run.yaml")?;
///     println!("Loaded {} actions", run.actions.len());
///     Ok(())
/// }
/// ```
pub fn load_run_file(path: &str) -> Result<RunFile, RunFileError> {
    info!("Loading run file from: {}", path);

    let yaml_content = fs::read_to_string(path).map_err(|source| RunFileError::Io {
        path: path.to_string(),
        source,
    })?;

    parse_run_file(&yaml_content)
}
