//! # Omics data simulation tools
//!
//! Callable tools that produce simulated omics artifacts inside a workspace
//! directory, plus an exam harness that scores a language model on
//! bioinformatics command-line questions.
//!
//! ## Tool families
//!
//! 1. **Genomics**: paired-end reads (`wgsim`), alignment (`bwa` + `samtools`),
//!    variant calls (`bcftools`)
//! 2. **Variomics**: seeded coalescent ancestry and mutation simulation
//! 3. **Proteomics**: in-silico digestion and theoretical MS/MS spectra (mzML)
//! 4. **Metabolomics**: log-normal peak intensity tables (CSV)
//!
//! Every tool returns the path of an artifact it created, or a [`ToolError`].
//!
//! ## Usage Example
//!
//! ```no_run
//! use biogen::{ToolConfig, Toolbox};
//!
//! let toolbox = Toolbox::new(ToolConfig::new("./workspace", "./bio_seeds"));
//! let table = toolbox.simulate_metabolomics_peak_list(100, 20, 0.1)?;
//! println!("peak table at {}", table.display());
//! # Ok::<(), biogen::ToolError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod config;       // Workspace and tool configuration
pub mod process;      // External command execution
pub mod sampling;     // Random variate helpers
pub mod genomics;     // Reads, alignment, variant calling
pub mod variomics;    // Coalescent variant simulation
pub mod proteomics;   // Digestion and theoretical spectra
pub mod metabolomics; // Peak table simulation
pub mod exam;         // Language model exam harness
pub mod tools;        // Named tool registry
/// Python bindings for exposing the tool registry to external runtimes.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use config::{ArtifactNamespace, ToolConfig, Workspace};
pub use genomics::ReadPair;
pub use tools::{ToolInfo, ToolRegistry};

use std::path::PathBuf;

use process::ToolRunner;
use thiserror::Error;

/// Errors raised by the simulation tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// An external program exited with a non-zero status.
    #[error("{tool} failed ({status}): {stderr}")]
    ExternalProcess {
        /// Program (and subcommand) that failed.
        tool: String,
        /// Rendered exit status.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// An external program could not be launched at all.
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        /// Program that could not be started.
        tool: String,
        /// Underlying launch error.
        #[source]
        source: std::io::Error,
    },

    /// A referenced input file does not exist.
    #[error("input file '{}' not found", .0.display())]
    MissingInput(PathBuf),

    /// A seed file was not found directly or under the seed repository.
    #[error("seed file '{}' not found in '{}'", .path.display(), .seed_dir.display())]
    MissingSeed {
        /// Requested path.
        path: PathBuf,
        /// Seed repository that was searched.
        seed_dir: PathBuf,
    },

    /// A parameter is outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A produced artifact could not be read back.
    #[error("invalid output '{}': {reason}", .path.display())]
    InvalidOutput {
        /// Artifact that failed validation.
        path: PathBuf,
        /// Reason reported by the reader.
        reason: String,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry point for all simulation tools.
///
/// Holds the explicit configuration every tool needs (workspace root, seed
/// repository, launcher prefix) so no process-wide state is consulted.
#[derive(Debug, Clone)]
pub struct Toolbox {
    config: ToolConfig,
    runner: ToolRunner,
}

impl Toolbox {
    /// Create a toolbox from configuration.
    pub fn new(config: ToolConfig) -> Self {
        let runner = ToolRunner::new(config.conda_env.clone()).with_tool_dir(config.tool_dir.clone());
        Self { config, runner }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Workspace resolver derived from the configuration.
    pub fn workspace(&self) -> Workspace {
        self.config.workspace()
    }

    pub(crate) fn runner(&self) -> &ToolRunner {
        &self.runner
    }

    /// Resolve a file from the seed repository.
    ///
    /// The path is returned unchanged if it exists; otherwise it is looked up
    /// relative to the seed directory.
    pub fn seed_file_path(&self, path: impl Into<PathBuf>) -> Result<PathBuf, ToolError> {
        let path = path.into();
        tracing::info!(path = %path.display(), "resolving seed file");
        if path.exists() {
            return Ok(path);
        }
        if path.is_relative() {
            let candidate = self.config.seed_dir.join(&path);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(ToolError::MissingSeed {
            path,
            seed_dir: self.config.seed_dir.clone(),
        })
    }
}

pub(crate) fn require_input(path: &std::path::Path) -> Result<(), ToolError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}
