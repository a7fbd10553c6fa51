//! Tool configuration and workspace layout.
//!
//! All artifact locations derive from a [`ToolConfig`] handed to the toolbox at
//! construction. By default each tool writes a fixed file name directly under
//! the workspace root, so repeated calls overwrite earlier output and
//! concurrent calls race. [`ArtifactNamespace`] selects an alternative layout
//! when invocations must not collide.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ToolError;

/// Directory layout used for generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArtifactNamespace {
    /// Fixed file names directly under the workspace root.
    #[default]
    Shared,
    /// Caller-supplied run directory below the workspace root.
    Run(String),
    /// One directory per distinct tool invocation, named by a digest of the
    /// tool name and its parameters.
    ContentAddressed,
}

/// Configuration shared by all tools.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Root directory for generated artifacts.
    pub workspace_dir: PathBuf,
    /// Root directory of reference inputs (genomes, protein databases).
    pub seed_dir: PathBuf,
    /// Conda environment to launch external programs in (`conda run -n`).
    pub conda_env: Option<String>,
    /// Artifact layout below the workspace root.
    pub namespace: ArtifactNamespace,
    /// Directory whose programs take precedence over `PATH`.
    pub tool_dir: Option<PathBuf>,
}

impl ToolConfig {
    /// Create a configuration with direct program launches and shared naming.
    pub fn new(workspace_dir: impl Into<PathBuf>, seed_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            seed_dir: seed_dir.into(),
            conda_env: None,
            namespace: ArtifactNamespace::Shared,
            tool_dir: None,
        }
    }

    /// Launch external programs through `conda run -n <env>`.
    pub fn with_conda_env(mut self, env: impl Into<String>) -> Self {
        self.conda_env = Some(env.into());
        self
    }

    /// Prefer programs found in `dir` over those on `PATH`.
    pub fn with_tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    /// Select the artifact layout.
    pub fn with_namespace(mut self, namespace: ArtifactNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Workspace resolver for this configuration.
    pub fn workspace(&self) -> Workspace {
        Workspace {
            root: self.workspace_dir.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::new("./workspace", "./bio_seeds")
    }
}

/// Resolves artifact directories for tool invocations.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    namespace: ArtifactNamespace,
}

impl Workspace {
    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that artifacts of one invocation are written to, created on
    /// demand.
    pub fn artifact_dir(&self, tool: &str, params: &[String]) -> Result<PathBuf, ToolError> {
        let dir = match &self.namespace {
            ArtifactNamespace::Shared => self.root.clone(),
            ArtifactNamespace::Run(run_id) => {
                if run_id.is_empty() || run_id.contains(['/', '\\']) || run_id == "." || run_id == ".." {
                    return Err(ToolError::InvalidArgument(format!(
                        "run id '{run_id}' is not a plain directory name"
                    )));
                }
                self.root.join(run_id)
            }
            ArtifactNamespace::ContentAddressed => {
                self.root.join(format!("{tool}-{}", invocation_digest(tool, params)))
            }
        };
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Short hex digest of a tool invocation.
pub fn invocation_digest(tool: &str, params: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tool.as_bytes());
    for param in params {
        // Length prefix keeps ["ab", "c"] and ["a", "bc"] distinct.
        hasher.update(&(param.len() as u64).to_le_bytes());
        hasher.update(param.as_bytes());
    }
    hasher.finalize().to_hex().as_str()[..16].to_string()
}
