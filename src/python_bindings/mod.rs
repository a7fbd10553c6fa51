//! Python bindings that expose the tool registry via PyO3.
use pyo3::{
    exceptions::{PyFileNotFoundError, PyRuntimeError, PyValueError},
    prelude::*,
    types::PyModule,
};

use crate::{ToolConfig, ToolError, ToolRegistry, Toolbox};

/// Python-facing handle on the simulation tools.
#[pyclass]
#[derive(Debug)]
pub struct PyToolbox {
    toolbox: Toolbox,
    registry: ToolRegistry,
}

#[pymethods]
impl PyToolbox {
    #[new]
    #[pyo3(signature = (workspace_dir = "./workspace", seed_dir = "./bio_seeds", conda_env = None))]
    /// Create a toolbox with every built-in tool registered.
    pub fn new(workspace_dir: &str, seed_dir: &str, conda_env: Option<String>) -> Self {
        let mut config = ToolConfig::new(workspace_dir, seed_dir);
        if let Some(env) = conda_env {
            config = config.with_conda_env(env);
        }
        Self {
            toolbox: Toolbox::new(config),
            registry: ToolRegistry::with_builtin_tools(),
        }
    }

    /// List the names of all registered tools.
    pub fn list_tools(&self) -> Vec<String> {
        self.registry
            .list()
            .into_iter()
            .map(|info| info.name)
            .collect()
    }

    /// Tool names, descriptions and argument schemas as a JSON string.
    pub fn describe_tools(&self) -> PyResult<String> {
        serde_json::to_string(&self.registry.list()).map_err(|err| PyRuntimeError::new_err(err.to_string()))
    }

    /// Invoke a tool.
    ///
    /// Args:
    ///     name: Tool name as returned by `list_tools`.
    ///     args_json: JSON object of arguments.
    ///
    /// Returns:
    ///     The tool result encoded as JSON.
    #[pyo3(signature = (name, args_json = "{}"))]
    pub fn invoke(&self, name: &str, args_json: &str) -> PyResult<String> {
        let args: serde_json::Value =
            serde_json::from_str(args_json).map_err(|err| PyValueError::new_err(err.to_string()))?;
        let result = self
            .registry
            .invoke(&self.toolbox, name, &args)
            .map_err(to_py_err)?;
        Ok(result.to_string())
    }
}

fn to_py_err(err: ToolError) -> PyErr {
    match err {
        ToolError::MissingInput(_) | ToolError::MissingSeed { .. } => PyFileNotFoundError::new_err(err.to_string()),
        ToolError::InvalidArgument(_) => PyValueError::new_err(err.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Create Python module.
#[pymodule]
pub fn biogen_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyToolbox>()?;
    Ok(())
}
