use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::api::{Tool, ToolInfo};
use super::builtin::{
    AlignReadsBwa, CallVariantsBcftools, GetSeedFilePath, SimulateDnaReadsPaired, SimulateMetabolomicsPeakList,
    SimulateMsSpectra, SimulateVariantsCoalescent,
};
use crate::{ToolError, Toolbox};

/// Registry of tools by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    entries: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(GetSeedFilePath);
        registry.register(SimulateDnaReadsPaired);
        registry.register(AlignReadsBwa);
        registry.register(CallVariantsBcftools);
        registry.register(SimulateVariantsCoalescent);
        registry.register(SimulateMsSpectra);
        registry.register(SimulateMetabolomicsPeakList);
        registry
    }

    /// Register a tool, replacing any tool of the same name, and return a
    /// handle to it.
    pub fn register<T: Tool>(&mut self, tool: T) -> Arc<T> {
        let arc = Arc::new(tool);
        self.entries.insert(arc.name().to_string(), arc.clone());
        arc
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entries.get(name).cloned()
    }

    /// Metadata of every registered tool, sorted by name.
    pub fn list(&self) -> Vec<ToolInfo> {
        self.entries.values().map(|tool| ToolInfo::of(tool.as_ref())).collect()
    }

    /// Invoke the tool called `name` with JSON `args`.
    pub fn invoke(&self, toolbox: &Toolbox, name: &str, args: &Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::InvalidArgument(format!("unknown tool '{name}'")))?;
        tracing::debug!(tool = name, %args, "invoking tool");
        tool.invoke(toolbox, args)
    }
}
