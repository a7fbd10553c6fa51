use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{ToolError, Toolbox};

/// A named operation invoked with JSON arguments.
pub trait Tool: Send + Sync + 'static {
    /// Unique tool name.
    fn name(&self) -> &'static str;

    /// Human-readable description shown to the caller.
    fn description(&self) -> &'static str;

    /// JSON schema of the accepted arguments.
    fn parameters(&self) -> Value;

    /// Run the tool against `toolbox`.
    fn invoke(&self, toolbox: &Toolbox, args: &Value) -> Result<Value, ToolError>;
}

/// Metadata describing a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema of the arguments.
    pub parameters: Value,
}

impl ToolInfo {
    pub(crate) fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters(),
        }
    }
}

/// Deserialize tool arguments, treating `null` as an empty object so tools
/// whose arguments all have defaults can be called bare.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args.clone()
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArgument(format!("{tool}: {e}")))
}
