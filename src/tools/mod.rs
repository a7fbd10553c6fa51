//! Named tools callable by agent frameworks with JSON arguments.
//!
//! Each tool wraps one [`Toolbox`](crate::Toolbox) operation, declares a JSON
//! schema for its arguments and returns a JSON value (usually an artifact
//! path). The [`ToolRegistry`] holds them by name.

mod api;
mod builtin;
mod registry;

pub use api::{parse_args, Tool, ToolInfo};
pub use builtin::{
    AlignReadsBwa, CallVariantsBcftools, GetSeedFilePath, SimulateDnaReadsPaired, SimulateMetabolomicsPeakList,
    SimulateMsSpectra, SimulateVariantsCoalescent,
};
pub use registry::ToolRegistry;
