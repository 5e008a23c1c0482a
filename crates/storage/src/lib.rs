//! Macro definitions, settings and where they live on disk.

pub mod macros;
pub mod paths;
pub mod registry;
pub mod settings;

pub use macros::{Builtin, ConfigSource, JsonFile, JsonText, MacroFile};
pub use registry::{Layer, LoadError, Registry};
pub use settings::{NetworkSettings, Settings};
