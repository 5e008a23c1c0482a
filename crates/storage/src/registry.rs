use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use actions::MacroAction;
use app_core::keys;
use thiserror::Error;
use tracing::{debug, warn};

use crate::macros::{parse_macro, ConfigSource, JsonText, MacroFile, RawLayer};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed macro file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid macro definition at {location}: {reason}")]
    InvalidDefinition { location: String, reason: String },
}

impl LoadError {
    fn invalid(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// One logical keymap. Never contains navigation keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub name: Option<String>,
    pub actions: BTreeMap<u8, MacroAction>,
}

impl Layer {
    pub fn get(&self, key: u8) -> Option<&MacroAction> {
        self.actions.get(&key)
    }

    fn from_raw(index: usize, raw: &RawLayer) -> Result<Self, LoadError> {
        let mut actions = BTreeMap::new();
        for (key_text, entry) in &raw.keys {
            let location = format!("layer {index} key {key_text}");
            let key: u8 = key_text
                .trim()
                .parse()
                .ok()
                .filter(|k| keys::is_valid(*k))
                .ok_or_else(|| {
                    LoadError::invalid(&location, format!("key must be 0..{}", keys::KEY_COUNT))
                })?;

            if actions.contains_key(&key) {
                return Err(LoadError::invalid(&location, format!("key {key} is defined twice")));
            }

            if keys::is_nav_key(key) {
                warn!(layer = index, key, "navigation keys cannot carry macros; entry ignored");
                continue;
            }

            let action = parse_macro(entry).map_err(|reason| LoadError::invalid(&location, reason))?;
            actions.insert(key, action);
        }

        Ok(Self {
            name: raw.name.clone().filter(|n| !n.trim().is_empty()),
            actions,
        })
    }
}

/// Immutable set of layers. Replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    layers: Vec<Layer>,
}

impl Registry {
    pub fn load(source: &dyn ConfigSource) -> Result<Self, LoadError> {
        let file = source.read()?;
        let registry = Self::from_file(&file)?;
        debug!(
            source = %source.describe(),
            layers = registry.layer_count(),
            "macro registry loaded"
        );
        Ok(registry)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Self::load(&JsonText(json.to_string()))
    }

    pub fn from_file(file: &MacroFile) -> Result<Self, LoadError> {
        if file.layers.is_empty() {
            return Err(LoadError::invalid("layers", "at least one layer is required"));
        }

        let layers = file
            .layers
            .iter()
            .enumerate()
            .map(|(i, raw)| Layer::from_raw(i, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { layers })
    }

    /// A single layer with no macros, used when nothing could be loaded.
    pub fn placeholder() -> Self {
        Self {
            layers: vec![Layer::default()],
        }
    }

    pub fn get_action(&self, layer: usize, key: u8) -> Option<&MacroAction> {
        self.layers.get(layer)?.get(key)
    }

    pub fn layer(&self, layer: usize) -> Option<&Layer> {
        self.layers.get(layer)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Always at least 1.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_name(&self, layer: usize) -> Option<&str> {
        self.layers.get(layer)?.name.as_deref()
    }
}
