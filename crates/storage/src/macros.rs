//! On-disk macro definition format.
//!
//! ```json
//! { "layers": [
//!     { "name": "media",
//!       "keys": {
//!         "2": { "type": "control_code", "value": "PLAY_PAUSE", "color": "COLOR_GREEN" },
//!         "14": { "type": "sequence", "value": [["GUI", "X"], "U", "S"], "color": "0,0,32" }
//!       } }
//! ] }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use actions::{ActionKind, Chord, ConsumerCode, CustomOp, KeyCode, MacroAction};
use app_core::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::LoadError;

const BUILTIN_MACROS: &str = include_str!("../assets/macros.default.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroFile {
    pub layers: Vec<RawLayer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLayer {
    #[serde(default)]
    pub name: Option<String>,
    /// Key index (as a string, JSON objects only have string keys) to macro.
    #[serde(default)]
    pub keys: BTreeMap<String, RawMacro>,
}

/// Entry fields are kept as raw JSON so that shape errors are reported with
/// their layer and key instead of failing the whole file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMacro {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    /// `[r, g, b]`, `"r,g,b"` or a palette name such as `"COLOR_BLUE"`.
    #[serde(default)]
    pub color: Option<Value>,
}

fn parse_color(value: &Value) -> Result<Color, String> {
    match value {
        Value::String(s) => s.parse::<Color>().map_err(|e| e.to_string()),
        Value::Array(items) if items.len() == 3 => {
            let mut rgb = [0u8; 3];
            for (slot, item) in rgb.iter_mut().zip(items) {
                *slot = item
                    .as_u64()
                    .and_then(|c| u8::try_from(c).ok())
                    .ok_or_else(|| format!("color component {item} is not in 0..=255"))?;
            }
            Ok(Color::from(rgb))
        }
        other => Err(format!("expected a color name, \"r,g,b\" or [r, g, b], got {other}")),
    }
}

/// Where macro definitions come from. Read once per load.
pub trait ConfigSource {
    fn describe(&self) -> String;
    fn read(&self) -> Result<MacroFile, LoadError>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFile(pub PathBuf);

impl ConfigSource for JsonFile {
    fn describe(&self) -> String {
        self.0.display().to_string()
    }

    fn read(&self) -> Result<MacroFile, LoadError> {
        read_macro_file(&self.0)
    }
}

/// JSON text already in memory.
#[derive(Debug, Clone)]
pub struct JsonText(pub String);

impl ConfigSource for JsonText {
    fn describe(&self) -> String {
        "inline JSON".to_string()
    }

    fn read(&self) -> Result<MacroFile, LoadError> {
        Ok(serde_json::from_str(&self.0)?)
    }
}

/// The table compiled into the binary: media, applications, system and utility layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtin;

impl ConfigSource for Builtin {
    fn describe(&self) -> String {
        "built-in macros".to_string()
    }

    fn read(&self) -> Result<MacroFile, LoadError> {
        Ok(serde_json::from_str(BUILTIN_MACROS)?)
    }
}

pub fn read_macro_file(path: &Path) -> Result<MacroFile, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Turns one raw entry into an action, or explains what is wrong with it.
pub fn parse_macro(raw: &RawMacro) -> Result<MacroAction, String> {
    let color = parse_color(raw.color.as_ref().ok_or_else(|| "missing color".to_string())?)?;
    let kind = raw.kind.as_ref().ok_or_else(|| "missing type".to_string())?;
    let kind = kind
        .as_str()
        .ok_or_else(|| format!("type must be a string, got {kind}"))?;
    let value = raw.value.as_ref().ok_or_else(|| "missing value".to_string())?;

    let action = match kind {
        "control_code" => ActionKind::ControlCode(parse_code::<ConsumerCode>(value)?),
        "text" => ActionKind::Text(as_str(value)?.to_string()),
        "combo" => ActionKind::Combo(parse_chord(value)?.0),
        "sequence" => {
            let items = value
                .as_array()
                .ok_or_else(|| "sequence value must be an array".to_string())?;
            if items.is_empty() {
                return Err("sequence is empty".to_string());
            }
            ActionKind::Sequence(items.iter().map(parse_chord).collect::<Result<_, _>>()?)
        }
        "custom" => ActionKind::Custom(
            serde_json::from_value::<CustomOp>(value.clone())
                .map_err(|e| format!("unknown custom operation {value}: {e}"))?,
        ),
        "search" => {
            let query = as_str(value)?;
            if query.trim().is_empty() {
                return Err("search query is empty".to_string());
            }
            ActionKind::Search(query.to_string())
        }
        other => return Err(format!("unknown type {other:?}")),
    };

    Ok(MacroAction::new(action, color))
}

fn as_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {value}"))
}

fn parse_code<T: std::str::FromStr>(value: &Value) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    as_str(value)?.parse::<T>().map_err(|e| e.to_string())
}

/// `"A"` or `["CONTROL", "A"]`.
fn parse_chord(value: &Value) -> Result<Chord, String> {
    match value {
        Value::String(_) => Ok(Chord::single(parse_code::<KeyCode>(value)?)),
        Value::Array(items) if !items.is_empty() => Ok(Chord(
            items.iter().map(parse_code::<KeyCode>).collect::<Result<_, _>>()?,
        )),
        Value::Array(_) => Err("key combination is empty".to_string()),
        other => Err(format!("expected a key name or list of key names, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawMacro {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn parses_every_kind() {
        let cases = [
            (
                json!({"type": "control_code", "value": "MUTE", "color": "COLOR_RED"}),
                ActionKind::ControlCode(ConsumerCode::Mute),
            ),
            (
                json!({"type": "text", "value": "hi", "color": [1, 2, 3]}),
                ActionKind::Text("hi".into()),
            ),
            (
                json!({"type": "combo", "value": ["CONTROL", "SHIFT", "ESCAPE"], "color": "0,32,0"}),
                ActionKind::Combo(vec![KeyCode::LeftControl, KeyCode::LeftShift, KeyCode::Escape]),
            ),
            (
                json!({"type": "sequence", "value": [["GUI", "X"], "U"], "color": "COLOR_BLUE"}),
                ActionKind::Sequence(vec![
                    Chord(vec![KeyCode::LeftGui, KeyCode::X]),
                    Chord::single(KeyCode::U),
                ]),
            ),
            (
                json!({"type": "custom", "value": {"switch_layer": 3}, "color": "COLOR_GREY"}),
                ActionKind::Custom(CustomOp::SwitchLayer(3)),
            ),
            (
                json!({"type": "search", "value": "steam", "color": "0,0,16"}),
                ActionKind::Search("steam".into()),
            ),
        ];

        for (input, expected) in cases {
            let action = parse_macro(&raw(input)).unwrap();
            assert_eq!(action.kind, expected);
        }
    }

    #[test]
    fn colors_resolve_once() {
        let a = parse_macro(&raw(json!({"type": "text", "value": "x", "color": "COLOR_PURPLE"}))).unwrap();
        assert_eq!(a.color, Color::PURPLE);
        let b = parse_macro(&raw(json!({"type": "text", "value": "x", "color": [9, 8, 7]}))).unwrap();
        assert_eq!(b.color, Color::new(9, 8, 7));
    }

    #[test]
    fn rejects_incomplete_or_unknown_entries() {
        let bad = [
            json!({"type": "text", "value": "no colour"}),
            json!({"value": "x", "color": "COLOR_RED"}),
            json!({"type": "text", "color": "COLOR_RED"}),
            json!({"type": "teleport", "value": "x", "color": "COLOR_RED"}),
            json!({"type": "combo", "value": [], "color": "COLOR_RED"}),
            json!({"type": "combo", "value": ["CONTROL", "HYPER"], "color": "COLOR_RED"}),
            json!({"type": "sequence", "value": [], "color": "COLOR_RED"}),
            json!({"type": "custom", "value": "self_destruct", "color": "COLOR_RED"}),
            json!({"type": "search", "value": "  ", "color": "COLOR_RED"}),
            json!({"type": "text", "value": "x", "color": "COLOR_PINK"}),
            json!({"type": "text", "value": "x", "color": [300, 0, 0]}),
            json!({"type": "text", "value": "x", "color": [1, 2]}),
            json!({"type": "text", "value": "x", "color": "1,2,300"}),
            json!({"type": "text", "value": "x", "color": true}),
            json!({"type": 7, "value": "x", "color": "COLOR_RED"}),
        ];
        for input in bad {
            assert!(parse_macro(&raw(input.clone())).is_err(), "accepted {input}");
        }
    }

    #[test]
    fn builtin_table_parses() {
        let file = Builtin.read().unwrap();
        assert_eq!(file.layers.len(), 4);
        for layer in &file.layers {
            for (key, m) in &layer.keys {
                parse_macro(m).unwrap_or_else(|e| panic!("key {key}: {e}"));
            }
        }
    }
}
