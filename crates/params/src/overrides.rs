//! Runtime override layers.
//!
//! Overrides arrive as text, either a JSON object `{"KeyName": value, ...}` or `KeyName=value`
//! assignments, and become an ordinary [`Layer`] of constant rules placed on top of a preset.
//! Every value is decoded into the key's own type before the layer is built, so a bad override
//! fails here instead of during resolution.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::{ParamError, Result};
use crate::params::{ConfigStack, KeyRegistry, Layer};

/// Builds a layer from a JSON object of key names to values.
///
/// # Errors
///
/// Returns [`ParamError::UnknownKey`] for a name the registry does not know and
/// [`ParamError::Decode`] for a value of the wrong shape or for a document that is not an
/// object.
pub fn from_json(
    name: &str,
    registry: &KeyRegistry,
    document: serde_json::Value,
) -> Result<Layer> {
    let serde_json::Value::Object(entries) = document else {
        return Err(ParamError::Decode {
            key: name.to_string(),
            source: serde::de::Error::custom("override document must be a JSON object"),
        });
    };

    let mut layer = Layer::new(name);
    for (key_name, value) in entries {
        let key = registry.require(&key_name)?;
        let decoded = key.decode(value)?;
        debug!(layer = name, key = key.name(), "override decoded");
        layer = layer.set_erased(key, decoded);
    }
    Ok(layer)
}

/// Reads a JSON override file into a layer named after the file.
///
/// # Errors
///
/// Returns [`ParamError::Io`] if the file cannot be read, plus everything [`from_json`] returns.
pub fn load_file(path: &Path, registry: &KeyRegistry) -> Result<Layer> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| ParamError::Io {
        path: display.clone(),
        source,
    })?;
    let document = serde_json::from_str(&text).map_err(|source| ParamError::Decode {
        key: display.clone(),
        source,
    })?;
    from_json(&display, registry, document)
}

/// Builds a layer from `KeyName=value` assignments.
///
/// The value is parsed as JSON; text that is not valid JSON is taken as a string, so
/// `ReplacementPolicy=PLRU` and `ReplacementPolicy="PLRU"` are equivalent. Later assignments
/// to the same key win.
///
/// # Errors
///
/// Returns [`ParamError::Assignment`] for text without `=`, plus everything [`from_json`]
/// returns.
pub fn from_assignments(
    name: &str,
    registry: &KeyRegistry,
    assignments: &[String],
) -> Result<Layer> {
    let mut document = serde_json::Map::new();
    for assignment in assignments {
        let Some((key, raw)) = assignment.split_once('=') else {
            return Err(ParamError::Assignment {
                text: assignment.clone(),
            });
        };
        let value = serde_json::from_str(raw.trim())
            .unwrap_or_else(|_| serde_json::Value::String(raw.trim().to_string()));
        let _ = document.insert(key.trim().to_string(), value);
    }
    from_json(name, registry, serde_json::Value::Object(document))
}

/// Places an override file and then command-line assignments on top of `stack`.
///
/// The assignments layer, named `CommandLine`, ends up outermost, so `--set` beats the file and
/// the file beats the preset.
///
/// # Errors
///
/// Everything [`load_file`] and [`from_assignments`] return.
pub fn apply(
    mut stack: ConfigStack,
    registry: &KeyRegistry,
    file: Option<&Path>,
    assignments: &[String],
) -> Result<ConfigStack> {
    if let Some(path) = file {
        stack = stack.alter(load_file(path, registry)?);
    }
    if !assignments.is_empty() {
        stack = stack.alter(from_assignments("CommandLine", registry, assignments)?);
    }
    debug!(stack = %stack, layers = stack.len(), "overrides applied");
    Ok(stack)
}
