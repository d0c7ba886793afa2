use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;
use crate::store::ParameterStore;
use crate::tree::Value;

/// Parse YAML text into a document tree.
///
/// A stream holding several `---` documents becomes one sequence of their
/// roots, so each is walked in turn. A single document is returned as-is.
pub fn parse_document(input: &str) -> Result<Value, serde_yaml::Error> {
    let mut roots = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(input) {
        roots.push(Value::from_yaml(serde_yaml::Value::deserialize(doc)?));
    }
    if roots.len() == 1 {
        Ok(roots.remove(0))
    } else {
        Ok(Value::Sequence(roots))
    }
}

/// Read and parse a YAML document from disk.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let text = read(path)?;
    let value = parse_document(&text).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded document");
    Ok(value)
}

/// Read a parameter file. Its root must be a mapping (or empty).
pub fn load_params(path: &Path) -> Result<ParameterStore, LoadError> {
    let value = load_document(path)?;
    ParameterStore::from_value(value)
        .ok_or_else(|| LoadError::ParamsNotMapping(path.to_path_buf()))
}

fn read(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
