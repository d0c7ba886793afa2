use crate::config::Syntax;
use crate::error::CompileError;
use crate::tree::{Mapping, Value};

/// The nested key/value context placeholders resolve against.
///
/// Written while the run is set up (parameter file, overrides), then only read.
/// The store owns the placeholder syntax, so keypaths written here and
/// keypaths inside tags always split on the same separator.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    root: Mapping,
    syntax: Syntax,
}

impl ParameterStore {
    pub fn new() -> Self {
        ParameterStore {
            root: Mapping::new(),
            syntax: Syntax::default(),
        }
    }

    pub fn from_mapping(root: Mapping) -> Self {
        ParameterStore {
            root,
            ..ParameterStore::new()
        }
    }

    /// Build a store from a parsed parameter document. `Null` (an empty
    /// file) gives an empty store; any other non-mapping is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Mapping(m) => Some(ParameterStore::from_mapping(m)),
            Value::Null => Some(ParameterStore::new()),
            _ => None,
        }
    }

    /// Use different markers for tags and keypaths, in `write`, `get` and
    /// every resolver built on this store.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Set the value at a dotted keypath, creating intermediate mappings as
    /// needed. Scalars found on the way are replaced by mappings, and the
    /// final key is overwritten whatever it held before.
    pub fn write(&mut self, keypath: &str, value: impl Into<Value>) -> Result<(), CompileError> {
        let keys = self.split_keypath(keypath)?;
        let (last, parents) = match keys.split_last() {
            Some(split) => split,
            None => {
                return Err(CompileError::InvalidKeypath {
                    keypath: keypath.to_string(),
                })
            }
        };

        let mut current = &mut self.root;
        for key in parents {
            current = current
                .entry(key.to_string())
                .or_insert(Value::Null)
                .ensure_mapping();
        }
        current.insert(last.to_string(), value.into());
        Ok(())
    }

    /// Apply a command-line override of the form `key.path=value`.
    /// The value is stored as a string.
    pub fn apply_override(&mut self, pair: &str) -> Result<(), CompileError> {
        match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => self
                .write(key, value)
                .map_err(|_| CompileError::InvalidOverride(pair.to_string())),
            _ => Err(CompileError::InvalidOverride(pair.to_string())),
        }
    }

    /// Look up the value at a keypath. Navigation stops at the first
    /// missing key or non-mapping value.
    pub fn get(&self, keypath: &str) -> Option<&Value> {
        let keys = self.split_keypath(keypath).ok()?;
        let (last, parents) = keys.split_last()?;
        let mut current = &self.root;
        for key in parents {
            current = current.get(*key)?.as_mapping()?;
        }
        current.get(*last)
    }

    fn split_keypath<'k>(&self, keypath: &'k str) -> Result<Vec<&'k str>, CompileError> {
        let keys: Vec<&str> = keypath.split(self.syntax.separator).collect();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(CompileError::InvalidKeypath {
                keypath: keypath.to_string(),
            });
        }
        Ok(keys)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
