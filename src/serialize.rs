use std::sync::OnceLock;

use regex::Regex;

use crate::error::CompileError;
use crate::interpreter::{Resolution, Resolver, MAX_DEPTH};
use crate::tree::{Mapping, Value};

fn integer_literal() -> &'static Regex {
    static INT: OnceLock<Regex> = OnceLock::new();
    INT.get_or_init(|| Regex::new(r"^[0-9]+[lL]?$").expect("integer literal pattern is valid"))
}

/// Quote a string unless the command grammar reads it as a boolean or integer.
pub fn quote_if_text(s: &str) -> String {
    if s == "true" || s == "false" || integer_literal().is_match(s) {
        s.to_string()
    } else {
        format!("\"{}\"", s)
    }
}

/// Normalize a resolved key into a path segment: `key` becomes `key=key`,
/// anything already holding an `=` is used as written.
pub fn path_segment(key: &str) -> String {
    if key.contains('=') {
        key.to_string()
    } else {
        format!("{0}={0}", key)
    }
}

/// Renders values in the command grammar, resolving placeholders in strings.
#[derive(Debug, Clone, Copy)]
pub struct ValueSerializer<'a> {
    resolver: Resolver<'a>,
}

impl<'a> ValueSerializer<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        ValueSerializer { resolver }
    }

    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    pub fn serialize(&self, value: &Value) -> Result<String, CompileError> {
        match value {
            Value::String(s) => self.serialize_string(s, 0),
            Value::Mapping(m) => Ok(format!("{{{}}}", self.serialize_entries(m)?)),
            Value::Sequence(items) => {
                let items = items
                    .iter()
                    .map(|item| self.serialize(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", items.join(",")))
            }
            Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => {
                Ok(value.plain_text())
            }
        }
    }

    /// `k1=v1,k2=v2` for a mapping, without the surrounding braces.
    pub fn serialize_entries(&self, mapping: &Mapping) -> Result<String, CompileError> {
        let entries = mapping
            .iter()
            .map(|(k, v)| Ok(format!("{}={}", k, self.serialize(v)?)))
            .collect::<Result<Vec<String>, CompileError>>()?;
        Ok(entries.join(","))
    }

    /// Resolve a mapping key and normalize it into a path segment.
    pub fn serialize_key(&self, key: &str) -> Result<String, CompileError> {
        let resolved = self.resolver.resolve(key)?.into_text(key);
        Ok(path_segment(&resolved))
    }

    /// Resolved strings are serialized again until a pass substitutes nothing.
    fn serialize_string(&self, s: &str, depth: usize) -> Result<String, CompileError> {
        match self.resolver.resolve(s)? {
            Resolution::Resolved(text) => {
                if depth >= MAX_DEPTH {
                    return Err(CompileError::DepthExceeded {
                        template: s.to_string(),
                        limit: MAX_DEPTH,
                    });
                }
                self.serialize_string(&text, depth + 1)
            }
            Resolution::NoPlaceholder => Ok(quote_if_text(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ParameterStore;

    fn with_store<R>(store: &ParameterStore, f: impl FnOnce(ValueSerializer<'_>) -> R) -> R {
        f(ValueSerializer::new(Resolver::new(store)))
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(quote_if_text("42"), "42");
        assert_eq!(quote_if_text("42L"), "42L");
        assert_eq!(quote_if_text("7l"), "7l");
        assert_eq!(quote_if_text("true"), "true");
        assert_eq!(quote_if_text("false"), "false");
        assert_eq!(quote_if_text("True"), "\"True\"");
        assert_eq!(quote_if_text("abc"), "\"abc\"");
        assert_eq!(quote_if_text("-1"), "\"-1\"");
        assert_eq!(quote_if_text("1.5"), "\"1.5\"");
        assert_eq!(quote_if_text("L"), "\"L\"");
        assert_eq!(quote_if_text(""), "\"\"");
    }

    #[test]
    fn typed_scalars_are_never_quoted() {
        let store = ParameterStore::new();
        with_store(&store, |s| {
            assert_eq!(s.serialize(&Value::Integer(42)).unwrap(), "42");
            assert_eq!(s.serialize(&Value::Bool(true)).unwrap(), "true");
            assert_eq!(s.serialize(&Value::Float(0.5)).unwrap(), "0.5");
            assert_eq!(s.serialize(&Value::Null).unwrap(), "undefined");
            assert_eq!(s.serialize(&Value::from("42")).unwrap(), "42");
            assert_eq!(s.serialize(&Value::from("abc")).unwrap(), "\"abc\"");
        });
    }

    #[test]
    fn collections_use_braces_and_brackets() {
        let store = ParameterStore::new();
        let mut inner = Mapping::new();
        inner.insert("a".to_string(), Value::Integer(1));
        inner.insert("b".to_string(), Value::from("two"));
        let list = Value::Sequence(vec![Value::from("x"), Value::Mapping(inner.clone())]);
        with_store(&store, |s| {
            assert_eq!(s.serialize(&Value::Mapping(inner)).unwrap(), "{a=1,b=\"two\"}");
            assert_eq!(s.serialize(&list).unwrap(), "[\"x\",{a=1,b=\"two\"}]");
            assert_eq!(s.serialize(&Value::Sequence(vec![])).unwrap(), "[]");
        });
    }

    #[test]
    fn resolved_strings_are_requoted() {
        let mut store = ParameterStore::new();
        store.write("host", "localhost").unwrap();
        store.write("port", "8080").unwrap();
        store.write("url", "http://<host>:<port>").unwrap();
        with_store(&store, |s| {
            assert_eq!(s.serialize(&Value::from("<host>")).unwrap(), "\"localhost\"");
            assert_eq!(s.serialize(&Value::from("<port>")).unwrap(), "8080");
            assert_eq!(
                s.serialize(&Value::from("<url>")).unwrap(),
                "\"http://localhost:8080\""
            );
            assert_eq!(s.serialize(&Value::from("<nope>")).unwrap(), "\"<nope>\"");
        });
    }

    #[test]
    fn keys_become_path_segments() {
        let mut store = ParameterStore::new();
        store.write("ds", "ExampleDS").unwrap();
        with_store(&store, |s| {
            assert_eq!(s.serialize_key("subsystem").unwrap(), "subsystem=subsystem");
            assert_eq!(
                s.serialize_key("subsystem=datasources").unwrap(),
                "subsystem=datasources"
            );
            assert_eq!(
                s.serialize_key("data-source=<ds>").unwrap(),
                "data-source=ExampleDS"
            );
            assert_eq!(s.serialize_key("<ds>").unwrap(), "ExampleDS=ExampleDS");
            assert_eq!(s.serialize_key("<missing>").unwrap(), "<missing>=<missing>");
        });
    }

    #[test]
    fn self_referencing_mapping_hits_the_depth_ceiling() {
        let mut store = ParameterStore::new();
        store.write("m.x", "<m>").unwrap();
        with_store(&store, |s| {
            assert_eq!(
                s.serialize(&Value::from("<m>")).unwrap_err().code(),
                "placeholder-depth-exceeded"
            );
        });
    }

    #[test]
    fn malformed_key_is_fatal() {
        let store = ParameterStore::new();
        with_store(&store, |s| {
            assert_eq!(
                s.serialize_key("bad<.x>").unwrap_err().code(),
                "empty-key-segment"
            );
        });
    }
}
