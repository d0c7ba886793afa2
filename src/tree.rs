use indexmap::IndexMap;

/// An ordered string-keyed mapping. Iteration follows insertion order,
/// which for parsed documents is source order.
pub type Mapping = IndexMap<String, Value>;

/// A node in a document tree or a parameter store.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Mapping(Mapping),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Get or create the mapping held by this value, replacing any scalar.
    pub fn ensure_mapping(&mut self) -> &mut Mapping {
        if !matches!(self, Value::Mapping(_)) {
            *self = Value::Mapping(Mapping::new());
        }
        match self {
            Value::Mapping(m) => m,
            _ => unreachable!(),
        }
    }

    /// Natural textual form, without quoting or placeholder resolution.
    ///
    /// Collections use the command grammar: `{k=v,...}` and `[a,b]`.
    pub fn plain_text(&self) -> String {
        match self {
            Value::Null => "undefined".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Mapping(m) => {
                let entries: Vec<String> = m
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v.plain_text()))
                    .collect();
                format!("{{{}}}", entries.join(","))
            }
            Value::Sequence(items) => {
                let items: Vec<String> = items.iter().map(Value::plain_text).collect();
                format!("[{}]", items.join(","))
            }
        }
    }

    /// Convert a parsed YAML value. Non-string mapping keys become their
    /// plain text; YAML tags are dropped and their inner value kept.
    pub fn from_yaml(yaml: serde_yaml::Value) -> Value {
        match yaml {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    // Beyond i64: keep the digits, they still match the integer pattern.
                    Value::String(u.to_string())
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(yaml_key(k), Value::from_yaml(v));
                }
                Value::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => Value::from_yaml(other).plain_text(),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}
