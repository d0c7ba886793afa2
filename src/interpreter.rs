use crate::ast::*;
use crate::config::Syntax;
use crate::error::CompileError;
use crate::parser;
use crate::store::ParameterStore;
use crate::tree::Value;
use tracing::trace;

/// Ceiling on nested placeholder expansion (resolver recursion and
/// serializer re-passes alike).
pub const MAX_DEPTH: usize = 64;

/// Ceiling on the text one resolution may produce, in bytes.
pub const MAX_OUTPUT_LEN: usize = 1 << 20;

/// Outcome of resolving a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// At least one tag was substituted; holds the full output text.
    Resolved(String),
    /// No tag was substituted. Callers treat the template as literal text.
    NoPlaceholder,
}

impl Resolution {
    /// The substituted text, or `template` unchanged when nothing resolved.
    pub fn into_text(self, template: &str) -> String {
        match self {
            Resolution::Resolved(text) => text,
            Resolution::NoPlaceholder => template.to_string(),
        }
    }
}

/// Resolve `<keypath>` tags in `template` against `store`.
pub fn resolve(template: &str, store: &ParameterStore) -> Result<Resolution, CompileError> {
    Resolver::new(store).resolve(template)
}

/// Evaluates templates against a read-only parameter store.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a ParameterStore,
    syntax: Syntax,
}

impl<'a> Resolver<'a> {
    /// Markers come from the store.
    pub fn new(store: &'a ParameterStore) -> Self {
        Resolver {
            store,
            syntax: store.syntax(),
        }
    }

    pub fn resolve(&self, template: &str) -> Result<Resolution, CompileError> {
        let mut active = Vec::new();
        self.resolve_nested(template, &mut active)
    }

    /// `active` holds the keypaths being expanded on the current call
    /// stack, outermost first.
    fn resolve_nested(
        &self,
        template: &str,
        active: &mut Vec<String>,
    ) -> Result<Resolution, CompileError> {
        let parsed = parser::parse(template, &self.syntax)?;
        let mut out = String::with_capacity(template.len());
        let mut resolved_any = false;

        for segment in &parsed.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::EmptyTag => {
                    out.push(self.syntax.tag_start);
                    out.push(self.syntax.tag_end);
                }
                Segment::Tag(tag) => match self.lookup(&parsed, tag)? {
                    Some(value) => {
                        let text = self.render(&parsed, tag, value, active)?;
                        out.push_str(&text);
                        resolved_any = true;
                    }
                    None => out.push_str(&self.tag_text(tag)),
                },
            }
            if out.len() > MAX_OUTPUT_LEN {
                return Err(CompileError::OutputTooLarge {
                    template: template.to_string(),
                    limit: MAX_OUTPUT_LEN,
                });
            }
        }

        if resolved_any {
            trace!(template, resolved = %out, "resolved placeholders");
            Ok(Resolution::Resolved(out))
        } else {
            Ok(Resolution::NoPlaceholder)
        }
    }

    /// Follow a tag's keypath through the store.
    ///
    /// A missing key, or a `Null` value anywhere on the path, leaves the tag
    /// unresolved. Stepping into any other non-mapping value is an error.
    fn lookup(&self, template: &Template, tag: &Tag) -> Result<Option<&'a Value>, CompileError> {
        let (last, parents) = match tag.keypath.split_last() {
            Some(split) => split,
            None => return Ok(None),
        };

        let mut current = self.store.root();
        for key in parents {
            match current.get(key) {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::Mapping(m)) => current = m,
                Some(_) => {
                    return Err(CompileError::NonMappingNavigation {
                        template: template.source.clone(),
                        tag: self.tag_text(tag),
                        segment: key.clone(),
                    })
                }
            }
        }

        Ok(current.get(last).filter(|v| !v.is_null()))
    }

    /// Text for a found value. Strings that contain a start marker are
    /// themselves resolved against the same store.
    fn render(
        &self,
        template: &Template,
        tag: &Tag,
        value: &Value,
        active: &mut Vec<String>,
    ) -> Result<String, CompileError> {
        let nested = match value {
            Value::String(s) if s.contains(self.syntax.tag_start) => s,
            other => return Ok(other.plain_text()),
        };

        let key = tag.raw.clone();
        if let Some(pos) = active.iter().position(|k| *k == key) {
            let mut chain: Vec<String> = active[pos..]
                .iter()
                .map(|k| self.wrap(k))
                .collect();
            chain.push(self.wrap(&key));
            return Err(CompileError::Cycle {
                template: template.source.clone(),
                chain: chain.join(" -> "),
            });
        }
        if active.len() >= MAX_DEPTH {
            return Err(CompileError::DepthExceeded {
                template: template.source.clone(),
                limit: MAX_DEPTH,
            });
        }

        active.push(key);
        let result = self.resolve_nested(nested, active);
        active.pop();
        Ok(result?.into_text(nested))
    }

    fn tag_text(&self, tag: &Tag) -> String {
        self.wrap(&tag.raw)
    }

    fn wrap(&self, raw: &str) -> String {
        format!("{}{}{}", self.syntax.tag_start, raw, self.syntax.tag_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> ParameterStore {
        let mut store = ParameterStore::new();
        for (k, v) in pairs {
            store.write(k, *v).unwrap();
        }
        store
    }

    #[test]
    fn template_without_tags_is_no_placeholder() {
        let s = store(&[("k", "v")]);
        assert_eq!(resolve("plain text", &s).unwrap(), Resolution::NoPlaceholder);
        assert_eq!(resolve("", &s).unwrap(), Resolution::NoPlaceholder);
    }

    #[test]
    fn resolves_simple_and_nested_keys() {
        let s = store(&[("k", "v"), ("a.b", "deep")]);
        assert_eq!(
            resolve("<k>", &s).unwrap(),
            Resolution::Resolved("v".to_string())
        );
        assert_eq!(
            resolve("x <a.b> y", &s).unwrap(),
            Resolution::Resolved("x deep y".to_string())
        );
    }

    #[test]
    fn missing_key_renders_tag_and_does_not_count() {
        let s = store(&[("twee", "two")]);
        assert_eq!(
            resolve("zo <een> en <twee> test", &s).unwrap(),
            Resolution::Resolved("zo <een> en two test".to_string())
        );
        let only_missing = resolve("<missing>", &s).unwrap();
        assert_eq!(only_missing, Resolution::NoPlaceholder);
        assert_eq!(only_missing.into_text("<missing>"), "<missing>");
    }

    #[test]
    fn null_value_is_left_as_tag() {
        let mut s = ParameterStore::new();
        s.write("present", Value::Null).unwrap();
        s.write("ok", "yes").unwrap();
        assert_eq!(
            resolve("<present>/<ok>", &s).unwrap(),
            Resolution::Resolved("<present>/yes".to_string())
        );
        assert_eq!(resolve("<present.x>", &s).unwrap(), Resolution::NoPlaceholder);
    }

    #[test]
    fn navigating_past_scalar_is_error() {
        let s = store(&[("a", "scalar")]);
        let err = resolve("<a.b>", &s).unwrap_err();
        assert_eq!(err.code(), "non-mapping-navigation");
    }

    #[test]
    fn recursive_values_are_resolved() {
        let s = store(&[("a", "<b>"), ("b", "x")]);
        assert_eq!(
            resolve("<a>", &s).unwrap(),
            Resolution::Resolved("x".to_string())
        );
    }

    #[test]
    fn cycles_are_reported() {
        let s = store(&[("a", "<b>"), ("b", "<a>")]);
        match resolve("<a>", &s).unwrap_err() {
            CompileError::Cycle { chain, .. } => assert_eq!(chain, "<a> -> <b> -> <a>"),
            other => panic!("expected cycle, got {:?}", other),
        }

        let s = store(&[("self", "again <self>")]);
        assert_eq!(resolve("<self>", &s).unwrap_err().code(), "placeholder-cycle");
    }

    #[test]
    fn same_key_twice_in_one_template_is_not_a_cycle() {
        let s = store(&[("a", "<b>-<b>"), ("b", "x")]);
        assert_eq!(
            resolve("<a>:<a>", &s).unwrap(),
            Resolution::Resolved("x-x:x-x".to_string())
        );
    }

    #[test]
    fn deep_chains_hit_the_depth_ceiling() {
        let mut s = ParameterStore::new();
        for i in 0..=MAX_DEPTH + 1 {
            s.write(&format!("k{}", i), format!("<k{}>", i + 1)).unwrap();
        }
        assert_eq!(
            resolve("<k0>", &s).unwrap_err().code(),
            "placeholder-depth-exceeded"
        );
    }

    #[test]
    fn doubling_expansion_hits_the_length_ceiling() {
        let mut s = ParameterStore::new();
        for i in 0..24 {
            s.write(&format!("k{}", i), format!("<k{0}><k{0}>", i + 1)).unwrap();
        }
        s.write("k24", "x").unwrap();
        assert_eq!(resolve("<k4>", &s).unwrap().into_text("").len(), MAX_OUTPUT_LEN);
        assert_eq!(
            resolve("<k0>", &s).unwrap_err().code(),
            "placeholder-output-too-large"
        );
    }

    #[test]
    fn empty_tag_is_kept_and_does_not_count() {
        let s = store(&[("twee", "two")]);
        assert_eq!(resolve("zo <> test", &s).unwrap(), Resolution::NoPlaceholder);
        assert_eq!(
            resolve("zo <> en <twee> test", &s).unwrap(),
            Resolution::Resolved("zo <> en two test".to_string())
        );
    }

    #[test]
    fn non_string_values_use_plain_text() {
        let mut s = ParameterStore::new();
        s.write("port", 8080i64).unwrap();
        s.write("on", true).unwrap();
        assert_eq!(
            resolve("<port>/<on>", &s).unwrap(),
            Resolution::Resolved("8080/true".to_string())
        );
    }

    #[test]
    fn overrides_change_later_resolutions() {
        let mut s = store(&[("een", "one"), ("twee", "two")]);
        assert_eq!(
            resolve("zo <een> en <twee> test", &s).unwrap().into_text(""),
            "zo one en two test"
        );
        s.write("twee", "three").unwrap();
        assert_eq!(
            resolve("zo <een> en <twee> test", &s).unwrap().into_text(""),
            "zo one en three test"
        );
    }
}
