/// Intermediate representation produced by the template parser.
/// Evaluation happens in `interpreter`, never during parsing.

/// A parsed template string.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// The original template text, kept for error messages.
    pub source: String,
    pub segments: Vec<Segment>,
}

/// One piece of a template, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text copied to the output verbatim.
    Text(String),
    /// `<>` — kept as-is in the output, never counts as a substitution.
    EmptyTag,
    /// `<a.b.c>`
    Tag(Tag),
}

/// A placeholder tag: `<` keypath `>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Text between the markers, exactly as written.
    pub raw: String,
    /// Key segments split on the separator. Never empty, no empty entries.
    pub keypath: Vec<String>,
    /// Byte offset of the start marker in the template.
    pub offset: usize,
}

impl Template {
    /// True when the template contains at least one keypath tag.
    pub fn has_tags(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Tag(_)))
    }
}
