use crate::ast::*;
use crate::config::Syntax;
use crate::error::CompileError;

/// Parser state: tracks position in the template string.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
    syntax: &'a Syntax,
}

/// Parse a template string into literal text and placeholder tags.
pub fn parse(input: &str, syntax: &Syntax) -> Result<Template, CompileError> {
    let mut parser = Parser {
        input,
        pos: 0,
        syntax,
    };
    let mut segments = Vec::new();
    let mut text = String::new();

    while let Some(ch) = parser.peek_char() {
        if ch == syntax.tag_start {
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(parser.parse_tag()?);
        } else if ch == syntax.tag_end {
            return Err(CompileError::UnmatchedEnd {
                template: input.to_string(),
                offset: parser.pos,
            });
        } else {
            text.push(ch);
            parser.advance(ch.len_utf8());
        }
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    Ok(Template {
        source: input.to_string(),
        segments,
    })
}

impl<'a> Parser<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Text of the tag starting at `begin`, up to and including the next
    /// end marker (or the end of input).
    fn tag_text(&self, begin: usize) -> String {
        let rest = &self.input[begin..];
        match rest.find(self.syntax.tag_end) {
            Some(i) => rest[..i + self.syntax.tag_end.len_utf8()].to_string(),
            None => rest.to_string(),
        }
    }

    fn empty_segment(&self, begin: usize) -> CompileError {
        CompileError::EmptyKeySegment {
            template: self.input.to_string(),
            tag: self.tag_text(begin),
            offset: begin,
        }
    }

    // ── Tags ─────────────────────────────────────────────────────────

    /// Parse one tag. The current character is the start marker.
    fn parse_tag(&mut self) -> Result<Segment, CompileError> {
        let begin = self.pos;
        self.advance(self.syntax.tag_start.len_utf8());

        let mut raw = String::new();
        let mut key = String::new();
        let mut keypath = Vec::new();

        loop {
            let ch = match self.peek_char() {
                Some(ch) => ch,
                None => {
                    return Err(CompileError::Unterminated {
                        template: self.input.to_string(),
                        tag: self.input[begin..].to_string(),
                        offset: begin,
                    })
                }
            };

            if ch == self.syntax.tag_start {
                return Err(CompileError::NestedStart {
                    template: self.input.to_string(),
                    tag: self.input[begin..self.pos + ch.len_utf8()].to_string(),
                    offset: begin,
                });
            }

            if ch == self.syntax.tag_end {
                self.advance(ch.len_utf8());
                if raw.is_empty() {
                    return Ok(Segment::EmptyTag);
                }
                if key.is_empty() {
                    return Err(self.empty_segment(begin));
                }
                keypath.push(key);
                return Ok(Segment::Tag(Tag {
                    raw,
                    keypath,
                    offset: begin,
                }));
            }

            if ch == self.syntax.separator {
                if key.is_empty() {
                    return Err(self.empty_segment(begin));
                }
                keypath.push(std::mem::take(&mut key));
            } else {
                key.push(ch);
            }
            raw.push(ch);
            self.advance(ch.len_utf8());
        }
    }
}
