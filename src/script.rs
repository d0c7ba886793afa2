use std::io::Write;

use tracing::{debug, info};

use crate::config::{Labels, Options};
use crate::error::{CompileError, ProcessError};
use crate::interpreter::Resolver;
use crate::serialize::ValueSerializer;
use crate::store::ParameterStore;
use crate::tree::{Mapping, Value};

/// Walks a document tree and emits one addressed command line per command node.
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    serializer: ValueSerializer<'a>,
    labels: Labels,
}

impl<'a> Compiler<'a> {
    pub fn new(store: &'a ParameterStore, options: &Options) -> Self {
        let resolver = Resolver::new(store);
        Compiler {
            serializer: ValueSerializer::new(resolver),
            labels: options.labels.clone(),
        }
    }

    /// Compile a document into the full script text, one `\n`-terminated
    /// line per command node.
    pub fn compile(&self, document: &Value) -> Result<String, CompileError> {
        let mut script = String::new();
        for line in self.compile_lines(document)? {
            script.push_str(&line);
            script.push('\n');
        }
        Ok(script)
    }

    /// Command lines for `document`, in document order, without terminators.
    pub fn compile_lines(&self, document: &Value) -> Result<Vec<String>, CompileError> {
        let mut lines = Vec::new();
        let mut path = Vec::new();
        self.walk(document, &mut path, &mut lines)?;
        info!(lines = lines.len(), "compiled document");
        Ok(lines)
    }

    /// Compile `document` and write the script to `sink`. Nothing is
    /// written when compilation fails. Returns the number of lines written.
    pub fn process<W: Write>(
        &self,
        document: &Value,
        sink: &mut W,
    ) -> Result<usize, ProcessError> {
        let lines = self.compile_lines(document)?;
        for line in &lines {
            writeln!(sink, "{}", line)?;
        }
        Ok(lines.len())
    }

    /// A mapping is a command when it holds a non-null command label.
    pub fn is_command(&self, mapping: &Mapping) -> bool {
        mapping
            .get(&self.labels.command)
            .is_some_and(|v| !v.is_null())
    }

    fn walk(
        &self,
        node: &Value,
        path: &mut Vec<String>,
        out: &mut Vec<String>,
    ) -> Result<(), CompileError> {
        match node {
            // A list fans out: every item shares the current address.
            Value::Sequence(items) => {
                for item in items {
                    self.walk(item, path, out)?;
                }
            }
            Value::Mapping(m) if self.is_command(m) => {
                let line = self.command_line(path, m)?;
                debug!(%line, "emit command");
                out.push(line);
            }
            Value::Mapping(m) => {
                for (key, value) in m {
                    path.push(self.serializer.serialize_key(key)?);
                    self.walk(value, path, out)?;
                    path.pop();
                }
            }
            Value::Null
            | Value::Bool(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::String(_) => {}
        }
        Ok(())
    }

    /// `/seg1/seg2:name(arg=value,...)`
    fn command_line(&self, path: &[String], command: &Mapping) -> Result<String, CompileError> {
        let mut line = String::new();
        for segment in path {
            line.push('/');
            line.push_str(segment);
        }

        let name = match command.get(&self.labels.command) {
            Some(value) => self.command_name(value)?,
            None => String::new(),
        };
        line.push(':');
        line.push_str(&name);

        match command.get(&self.labels.arguments) {
            None | Some(Value::Null) => {}
            Some(Value::Mapping(args)) => {
                line.push('(');
                line.push_str(&self.serializer.serialize_entries(args)?);
                line.push(')');
            }
            Some(_) => return Err(CompileError::InvalidArguments { command: name }),
        }
        Ok(line)
    }

    fn command_name(&self, value: &Value) -> Result<String, CompileError> {
        match value {
            Value::String(s) => Ok(self.serializer.resolver().resolve(s)?.into_text(s)),
            other => Ok(other.plain_text()),
        }
    }
}
