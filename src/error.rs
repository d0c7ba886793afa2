use std::path::PathBuf;

use thiserror::Error;

/// A fatal error raised while resolving placeholders or compiling a document.
///
/// Missing keys are not errors; they render back as their own tag text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Placeholder start marker inside placeholder '{tag}' in string '{template}'")]
    NestedStart {
        template: String,
        tag: String,
        offset: usize,
    },

    #[error("Placeholder end marker without matching start marker in string '{template}'")]
    UnmatchedEnd { template: String, offset: usize },

    #[error("Illegal placeholder '{tag}' (empty key segment) in string '{template}'")]
    EmptyKeySegment {
        template: String,
        tag: String,
        offset: usize,
    },

    #[error("Placeholder '{tag}' is never closed in string '{template}'")]
    Unterminated {
        template: String,
        tag: String,
        offset: usize,
    },

    #[error("Cannot navigate placeholder '{tag}' past non-mapping value at key '{segment}' in string '{template}'")]
    NonMappingNavigation {
        template: String,
        tag: String,
        segment: String,
    },

    #[error("Placeholder cycle {chain} in string '{template}'")]
    Cycle { template: String, chain: String },

    #[error("Placeholder expansion nested deeper than {limit} levels in string '{template}'")]
    DepthExceeded { template: String, limit: usize },

    #[error("Placeholder expansion longer than {limit} bytes in string '{template}'")]
    OutputTooLarge { template: String, limit: usize },

    #[error("Arguments of command '{command}' must be a mapping")]
    InvalidArguments { command: String },

    #[error("Invalid keypath '{keypath}': empty key segment")]
    InvalidKeypath { keypath: String },

    #[error("Invalid override '{0}': expected key.path=value")]
    InvalidOverride(String),
}

impl CompileError {
    /// Stable machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::NestedStart { .. } => "nested-start-marker",
            CompileError::UnmatchedEnd { .. } => "unmatched-end-marker",
            CompileError::EmptyKeySegment { .. } => "empty-key-segment",
            CompileError::Unterminated { .. } => "unterminated-placeholder",
            CompileError::NonMappingNavigation { .. } => "non-mapping-navigation",
            CompileError::Cycle { .. } => "placeholder-cycle",
            CompileError::DepthExceeded { .. } => "placeholder-depth-exceeded",
            CompileError::OutputTooLarge { .. } => "placeholder-output-too-large",
            CompileError::InvalidArguments { .. } => "invalid-arguments",
            CompileError::InvalidKeypath { .. } => "invalid-keypath",
            CompileError::InvalidOverride(_) => "invalid-override",
        }
    }
}

/// Errors from reading input and parameter files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Parameter file {} must contain a mapping at its root", .0.display())]
    ParamsNotMapping(PathBuf),
}

/// Failure while writing a compiled script to a sink.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Error writing output: {0}")]
    Io(#[from] std::io::Error),
}
