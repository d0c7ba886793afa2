/// Markers of the placeholder mini-language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    pub tag_start: char,
    pub tag_end: char,
    pub separator: char,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            tag_start: '<',
            tag_end: '>',
            separator: '.',
        }
    }
}

/// Reserved keys that mark a mapping as a command node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Key holding the command name (`cmd`).
    pub command: String,
    /// Key holding the arguments mapping (`args`).
    pub arguments: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            command: "cmd".to_string(),
            arguments: "args".to_string(),
        }
    }
}

/// Compiler settings. Placeholder markers live on the `ParameterStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub labels: Labels,
}
