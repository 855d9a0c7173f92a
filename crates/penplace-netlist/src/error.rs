use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetlistError {
    /// A data line without enough node tokens after its reference.
    #[error("line {line}: malformed component line '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: duplicate reference '{reference}'")]
    DuplicateReference { line: usize, reference: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetlistError {
    /// True for syntax errors in the netlist text itself.
    pub fn is_parse(&self) -> bool {
        matches!(self, NetlistError::MalformedLine { .. })
    }
}
