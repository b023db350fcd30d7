use crate::parser::ParseErr;

#[derive(Debug, Clone, PartialEq)]
pub enum CompileErrorKind {
    /// The pattern could not be tokenized.
    Parse(ParseErr),
    /// A token that neither builder compiles, such as an anchor.
    UnrecognizedToken,
    /// An unbounded repetition the DFA builder cannot expand.
    UnsupportedRepetition,
    /// A repetition whose upper bound is below its lower bound.
    InvalidRepetitionRange,
    /// A character class matching no code points.
    EmptyCharClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    /// The type of triggered error.
    kind: CompileErrorKind,
    /// Additional error data.
    data: Option<String>,
}

impl CompileError {
    /// Instantiates a new error.
    pub fn new(kind: CompileErrorKind) -> Self {
        Self { kind, data: None }
    }

    /// Associates additional data with the error, returning the modified error.
    pub fn with_data(mut self, data: String) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (data, padding) = if let Some(data) = &self.data {
            (data.as_str(), ": ")
        } else {
            ("", "")
        };

        match &self.kind {
            CompileErrorKind::Parse(err) => write!(f, "{}{}{}", err, padding, data),
            CompileErrorKind::UnrecognizedToken => {
                write!(f, "unrecognized token{}{}", padding, data)
            }
            CompileErrorKind::UnsupportedRepetition => {
                write!(f, "repetition cannot be expanded{}{}", padding, data)
            }
            CompileErrorKind::InvalidRepetitionRange => {
                write!(f, "invalid repetition range{}{}", padding, data)
            }
            CompileErrorKind::EmptyCharClass => {
                write!(f, "character class is empty{}{}", padding, data)
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<ParseErr> for CompileError {
    fn from(err: ParseErr) -> Self {
        Self::new(CompileErrorKind::Parse(err))
    }
}
