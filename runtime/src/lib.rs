//! Provides the finite-state recognizers produced by `lexer-compiler` along
//! with the reader-facing operations a lexer needs to walk them.
//!
//! Two encodings are exposed:
//!
//! - [Nfa]: range-labelled edges with epsilon transitions. Stepping on a
//!   code point may yield any number of successor states.
//! - [Dfa]: single code point keys with an optional default transition. A
//!   state has at most one successor per key.
//!
//! Both automata own their states in an arena and refer to them through
//! [StateId]s, which are assigned in creation order and never reused.

use std::fmt::Display;

pub mod dfa;
pub mod nfa;
pub mod scan;
mod sparse_set;

pub use dfa::Dfa;
pub use nfa::Nfa;
pub use scan::{Action, Lexeme, ScanError, Scanner};
pub use sparse_set::StateSet;

/// An input symbol consumed by an automaton.
pub type CodePoint = u32;

/// An index into the state arena of a single automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<usize> for StateId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<StateId> for usize {
    fn from(src: StateId) -> Self {
        src.as_usize()
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<State '{}'>", self.0)
    }
}

/// The terminal slot of a state.
///
/// A slot starts out `Absent`. Once it holds `Ignored` or `Token`, it is never
/// overwritten, so the first rule to complete on a shared state owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal<A> {
    Absent,
    Ignored,
    Token(A),
}

impl<A> Terminal<A> {
    /// Returns a boolean signifying the slot has been assigned.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Returns the stored token, failing with `NotTerminal` if the slot was
    /// never assigned.
    pub fn token(&self) -> Result<Option<&A>, RuntimeError> {
        match self {
            Self::Absent => Err(RuntimeError::new(RuntimeErrorKind::NotTerminal)),
            Self::Ignored => Ok(None),
            Self::Token(action) => Ok(Some(action)),
        }
    }

    /// Assigns the slot from a rule action, where `None` marks the match as
    /// ignored. Returns `false` and leaves the slot untouched if it was
    /// already set.
    pub fn assign(&mut self, action: Option<A>) -> bool {
        if self.is_set() {
            return false;
        }

        *self = match action {
            Some(action) => Self::Token(action),
            None => Self::Ignored,
        };
        true
    }
}

impl<A> Default for Terminal<A> {
    fn default() -> Self {
        Self::Absent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// A terminal query on a state that has no terminal slot set.
    NotTerminal,
    /// A structural key that is not a single literal symbol.
    MalformedLookout,
    /// A string key that does not hold exactly one symbol.
    LookoutNotSingleSymbol,
    /// A state id that does not belong to the queried automaton.
    UndefinedState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    /// The type of triggered error.
    kind: RuntimeErrorKind,
    /// Additional error data.
    data: Option<String>,
}

impl RuntimeError {
    /// Instantiates a new error.
    pub fn new(kind: RuntimeErrorKind) -> Self {
        Self { kind, data: None }
    }

    /// Associates additional data with the error, returning the modified error.
    pub fn with_data(mut self, data: String) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> RuntimeErrorKind {
        self.kind
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub(crate) fn undefined_state(state: StateId) -> Self {
        Self::new(RuntimeErrorKind::UndefinedState).with_data(state.to_string())
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (data, padding) = if let Some(data) = &self.data {
            (data.as_str(), ": ")
        } else {
            ("", "")
        };

        let msg = match self.kind {
            RuntimeErrorKind::NotTerminal => "not a terminal state",
            RuntimeErrorKind::MalformedLookout => "malformed lookout",
            RuntimeErrorKind::LookoutNotSingleSymbol => "lookout must be a single symbol",
            RuntimeErrorKind::UndefinedState => "state is not defined in this automaton",
        };

        write!(f, "{}{}{}", msg, padding, data)
    }
}

impl std::error::Error for RuntimeError {}

/// Conversion of a lookup key into the single code point a [Dfa] transition
/// is keyed by.
pub trait IntoLookout {
    fn into_lookout(self) -> Result<CodePoint, RuntimeError>;
}

impl IntoLookout for CodePoint {
    fn into_lookout(self) -> Result<CodePoint, RuntimeError> {
        Ok(self)
    }
}

impl IntoLookout for char {
    fn into_lookout(self) -> Result<CodePoint, RuntimeError> {
        Ok(self as CodePoint)
    }
}

impl IntoLookout for &str {
    fn into_lookout(self) -> Result<CodePoint, RuntimeError> {
        let mut chars = self.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c as CodePoint),
            _ => Err(RuntimeError::new(RuntimeErrorKind::LookoutNotSingleSymbol)
                .with_data(format!("{:?}", self))),
        }
    }
}

impl IntoLookout for &String {
    fn into_lookout(self) -> Result<CodePoint, RuntimeError> {
        self.as_str().into_lookout()
    }
}
