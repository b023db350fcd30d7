//! A maximal-munch scanner over a compiled [Dfa].

use std::fmt::Display;
use std::ops::Range;

use crate::{CodePoint, Dfa};

/// The token payload stored on a DFA terminal state, either a fixed label
/// or a function producing a label from the matched text.
#[derive(Clone, Copy)]
pub enum Action<L> {
    Label(L),
    Produce(fn(&str) -> L),
}

impl<L: Clone> Action<L> {
    /// Resolves the action against the text of a match.
    pub fn resolve(&self, text: &str) -> L {
        match self {
            Self::Label(label) => label.clone(),
            Self::Produce(produce) => produce(text),
        }
    }
}

impl<L: std::fmt::Debug> std::fmt::Debug for Action<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label(label) => f.debug_tuple("Label").field(label).finish(),
            Self::Produce(_) => write!(f, "Produce(..)"),
        }
    }
}

/// A matched token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a, L> {
    pub value: L,
    pub text: &'a str,
    /// Byte offsets of `text` in the scanned input.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// No rule matches a non-empty prefix of the input at the byte offset.
    NoMatch { offset: usize },
}

impl Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatch { offset } => write!(f, "no rule matches input at offset {}", offset),
        }
    }
}

impl std::error::Error for ScanError {}

/// Splits an input into lexemes by repeatedly taking the longest prefix the
/// automaton accepts. Ignored matches are consumed silently. The first
/// failure is yielded once, after which the scanner is exhausted.
///
/// ```
/// use lexer_runtime::{dfa::Lookout, Action, Dfa, Scanner};
///
/// let mut dfa = Dfa::new();
/// let start = dfa.start();
/// let digit = dfa.ensure_transition(start, Lookout::from('1'));
/// dfa.add_transition(digit, Lookout::from('1'), digit);
/// dfa.set_terminal(digit, Some(Action::Produce(|text: &str| text.len())));
///
/// let lengths: Vec<usize> = Scanner::new(&dfa, "111")
///     .map(|lexeme| lexeme.map(|l| l.value))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(vec![3], lengths);
/// ```
pub struct Scanner<'a, L> {
    dfa: &'a Dfa<Action<L>>,
    input: &'a str,
    offset: usize,
    failed: bool,
}

impl<'a, L> Scanner<'a, L> {
    pub fn new(dfa: &'a Dfa<Action<L>>, input: &'a str) -> Self {
        Self {
            dfa,
            input,
            offset: 0,
            failed: false,
        }
    }

    /// Returns the byte offset of the next unscanned character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn fail(&mut self) -> Option<Result<Lexeme<'a, L>, ScanError>> {
        self.failed = true;
        Some(Err(ScanError::NoMatch {
            offset: self.offset,
        }))
    }
}

impl<'a, L: Clone> Iterator for Scanner<'a, L> {
    type Item = Result<Lexeme<'a, L>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed || self.offset >= self.input.len() {
                return None;
            }

            let input = self.input;
            let rest = &input[self.offset..];
            let (char_len, state) = match self.dfa.walk(rest.chars().map(|c| c as CodePoint)) {
                Some((char_len, state)) if char_len > 0 => (char_len, state),
                _ => return self.fail(),
            };

            let byte_len = rest
                .char_indices()
                .nth(char_len)
                .map(|(idx, _)| idx)
                .unwrap_or(rest.len());
            let span = self.offset..self.offset + byte_len;
            let text = &input[span.clone()];

            let action = match self.dfa.terminal(state) {
                Ok(action) => action,
                Err(_) => return self.fail(),
            };
            self.offset = span.end;

            match action {
                Some(action) => {
                    return Some(Ok(Lexeme {
                        value: action.resolve(text),
                        text,
                        span,
                    }))
                }
                None => log::trace!("skipping ignored lexeme {:?} at {:?}", text, span),
            }
        }
    }
}
