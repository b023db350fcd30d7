//! Provides for the compilation of lexer rules, pairs of a pattern and a
//! token action, into the finite-state recognizers of `lexer-runtime`.
//!
//! Two independent compilation paths are offered:
//!
//! - [NfaBuilder]: patterns are tokenized, translated into a normalized
//!   [tree::Regexp] and compiled structurally into an NFA.
//! - [DfaBuilder]: token streams are walked directly against a growing DFA,
//!   reusing states so that rules sharing a prefix share states.
//!
//! In both, the first rule to complete on a state owns its terminal slot.
//!
//! # Example
//!
//! ```rust
//! use lexer_compiler::{build_dfa, Rule};
//! use lexer_runtime::{Action, Scanner};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! enum Kind {
//!     Let,
//!     Ident,
//!     Number,
//! }
//!
//! let dfa = build_dfa([
//!     Rule::new("let", Action::Label(Kind::Let)),
//!     Rule::new("[a-z]{1,8}", Action::Label(Kind::Ident)),
//!     Rule::new("\\d+", Action::Label(Kind::Number)),
//!     Rule::ignored(" +"),
//! ])
//! .expect("rules should compile");
//!
//! let kinds = Scanner::new(&dfa, "let x 42")
//!     .map(|lexeme| lexeme.map(|l| l.value))
//!     .collect::<Result<Vec<_>, _>>();
//!
//! assert_eq!(Ok(vec![Kind::Let, Kind::Ident, Kind::Number]), kinds);
//! ```

mod config;
pub mod dfa;
mod error;
pub mod interval;
pub mod nfa;
pub mod parser;
pub mod token;
pub mod translate;
pub mod tree;

pub use config::{Config, DEFAULT_REPEAT_CUTOFF};
pub use dfa::{build_dfa, DfaBuilder};
pub use error::{CompileError, CompileErrorKind};
pub use nfa::{build_nfa, NfaBuilder};
pub use parser::{tokenize, ParseErr};
pub use translate::{translate, translate_with_config};

/// A pattern and the action tagged on the states that complete it. A rule
/// without an action matches input but produces no token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<A> {
    pub pattern: String,
    pub action: Option<A>,
}

impl<A> Rule<A> {
    pub fn new<P: Into<String>>(pattern: P, action: A) -> Self {
        Self {
            pattern: pattern.into(),
            action: Some(action),
        }
    }

    pub fn ignored<P: Into<String>>(pattern: P) -> Self {
        Self {
            pattern: pattern.into(),
            action: None,
        }
    }
}
