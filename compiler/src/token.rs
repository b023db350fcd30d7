//! The structural token stream a pattern is tokenized into.

use lexer_runtime::{CodePoint, IntoLookout, RuntimeError, RuntimeErrorKind};
use std::ops::RangeInclusive;

/// A member of a character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    Literal(CodePoint),
    /// A closed range of code points.
    Range(CodePoint, CodePoint),
}

impl ClassItem {
    pub fn code_points(&self) -> RangeInclusive<CodePoint> {
        match *self {
            Self::Literal(value) => value..=value,
            Self::Range(min, max) => min..=max,
        }
    }
}

/// Word characters, `\w`.
pub const WORD_CLASS: [ClassItem; 4] = [
    ClassItem::Range('a' as CodePoint, 'z' as CodePoint),
    ClassItem::Range('A' as CodePoint, 'Z' as CodePoint),
    ClassItem::Range('0' as CodePoint, '9' as CodePoint),
    ClassItem::Literal('_' as CodePoint),
];

/// Decimal digits, `\d`.
pub const DIGIT_CLASS: [ClassItem; 1] = [ClassItem::Range('0' as CodePoint, '9' as CodePoint)];

/// Zero-width assertions. These are tokenized but never compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    StartOfString,
    EndOfString,
    WordBoundary,
    NonWordBoundary,
    StartOfStringOnly,
    EndOfStringOnlyNotNewline,
    EndOfStringOnly,
    PreviousMatchEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(CodePoint),
    Range(CodePoint, CodePoint),
    CharClass(Vec<ClassItem>),
    /// Repeats `sub` at least `min` times and at most `max` times, `None`
    /// being unbounded.
    Repeat {
        min: usize,
        max: Option<usize>,
        sub: Vec<Token>,
    },
    /// Alternatives, each a full sub-stream.
    Branch(Vec<Vec<Token>>),
    Group(Vec<Token>),

    // Unsupported by either builder.
    Any,
    NegatedCharClass(Vec<ClassItem>),
    Anchor(Anchor),
    Backreference(usize),
    LazyRepeat {
        min: usize,
        max: Option<usize>,
        sub: Vec<Token>,
    },
}

impl Token {
    /// Returns the name of the token variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Literal(_) => "Literal",
            Self::Range(..) => "Range",
            Self::CharClass(_) => "CharClass",
            Self::Repeat { .. } => "Repeat",
            Self::Branch(_) => "Branch",
            Self::Group(_) => "Group",
            Self::Any => "Any",
            Self::NegatedCharClass(_) => "NegatedCharClass",
            Self::Anchor(_) => "Anchor",
            Self::Backreference(_) => "Backreference",
            Self::LazyRepeat { .. } => "LazyRepeat",
        }
    }

    /// Returns the code points matched by a single-symbol token, or `None`
    /// for any other token.
    pub fn code_points(&self) -> Option<Vec<CodePoint>> {
        match self {
            Self::Literal(value) => Some(vec![*value]),
            Self::Range(min, max) => Some((*min..=*max).collect()),
            Self::CharClass(items) => Some(class_code_points(items)),
            _ => None,
        }
    }
}

/// Flattens class items into their code points, in item order.
pub fn class_code_points(items: &[ClassItem]) -> Vec<CodePoint> {
    items.iter().flat_map(ClassItem::code_points).collect()
}

impl IntoLookout for &Token {
    fn into_lookout(self) -> Result<CodePoint, RuntimeError> {
        match self {
            Token::Literal(value) => Ok(*value),
            other => Err(RuntimeError::new(RuntimeErrorKind::MalformedLookout)
                .with_data(other.tag().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_flatten_class_items_in_order() {
        let items = vec![
            ClassItem::Literal('z' as u32),
            ClassItem::Range('a' as u32, 'c' as u32),
        ];

        assert_eq!(
            vec!['z' as u32, 'a' as u32, 'b' as u32, 'c' as u32],
            class_code_points(&items)
        );
    }

    #[test]
    fn should_only_convert_literals_into_lookouts() {
        assert_eq!(Ok(97), (&Token::Literal(97)).into_lookout());

        let malformed = (&Token::Group(vec![Token::Literal(97)])).into_lookout();
        assert_eq!(
            Err(RuntimeErrorKind::MalformedLookout),
            malformed.as_ref().map_err(|e| e.kind())
        );
        assert_eq!(
            Some("Group"),
            malformed.as_ref().err().and_then(|e| e.data())
        );
    }
}
