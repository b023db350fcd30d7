//! Translation of a token stream into a [Regexp] tree.
//!
//! Repetition is rewritten into primitive form:
//!
//! - `{0}` drops the repeated stream.
//! - `{n,m}` with `n > 0` becomes `n` copies followed by `{0,m-n}`.
//! - `{0,m}` becomes an optional copy followed by `{0,m-1}`.
//! - `{0,}` becomes a kleene star.
//!
//! Upper bounds past the configured cutoff are treated as unbounded.

use log::trace;

use crate::error::{CompileError, CompileErrorKind};
use crate::interval;
use crate::token::{class_code_points, Token};
use crate::tree::{Regexp, RegexpTree};
use crate::Config;
use lexer_runtime::CodePoint;

/// Translates a token stream with the default configuration.
pub fn translate(tokens: &[Token]) -> Result<Regexp, CompileError> {
    translate_with_config(tokens, &Config::default())
}

pub fn translate_with_config(tokens: &[Token], config: &Config) -> Result<Regexp, CompileError> {
    Translator { config }.sequence(tokens, None)
}

struct Translator<'a> {
    config: &'a Config,
}

impl<'a> Translator<'a> {
    /// Translates a stream, attaching `tail` as the continuation of its last
    /// token.
    fn sequence(&self, tokens: &[Token], tail: Regexp) -> Result<Regexp, CompileError> {
        tokens
            .iter()
            .rev()
            .try_fold(tail, |next, token| self.token(token, next))
    }

    fn token(&self, token: &Token, next: Regexp) -> Result<Regexp, CompileError> {
        match token {
            Token::Literal(value) => Ok(RegexpTree::single(*value, *value, next)),
            Token::Range(min, max) => self.class((*min..=*max).collect(), next),
            Token::CharClass(items) => self.class(class_code_points(items), next),
            Token::Repeat { min, max, sub } => self.repeat(*min, *max, sub, next),
            Token::Branch(alternatives) => self.branch(alternatives, next),
            Token::Group(inner) => self.sequence(inner, next),
            Token::Any
            | Token::NegatedCharClass(_)
            | Token::Anchor(_)
            | Token::Backreference(_)
            | Token::LazyRepeat { .. } => Err(CompileError::new(
                CompileErrorKind::UnrecognizedToken,
            )
            .with_data(token.tag().to_string())),
        }
    }

    /// Encodes the reduced intervals of a class as a left-leaning union
    /// chain, the outermost node carrying the continuation.
    fn class(&self, code_points: Vec<CodePoint>, next: Regexp) -> Result<Regexp, CompileError> {
        let mut intervals = interval::reduce(code_points).into_iter();

        let head = intervals
            .next()
            .ok_or_else(|| CompileError::new(CompileErrorKind::EmptyCharClass))?;

        let chain = intervals.fold(
            RegexpTree::single(*head.start(), *head.end(), None),
            |chain, interval| {
                RegexpTree::union(
                    chain,
                    RegexpTree::single(*interval.start(), *interval.end(), None),
                    None,
                )
            },
        );

        Ok(chain.map(|mut node| {
            match node.as_mut() {
                RegexpTree::Single { next: slot, .. }
                | RegexpTree::Union { next: slot, .. }
                | RegexpTree::Kleene { next: slot, .. } => *slot = next,
            }
            node
        }))
    }

    fn repeat(
        &self,
        min: usize,
        max: Option<usize>,
        sub: &[Token],
        next: Regexp,
    ) -> Result<Regexp, CompileError> {
        if let Some(max) = max.filter(|&max| max < min) {
            return Err(CompileError::new(CompileErrorKind::InvalidRepetitionRange)
                .with_data(format!("{{{},{}}}", min, max)));
        }

        match (min, self.config.effective_max(max)) {
            (_, Some(0)) => Ok(next),
            (0, None) => {
                trace!("::repeat kleene");
                Ok(RegexpTree::kleene(self.sequence(sub, None)?, next))
            }
            (0, Some(max)) => {
                let more = self.repeat(0, Some(max - 1), sub, None)?;
                let once = self.sequence(sub, more)?;

                Ok(RegexpTree::union(once, None, next))
            }
            (min, max) => {
                trace!("::repeat unrolling {} mandatory copies", min);
                let optional = self.repeat(0, max.map(|max| max - min), sub, next)?;

                (0..min).try_fold(optional, |tail, _| self.sequence(sub, tail))
            }
        }
    }

    /// Chains alternatives into nested unions. Only the outermost union
    /// carries the continuation.
    fn branch(&self, alternatives: &[Vec<Token>], next: Regexp) -> Result<Regexp, CompileError> {
        match alternatives {
            [] => Ok(next),
            [only] => self.sequence(only, next),
            [first, rest @ ..] => Ok(RegexpTree::union(
                self.sequence(first, None)?,
                self.branch(rest, None)?,
                next,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::tree::{tags, to_pattern, Tag};

    fn translated(pattern: &str) -> Regexp {
        let tokens = tokenize(pattern).unwrap();
        translate(&tokens).unwrap()
    }

    fn single(c: char, next: Regexp) -> Regexp {
        RegexpTree::single(c as u32, c as u32, next)
    }

    #[test]
    fn should_translate_empty_stream_to_empty_match() {
        assert_eq!(None, translated(""));
        assert_eq!(None, translated("()"));
    }

    #[test]
    fn should_thread_concatenation_through_next() {
        assert_eq!(single('a', single('b', None)), translated("ab"));
        assert_eq!(single('a', single('b', None)), translated("(a)(b)"));
    }

    #[test]
    fn should_drop_zero_repetitions() {
        assert_eq!(single('b', None), translated("a{0}b"));
    }

    #[test]
    fn should_rewrite_bounded_repetition_into_nested_options() {
        // a{1,3}b == a(a(a)?)?b
        let expected = single(
            'a',
            RegexpTree::union(
                single('a', RegexpTree::union(single('a', None), None, None)),
                None,
                single('b', None),
            ),
        );

        assert_eq!(expected, translated("a{1,3}b"));
    }

    #[test]
    fn should_rewrite_unbounded_repetition_into_kleene() {
        assert_eq!(
            single('a', single('a', RegexpTree::kleene(single('a', None), None))),
            translated("a{2,}")
        );
        assert_eq!(
            RegexpTree::kleene(single('a', None), single('b', None)),
            translated("a*b")
        );
    }

    #[test]
    fn should_treat_bounds_past_cutoff_as_unbounded() {
        let tokens = tokenize("a{0,5}").unwrap();
        let config = Config::default().with_repeat_cutoff(4);

        assert_eq!(
            Ok(RegexpTree::kleene(single('a', None), None)),
            translate_with_config(&tokens, &config)
        );
    }

    #[test]
    fn should_grow_linearly_with_bounded_repetition() {
        let tree = translated("a{0,50}");

        assert_eq!(100, tags(&tree).len());
    }

    #[test]
    fn should_attach_continuation_to_outermost_branch_union() {
        let expected = RegexpTree::union(
            single('a', None),
            RegexpTree::union(single('b', None), single('c', None), None),
            single('d', None),
        );

        assert_eq!(expected, translated("(a|b|c)d"));
    }

    #[test]
    fn should_reduce_character_classes_to_interval_chains() {
        let expected = RegexpTree::union(
            RegexpTree::single('a' as u32, 'c' as u32, None),
            single('x', None),
            single('y', None),
        );

        assert_eq!(expected, translated("[xa-cb]y"));
        assert_eq!(
            RegexpTree::single('0' as u32, '9' as u32, None),
            translated("\\d")
        );
    }

    #[test]
    fn should_reject_unsupported_tokens() {
        for pattern in [".", "a^", "[^a]", "a*?", "(a)\\1"] {
            let tokens = tokenize(pattern).unwrap();

            assert_eq!(
                (pattern, Err(&CompileErrorKind::UnrecognizedToken)),
                (pattern, translate(&tokens).as_ref().map_err(|e| e.kind()))
            );
        }
    }

    #[test]
    fn should_reject_inverted_ranges_in_handwritten_streams() {
        let tokens = vec![Token::Repeat {
            min: 3,
            max: Some(1),
            sub: vec![Token::Literal(97)],
        }];

        assert_eq!(
            Err(&CompileErrorKind::InvalidRepetitionRange),
            translate(&tokens).as_ref().map_err(|e| e.kind())
        );
        assert_eq!(
            Err(&CompileErrorKind::EmptyCharClass),
            translate(&[Token::CharClass(vec![])])
                .as_ref()
                .map_err(|e| e.kind())
        );
    }

    #[test]
    fn should_retranslate_printed_trees_to_the_same_shape() {
        let patterns = [
            "abc",
            "a|b|c",
            "(a|b)c",
            "[a-cx]y",
            "a*b",
            "(ab)?c",
            "a{2,3}",
            "x(a|bc)*y",
            "\\(\\)",
        ];

        for pattern in patterns {
            let tree = translated(pattern);
            let printed = to_pattern(&tree);
            let reparsed = translated(&printed);

            assert_eq!(
                (pattern, printed.as_str(), tags(&tree)),
                (pattern, printed.as_str(), tags(&reparsed))
            );
        }

        assert_eq!(vec![Tag::Kleene, Tag::Single], tags(&translated("a*")));
    }
}
