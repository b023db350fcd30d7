use parcel::parsers::character::{digit, expect_character};
use parcel::prelude::v1::*;

use crate::token::{Anchor, ClassItem, Token, DIGIT_CLASS, WORD_CLASS};
use lexer_runtime::CodePoint;

#[derive(Clone, PartialEq)]
pub enum ParseErr {
    InvalidRegex,
    InvalidRepetitionRange { min: usize, max: usize },
    Undefined(String),
}

impl std::fmt::Debug for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined(err) => write!(f, "undefined parse error: {}", err),
            Self::InvalidRegex => write!(f, "provided regex is invalid",),
            Self::InvalidRepetitionRange { min, max } => {
                write!(f, "repetition range {{{},{}}} is out of order", min, max)
            }
        }
    }
}

impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for ParseErr {}

/// Tokenizes a pattern into its structural token stream.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, ParseErr> {
    let input = pattern.chars().enumerate().collect::<Vec<(usize, char)>>();

    parse(&input)
}

pub fn parse(input: &[(usize, char)]) -> Result<Vec<Token>, ParseErr> {
    if input.is_empty() {
        return Ok(vec![]);
    }

    expression()
        .parse(input)
        .map_err(|err| ParseErr::Undefined(format!("unspecified parse error occured: {}", err)))
        .and_then(|ms| match ms {
            MatchStatus::Match {
                remainder, inner, ..
            } if remainder.is_empty() => Ok(inner),
            _ => Err(ParseErr::InvalidRegex),
        })
        .and_then(|tokens| validate(&tokens).map(|_| tokens))
}

/// Rejects repetition ranges whose upper bound is below the lower bound.
fn validate(tokens: &[Token]) -> Result<(), ParseErr> {
    tokens.iter().try_for_each(|token| match token {
        Token::Repeat {
            min,
            max: Some(max),
            ..
        }
        | Token::LazyRepeat {
            min,
            max: Some(max),
            ..
        } if max < min => Err(ParseErr::InvalidRepetitionRange {
            min: *min,
            max: *max,
        }),
        Token::Repeat { sub, .. } | Token::LazyRepeat { sub, .. } | Token::Group(sub) => {
            validate(sub)
        }
        Token::Branch(alternatives) => alternatives.iter().try_for_each(|alt| validate(alt)),
        _ => Ok(()),
    })
}

// Expression

fn expression<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Vec<Token>> {
    parcel::join(
        subexpression(),
        parcel::zero_or_more(parcel::right(parcel::join(
            expect_character('|'),
            subexpression(),
        ))),
    )
    .map(|(head, tail)| match tail.is_empty() {
        true => head,
        false => vec![Token::Branch(vec![head].into_iter().chain(tail).collect())],
    })
}

fn subexpression<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Vec<Token>> {
    parcel::zero_or_more(subexpression_item())
}

fn subexpression_item<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::or(group(), || {
        parcel::or(backreference(), || parcel::or(anchor(), r#match))
    })
}

// Group

fn group<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::right(parcel::join(
        expect_character('('),
        parcel::optional(group_non_capturing_modifier()),
    ))
    .and_then(|_| {
        parcel::join(
            expression(),
            parcel::right(parcel::join(
                expect_character(')'),
                parcel::optional(quantifier()),
            )),
        )
    })
    .map(|(expression, quantifier)| quantify(Token::Group(expression), quantifier))
}

fn group_non_capturing_modifier<'a>() -> impl Parser<'a, &'a [(usize, char)], ()> {
    parcel::join(expect_character('?'), expect_character(':')).map(|_| ())
}

// Matchers

fn r#match<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::join(match_item(), parcel::optional(quantifier()))
        .map(|(item, quantifier)| quantify(item, quantifier))
}

fn match_item<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::or(character_group(), || {
        parcel::or(character_class(), || {
            parcel::or(match_any_character(), || {
                match_character().map(|c| Token::Literal(c as CodePoint))
            })
        })
    })
}

fn match_any_character<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    expect_character('.').map(|_| Token::Any)
}

fn match_character<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], char> {
    parcel::or(escaped_character(), || {
        unescaped_character().predicate(|c| !METACHARACTERS.contains(c))
    })
}

/// Characters that must be escaped to be matched literally.
const METACHARACTERS: [char; 11] = ['(', ')', '|', '[', '*', '+', '?', '{', '.', '^', '$'];

// Character Classes

fn character_group<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::join(
        parcel::right(parcel::join(
            expect_character('['),
            parcel::optional(expect_character('^')).map(|negation| negation.is_some()),
        )),
        parcel::left(parcel::join(
            parcel::one_or_more(character_group_item()),
            expect_character(']'),
        )),
    )
    .map(|(negation, items)| {
        let items = items.into_iter().flatten().collect();
        match negation {
            true => Token::NegatedCharClass(items),
            false => Token::CharClass(items),
        }
    })
}

fn character_group_item<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Vec<ClassItem>> {
    parcel::or(character_group_class(), || {
        parcel::or(character_range().map(|range| vec![range]), || {
            character_group_character().map(|c| vec![ClassItem::Literal(c as CodePoint)])
        })
    })
}

fn character_group_class<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Vec<ClassItem>> {
    parcel::or(escape_sequence('w').map(|_| WORD_CLASS.to_vec()), || {
        escape_sequence('d').map(|_| DIGIT_CLASS.to_vec())
    })
}

fn character_group_character<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], char> {
    parcel::or(escaped_character(), || {
        unescaped_character().predicate(|c| *c != ']')
    })
}

fn character_range<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], ClassItem> {
    parcel::join(
        character_group_character(),
        parcel::right(parcel::join(
            expect_character('-'),
            character_group_character(),
        )),
    )
    .predicate(|(lower_bound, upper_bound)| lower_bound <= upper_bound)
    .map(|(lower_bound, upper_bound)| {
        ClassItem::Range(lower_bound as CodePoint, upper_bound as CodePoint)
    })
}

fn character_class<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::or(escape_sequence('w').map(|_| Token::CharClass(WORD_CLASS.to_vec())), || {
        parcel::or(
            escape_sequence('W').map(|_| Token::NegatedCharClass(WORD_CLASS.to_vec())),
            || {
                parcel::or(
                    escape_sequence('d').map(|_| Token::CharClass(DIGIT_CLASS.to_vec())),
                    || escape_sequence('D').map(|_| Token::NegatedCharClass(DIGIT_CLASS.to_vec())),
                )
            },
        )
    })
}

// Quantifiers

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quantifier {
    min: usize,
    max: Option<usize>,
    lazy: bool,
}

fn quantify(token: Token, quantifier: Option<Quantifier>) -> Token {
    match quantifier {
        None => token,
        Some(Quantifier {
            min,
            max,
            lazy: false,
        }) => Token::Repeat {
            min,
            max,
            sub: vec![token],
        },
        Some(Quantifier {
            min,
            max,
            lazy: true,
        }) => Token::LazyRepeat {
            min,
            max,
            sub: vec![token],
        },
    }
}

/// Represents all variants of regex quantifiers with an optionally lazy modifier.
fn quantifier<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Quantifier> {
    parcel::join(quantifier_type(), parcel::optional(expect_character('?'))).map(
        |((min, max), lazy_modifier)| Quantifier {
            min,
            max,
            lazy: lazy_modifier.is_some(),
        },
    )
}

fn quantifier_type<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], (usize, Option<usize>)> {
    parcel::or(expect_character('*').map(|_| (0, None)), || {
        parcel::or(expect_character('+').map(|_| (1, None)), || {
            parcel::or(expect_character('?').map(|_| (0, Some(1))), range_quantifier)
        })
    })
}

fn range_quantifier<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], (usize, Option<usize>)> {
    parcel::left(parcel::join(
        parcel::right(parcel::join(
            expect_character('{'),
            parcel::join(
                count(),
                parcel::optional(parcel::right(parcel::join(
                    expect_character(','),
                    parcel::optional(count()),
                ))),
            ),
        )),
        expect_character('}'),
    ))
    .map(|(lower_bound, upper_bound)| match upper_bound {
        // {n}
        None => (lower_bound, Some(lower_bound)),
        // {n,}
        Some(None) => (lower_bound, None),
        // {n,m}
        Some(Some(upper_bound)) => (lower_bound, Some(upper_bound)),
    })
}

// Backreferences

fn backreference<'a>() -> impl Parser<'a, &'a [(usize, char)], Token> {
    parcel::right(parcel::join(expect_character('\\'), count())).map(Token::Backreference)
}

// Anchors

fn anchor<'a>() -> impl parcel::Parser<'a, &'a [(usize, char)], Token> {
    parcel::or(expect_character('^').map(|_| Anchor::StartOfString), || {
        parcel::or(expect_character('$').map(|_| Anchor::EndOfString), || {
            parcel::or(escape_sequence('b').map(|_| Anchor::WordBoundary), || {
                parcel::or(escape_sequence('B').map(|_| Anchor::NonWordBoundary), || {
                    parcel::or(escape_sequence('A').map(|_| Anchor::StartOfStringOnly), || {
                        parcel::or(
                            escape_sequence('z').map(|_| Anchor::EndOfStringOnlyNotNewline),
                            || {
                                parcel::or(
                                    escape_sequence('Z').map(|_| Anchor::EndOfStringOnly),
                                    || escape_sequence('G').map(|_| Anchor::PreviousMatchEnd),
                                )
                            },
                        )
                    })
                })
            })
        })
    })
    .map(Token::Anchor)
}

// Terminals

fn escape_sequence<'a>(class: char) -> impl Parser<'a, &'a [(usize, char)], ()> {
    parcel::join(expect_character('\\'), expect_character(class)).map(|_| ())
}

fn count<'a>() -> impl Parser<'a, &'a [(usize, char)], usize> {
    move |input: &'a [(usize, char)]| {
        let preparsed_input = input;
        let res = parcel::one_or_more(digit(10))
            .map(|digits| digits.into_iter().collect::<String>().parse::<usize>())
            .parse(input);

        match res {
            Ok(MatchStatus::Match {
                span,
                remainder,
                inner: Ok(count),
            }) => Ok(MatchStatus::Match {
                span,
                remainder,
                inner: count,
            }),

            // overflowing counts are not a match.
            Ok(MatchStatus::Match {
                span: _,
                remainder: _,
                inner: Err(_),
            }) => Ok(MatchStatus::NoMatch(preparsed_input)),

            Ok(MatchStatus::NoMatch(remainder)) => Ok(MatchStatus::NoMatch(remainder)),
            Err(e) => Err(e),
        }
    }
}

fn escaped_character<'a>() -> impl Parser<'a, &'a [(usize, char)], char> {
    move |input: &'a [(usize, char)]| match input.get(0..2) {
        Some(&[(escape_pos, '\\'), (to_escape_pos, to_escape)]) => {
            match char_to_escaped_equivalent(to_escape) {
                Some(escaped_char) => Ok(MatchStatus::Match {
                    span: escape_pos..to_escape_pos + 1,
                    remainder: &input[2..],
                    inner: escaped_char,
                }),
                None => Ok(MatchStatus::NoMatch(input)),
            }
        }
        _ => Ok(MatchStatus::NoMatch(input)),
    }
}

fn unescaped_character<'a>() -> impl Parser<'a, &'a [(usize, char)], char> {
    move |input: &'a [(usize, char)]| match input.first() {
        Some(&(next_pos, next)) if next != '\\' => Ok(MatchStatus::Match {
            span: next_pos..next_pos + 1,
            remainder: &input[1..],
            inner: next,
        }),
        _ => Ok(MatchStatus::NoMatch(input)),
    }
}

fn char_to_escaped_equivalent(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\'' => Some('\''),
        '\"' => Some('\"'),
        '\\' => Some('\\'),
        '(' | ')' | '[' | ']' | '{' | '}' | '|' | '*' | '+' | '?' | '.' | '^' | '$' | '-'
        | '/' => Some(c),
        _ => None,
    }
}
