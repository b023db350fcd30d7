use lexer_compiler::{build_dfa, Rule};
use lexer_runtime::{Action, Dfa, Lexeme, ScanError, Scanner};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Let,
    Ident(String),
    Number(u64),
    Assign,
    Semi,
}

fn lexer() -> Dfa<Action<Tok>> {
    build_dfa([
        Rule::new("let", Action::Label(Tok::Let)),
        Rule::new(
            "[a-z_]{1,12}",
            Action::Produce(|text: &str| Tok::Ident(text.to_string())),
        ),
        Rule::new(
            "\\d+",
            Action::Produce(|text: &str| Tok::Number(text.parse().unwrap_or(u64::MAX))),
        ),
        Rule::new("=", Action::Label(Tok::Assign)),
        Rule::new(";", Action::Label(Tok::Semi)),
        Rule::ignored("[ \\t\\n]+"),
    ])
    .expect("lexer rules should compile")
}

#[test]
fn should_scan_statement_into_tokens() {
    let dfa = lexer();

    let tokens: Result<Vec<Tok>, ScanError> = Scanner::new(&dfa, "let answer = 42;\n")
        .map(|lexeme| lexeme.map(|l| l.value))
        .collect();

    assert_eq!(
        Ok(vec![
            Tok::Let,
            Tok::Ident("answer".to_string()),
            Tok::Assign,
            Tok::Number(42),
            Tok::Semi,
        ]),
        tokens
    );
}

#[test]
fn should_prefer_longer_identifier_over_keyword_prefix() {
    let dfa = lexer();

    let lexemes: Vec<Lexeme<Tok>> = Scanner::new(&dfa, "letter let")
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        vec![
            Lexeme {
                value: Tok::Ident("letter".to_string()),
                text: "letter",
                span: 0..6
            },
            Lexeme {
                value: Tok::Let,
                text: "let",
                span: 7..10
            },
        ],
        lexemes
    );
}

#[test]
fn should_report_offset_of_unmatched_input() {
    let dfa = lexer();
    let mut scanner = Scanner::new(&dfa, "x = 9 ?");

    let scanned: Vec<_> = scanner.by_ref().take(3).collect();
    assert!(scanned.iter().all(Result::is_ok));

    assert_eq!(Some(Err(ScanError::NoMatch { offset: 6 })), scanner.next());
    assert_eq!(None, scanner.next());
}
