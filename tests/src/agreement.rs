use lexer_compiler::{build_dfa, build_nfa, Rule};
use lexer_runtime::{CodePoint, Dfa, Nfa};
use quickcheck::quickcheck;

fn codes(input: &str) -> Vec<CodePoint> {
    input.chars().map(|c| c as CodePoint).collect()
}

fn nfa_match<A: Clone>(nfa: &Nfa<A>, input: &str) -> Option<(usize, Option<A>)> {
    nfa.longest_match(&codes(input))
        .and_then(|(len, state)| nfa.terminal(state).ok().map(|a| (len, a.cloned())))
}

fn dfa_match<A: Clone>(dfa: &Dfa<A>, input: &str) -> Option<(usize, Option<A>)> {
    dfa.walk(codes(input))
        .and_then(|(len, state)| dfa.terminal(state).ok().map(|a| (len, a.cloned())))
}

#[test]
fn should_agree_on_longest_match_between_automata() {
    let rules = vec![
        Rule::new("[0-9]+", "NUMBER"),
        Rule::new("[a-z]+", "WORD"),
        Rule::new("=", "ASSIGN"),
        Rule::new("==", "EQUALS"),
        Rule::new("(0x|0b)[0-9a-f]{1,4}", "RADIX"),
        Rule::ignored(" +"),
    ];

    let nfa = build_nfa(rules.clone()).unwrap();
    let dfa = build_dfa(rules).unwrap();

    let input_output = vec![
        ("123", Some((3, Some("NUMBER")))),
        ("abc1", Some((3, Some("WORD")))),
        ("=", Some((1, Some("ASSIGN")))),
        ("===", Some((2, Some("EQUALS")))),
        ("   x", Some((3, None))),
        ("0xff", Some((4, Some("RADIX")))),
        ("0bff1a", Some((6, Some("RADIX")))),
        ("!", None),
    ];

    for (input, expected) in input_output {
        assert_eq!((input, expected), (input, nfa_match(&nfa, input)));
        assert_eq!((input, expected), (input, dfa_match(&dfa, input)));
    }
}

#[test]
fn should_agree_on_literal_rule_sets() {
    fn prop(words: Vec<String>) -> bool {
        let words: Vec<String> = words
            .into_iter()
            .map(|word| word.chars().filter(char::is_ascii_lowercase).collect())
            .filter(|word: &String| !word.is_empty())
            .collect();
        let rules: Vec<Rule<usize>> = words
            .iter()
            .enumerate()
            .map(|(idx, word)| Rule::new(word.as_str(), idx))
            .collect();

        let (nfa, dfa) = match (build_nfa(rules.clone()), build_dfa(rules)) {
            (Ok(nfa), Ok(dfa)) => (nfa, dfa),
            _ => return false,
        };

        words.iter().all(|word| {
            let first_rule = words.iter().position(|w| w == word);
            let expected = Some((word.len(), first_rule));

            nfa_match(&nfa, word) == expected && dfa_match(&dfa, word) == expected
        })
    }

    quickcheck(prop as fn(Vec<String>) -> bool);
}
