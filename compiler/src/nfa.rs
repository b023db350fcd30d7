//! Structural compilation of [Regexp] trees into a shared [Nfa].

use log::{debug, trace};

use crate::error::CompileError;
use crate::parser::tokenize;
use crate::translate::translate_with_config;
use crate::tree::{Regexp, RegexpTree};
use crate::{Config, Rule};
use lexer_runtime::nfa::Lookout;
use lexer_runtime::{Nfa, StateId};

/// The entry and accept states of a compiled tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub first: StateId,
    pub last: StateId,
}

/// Compiles rules into a single NFA, every rule starting from the shared
/// start state.
#[derive(Debug)]
pub struct NfaBuilder<A> {
    config: Config,
    nfa: Nfa<A>,
}

impl<A> NfaBuilder<A> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            nfa: Nfa::new(),
        }
    }

    /// Compiles a rule from the start state, tagging its accept state with
    /// the rule's action. Returns the accept state.
    pub fn add_rule(&mut self, rule: Rule<A>) -> Result<StateId, CompileError> {
        let tokens = tokenize(&rule.pattern)?;
        let tree = translate_with_config(&tokens, &self.config)?;

        let start = self.nfa.start();
        let Fragment { last, .. } = self.compile(&tree, start);
        if !self.nfa.set_terminal(last, rule.action) {
            debug!("rule {:?} shares terminal {} with an earlier rule", rule.pattern, last);
        }

        debug!(
            "compiled rule {:?} into nfa of {} states",
            rule.pattern,
            self.nfa.len()
        );
        Ok(last)
    }

    /// Compiles a tree whose entry is reached from `entry`. The continuation
    /// chain is walked in a loop; only branch and loop bodies recurse.
    pub fn compile(&mut self, tree: &Regexp, entry: StateId) -> Fragment {
        let mut cursor = tree;
        let mut first = None;
        let mut tail = entry;

        while let Some(node) = cursor.as_deref() {
            let head = self.nfa.add_empty_transition(tail);
            first.get_or_insert(head);

            tail = match node {
                RegexpTree::Single { min, max, .. } => {
                    self.nfa.add_range_transition(head, *min, *max)
                }
                RegexpTree::Union {
                    first: left,
                    second: right,
                    ..
                } => {
                    let left = self.compile(left, head);
                    let right = self.compile(right, head);

                    let joined = self.nfa.add_state();
                    self.nfa.add_transition(left.last, Lookout::Empty, joined);
                    self.nfa.add_transition(right.last, Lookout::Empty, joined);
                    joined
                }
                RegexpTree::Kleene { pattern, .. } => {
                    let body = self.compile(pattern, head);

                    let exit = self.nfa.add_empty_transition(body.last);
                    // loop
                    self.nfa.add_transition(body.last, Lookout::Empty, body.first);
                    // skip
                    self.nfa.add_transition(head, Lookout::Empty, exit);
                    trace!("::compile kleene {} loops on {}", head, body.first);
                    exit
                }
            };
            cursor = node.next();
        }

        Fragment {
            first: first.unwrap_or(entry),
            last: tail,
        }
    }

    /// Compiles every rule in order, returning the finished automaton.
    pub fn build<I>(mut self, rules: I) -> Result<Nfa<A>, CompileError>
    where
        I: IntoIterator<Item = Rule<A>>,
    {
        for rule in rules {
            self.add_rule(rule)?;
        }

        Ok(self.finish())
    }

    pub fn finish(self) -> Nfa<A> {
        self.nfa
    }
}

impl<A> Default for NfaBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles rules into an NFA with the default configuration.
///
/// ```
/// use lexer_compiler::{build_nfa, Rule};
///
/// let nfa = build_nfa([Rule::new("ab*", "AB"), Rule::ignored(" +")]).unwrap();
/// let input: Vec<u32> = "abbb".chars().map(|c| c as u32).collect();
///
/// let (len, state) = nfa.longest_match(&input).unwrap();
/// assert_eq!(4, len);
/// assert_eq!(Ok(Some(&"AB")), nfa.terminal(state));
/// ```
pub fn build_nfa<A, I>(rules: I) -> Result<Nfa<A>, CompileError>
where
    I: IntoIterator<Item = Rule<A>>,
{
    NfaBuilder::new().build(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexer_runtime::RuntimeErrorKind;

    fn codes(input: &str) -> Vec<u32> {
        input.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn should_compile_empty_tree_as_epsilon_fragment() {
        let mut builder: NfaBuilder<()> = NfaBuilder::new();
        let start = StateId::new(0);

        assert_eq!(
            Fragment {
                first: start,
                last: start
            },
            builder.compile(&None, start)
        );
        assert_eq!(1, builder.finish().len());
    }

    #[test]
    fn should_compile_single_into_epsilon_then_range_edge() {
        let mut builder: NfaBuilder<()> = NfaBuilder::new();
        let start = StateId::new(0);
        let tree = RegexpTree::single('a' as u32, 'c' as u32, None);

        let fragment = builder.compile(&tree, start);
        let nfa = builder.finish();

        assert_eq!(Ok(vec![fragment.first]), nfa.epsilon_step(start));
        assert_eq!(
            Ok(vec![fragment.last]),
            nfa.step(fragment.first, 'b' as u32)
        );
        assert_eq!(Ok(vec![]), nfa.step(fragment.first, 'd' as u32));
    }

    #[test]
    fn should_converge_union_branches_on_one_terminal() {
        let nfa = build_nfa([Rule::new("(a|b)", "AB")]).unwrap();
        let start = nfa.start();

        let closure = nfa.epsilon_closure(&[start]).unwrap();
        let after_a: Vec<StateId> = closure
            .iter()
            .flat_map(|&state| nfa.step(state, 'a' as u32).unwrap())
            .collect();
        let after_b: Vec<StateId> = closure
            .iter()
            .flat_map(|&state| nfa.step(state, 'b' as u32).unwrap())
            .collect();

        assert_eq!(1, after_a.len());
        assert_eq!(1, after_b.len());
        assert_ne!(after_a, after_b);

        let joined_a = nfa.epsilon_step(after_a[0]).unwrap();
        let joined_b = nfa.epsilon_step(after_b[0]).unwrap();
        assert_eq!(joined_a, joined_b);
        assert_eq!(Ok(Some(&"AB")), nfa.terminal(joined_a[0]));
    }

    #[test]
    fn should_loop_and_skip_kleene_star() {
        let nfa = build_nfa([Rule::new("ab*c", "ABC")]).unwrap();

        for input in ["ac", "abc", "abbbbc"] {
            let len = input.chars().count();
            assert_eq!(
                (input, Some(len)),
                (input, nfa.longest_match(&codes(input)).map(|(len, _)| len))
            );
        }

        assert_eq!(None, nfa.longest_match(&codes("ab")));
    }

    #[test]
    fn should_keep_first_rule_on_shared_terminal() {
        let mut builder = NfaBuilder::new();

        let first = builder.add_rule(Rule::new("", "FIRST")).unwrap();
        let second = builder.add_rule(Rule::new("", "SECOND")).unwrap();
        let nfa = builder.finish();

        assert_eq!(first, second);
        assert_eq!(Ok(Some(&"FIRST")), nfa.terminal(first));
    }

    #[test]
    fn should_tag_ignored_rules_and_leave_others_absent() {
        let mut builder = NfaBuilder::new();

        let ws = builder.add_rule(Rule::<&str>::ignored(" ")).unwrap();
        let nfa = builder.finish();

        assert_eq!(Ok(None), nfa.terminal(ws));
        assert_eq!(
            Err(RuntimeErrorKind::NotTerminal),
            nfa.terminal(nfa.start()).map_err(|e| e.kind())
        );
    }

    #[test]
    fn should_prefer_lowest_terminal_among_equal_matches() {
        let nfa = build_nfa([Rule::new("if", "KEYWORD"), Rule::new("[a-z]+", "IDENT")]).unwrap();

        let (_, keyword) = nfa.longest_match(&codes("if")).unwrap();
        let (len, ident) = nfa.longest_match(&codes("iffy")).unwrap();

        assert_eq!(Ok(Some(&"KEYWORD")), nfa.terminal(keyword));
        assert_eq!(4, len);
        assert_eq!(Ok(Some(&"IDENT")), nfa.terminal(ident));
    }

    #[test]
    fn should_compile_long_unrolled_repetitions() {
        let nfa = build_nfa([Rule::new("a{20000}", "A")]).unwrap();

        // one epsilon and one range edge per mandatory copy.
        assert!(nfa.len() > 40000);
        assert_eq!(None, nfa.longest_match(&codes("aaa")));
    }

    #[test]
    fn should_treat_bounds_past_configured_cutoff_as_unbounded() {
        let config = Config::default().with_repeat_cutoff(2);
        let nfa = NfaBuilder::with_config(config)
            .build([Rule::new("a{0,3}", "A")])
            .unwrap();

        assert_eq!(Some(4), nfa.longest_match(&codes("aaaa")).map(|(len, _)| len));

        // the default cutoff keeps the same bound exact.
        let nfa = build_nfa([Rule::new("a{0,3}", "A")]).unwrap();
        assert_eq!(Some(3), nfa.longest_match(&codes("aaaa")).map(|(len, _)| len));
    }

    #[test]
    fn should_abort_on_unrecognized_tokens() {
        let result = build_nfa([Rule::new("a", "A"), Rule::new("a$", "B")]);

        assert!(result.is_err());
    }
}
