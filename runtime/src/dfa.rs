//! A deterministic automaton keyed by single code points, with an optional
//! default transition per state.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::{CodePoint, IntoLookout, RuntimeError, StateId, Terminal};

/// The key of a DFA edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookout {
    Symbol(CodePoint),
    /// Taken without consuming input when no symbol edge matches.
    Default,
}

impl From<CodePoint> for Lookout {
    fn from(value: CodePoint) -> Self {
        Self::Symbol(value)
    }
}

impl From<char> for Lookout {
    fn from(value: char) -> Self {
        Self::Symbol(value as CodePoint)
    }
}

impl Display for Lookout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symbol(value) => write!(f, "{}", value),
            Self::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DfaState<A> {
    terminal: Terminal<A>,
    transitions: BTreeMap<Lookout, StateId>,
}

impl<A> DfaState<A> {
    pub fn terminal(&self) -> &Terminal<A> {
        &self.terminal
    }

    pub fn transitions(&self) -> &BTreeMap<Lookout, StateId> {
        &self.transitions
    }
}

impl<A> Default for DfaState<A> {
    fn default() -> Self {
        Self {
            terminal: Terminal::Absent,
            transitions: BTreeMap::new(),
        }
    }
}

/// A DFA whose states live in an arena. State `0` is the start state and is
/// created with the automaton.
///
/// Each state holds at most one edge per [Lookout], and edges are never
/// overwritten once added.
#[derive(Debug, Clone, PartialEq)]
pub struct Dfa<A> {
    states: Vec<DfaState<A>>,
}

impl<A> Dfa<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![DfaState::default()],
        }
    }

    pub fn start(&self) -> StateId {
        StateId::new(0)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, state: StateId) -> Option<&DfaState<A>> {
        self.states.get(state.as_usize())
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &DfaState<A>)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (StateId::new(idx), state))
    }

    /// Allocates a new state, returning its id.
    pub fn add_state(&mut self) -> StateId {
        let id = StateId::new(self.states.len());
        self.states.push(DfaState::default());
        id
    }

    /// Returns the target of the edge on `lookout`, if any.
    pub fn target(&self, state: StateId, lookout: Lookout) -> Option<StateId> {
        self.get(state)
            .and_then(|s| s.transitions.get(&lookout))
            .copied()
    }

    /// Adds an edge unless `from` already has one on `lookout`. Returns
    /// `true` if the edge was added.
    ///
    /// # Panics
    ///
    /// Panics if `from` is not a state of this automaton.
    pub fn add_transition(&mut self, from: StateId, lookout: Lookout, to: StateId) -> bool {
        let transitions = &mut self.states[from.as_usize()].transitions;
        if transitions.contains_key(&lookout) {
            return false;
        }

        transitions.insert(lookout, to);
        true
    }

    /// Returns the target of the edge on `lookout`, creating a fresh state
    /// and edge if none exists.
    pub fn ensure_transition(&mut self, from: StateId, lookout: Lookout) -> StateId {
        match self.target(from, lookout) {
            Some(target) => target,
            None => {
                let target = self.add_state();
                self.add_transition(from, lookout, target);
                target
            }
        }
    }

    /// Sets the terminal slot of a state unless it is already set. Returns
    /// `true` if the slot was assigned.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a state of this automaton.
    pub fn set_terminal(&mut self, state: StateId, action: Option<A>) -> bool {
        self.states[state.as_usize()].terminal.assign(action)
    }

    pub fn transitions(&self, state: StateId) -> Result<&BTreeMap<Lookout, StateId>, RuntimeError> {
        self.get(state)
            .map(|s| &s.transitions)
            .ok_or_else(|| RuntimeError::undefined_state(state))
    }

    /// Returns the token stored on a terminal state, `None` if the state is
    /// ignored, or a `NotTerminal` error if the slot is absent.
    pub fn terminal(&self, state: StateId) -> Result<Option<&A>, RuntimeError> {
        self.get(state)
            .ok_or_else(|| RuntimeError::undefined_state(state))
            .and_then(|s| s.terminal.token())
    }

    /// Returns the target for the exact key if one exists, otherwise the
    /// target of the default edge if one exists.
    ///
    /// ```
    /// use lexer_runtime::{dfa::Lookout, Dfa};
    ///
    /// let mut dfa: Dfa<()> = Dfa::new();
    /// let start = dfa.start();
    /// let on_a = dfa.ensure_transition(start, Lookout::from('a'));
    /// let fallback = dfa.ensure_transition(start, Lookout::Default);
    ///
    /// assert_eq!(Ok(Some(on_a)), dfa.recover_lookout(start, "a"));
    /// assert_eq!(Ok(Some(fallback)), dfa.recover_lookout(start, 'z'));
    /// assert_eq!(Ok(None), dfa.recover_lookout(on_a, 'z'));
    /// assert!(dfa.recover_lookout(start, "ab").is_err());
    /// ```
    pub fn recover_lookout<K: IntoLookout>(
        &self,
        state: StateId,
        key: K,
    ) -> Result<Option<StateId>, RuntimeError> {
        let value = key.into_lookout()?;
        let transitions = self.transitions(state)?;

        Ok(transitions
            .get(&Lookout::Symbol(value))
            .or_else(|| transitions.get(&Lookout::Default))
            .copied())
    }

    /// Walks the automaton greedily from the start state, returning the
    /// length of the longest consumed prefix that ended on a terminal state
    /// along with that state.
    ///
    /// A symbol edge is always preferred. Default edges are followed without
    /// consuming input when no symbol edge matches.
    pub fn walk<I>(&self, input: I) -> Option<(usize, StateId)>
    where
        I: IntoIterator<Item = CodePoint>,
    {
        let mut input = input.into_iter().peekable();
        let mut state = self.start();
        let mut consumed = 0;
        // consecutive default hops, bounded to guard against default cycles.
        let mut hops = 0;
        let mut best = None;

        loop {
            let is_terminal = self
                .get(state)
                .map(|s| s.terminal.is_set())
                .unwrap_or(false);
            if is_terminal {
                best = Some((consumed, state));
            }

            let next = input
                .peek()
                .and_then(|&value| self.target(state, Lookout::Symbol(value)));

            if let Some(next) = next {
                input.next();
                consumed += 1;
                hops = 0;
                state = next;
                continue;
            }

            match self.target(state, Lookout::Default) {
                Some(next) if hops < self.len() => {
                    hops += 1;
                    state = next;
                }
                _ => break,
            }
        }

        best
    }
}

impl<A> Default for Dfa<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::ops::Index<StateId> for Dfa<A> {
    type Output = DfaState<A>;

    fn index(&self, index: StateId) -> &Self::Output {
        &self.states[index.as_usize()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuntimeErrorKind;

    fn chars(input: &str) -> impl Iterator<Item = CodePoint> + '_ {
        input.chars().map(|c| c as CodePoint)
    }

    #[test]
    fn should_reuse_existing_transitions() {
        let mut dfa: Dfa<()> = Dfa::new();
        let start = dfa.start();

        let first = dfa.ensure_transition(start, Lookout::from('a'));
        let second = dfa.ensure_transition(start, Lookout::from('a'));

        assert_eq!(first, second);
        assert_eq!(2, dfa.len());
    }

    #[test]
    fn should_never_overwrite_a_transition() {
        let mut dfa: Dfa<()> = Dfa::new();
        let start = dfa.start();
        let a = dfa.add_state();
        let b = dfa.add_state();

        assert!(dfa.add_transition(start, Lookout::from('x'), a));
        assert!(!dfa.add_transition(start, Lookout::from('x'), b));
        assert_eq!(Some(a), dfa.target(start, Lookout::from('x')));
    }

    #[test]
    fn should_prefer_exact_key_over_default_on_recovery() {
        let mut dfa: Dfa<()> = Dfa::new();
        let start = dfa.start();
        let exact = dfa.ensure_transition(start, Lookout::from('a'));
        let fallback = dfa.ensure_transition(start, Lookout::Default);

        let test_cases = vec![
            ('a', Some(exact)),
            ('b', Some(fallback)),
            ('\n', Some(fallback)),
        ];

        for (key, expected) in test_cases {
            assert_eq!((key, Ok(expected)), (key, dfa.recover_lookout(start, key)));
        }

        assert_eq!(Ok(None), dfa.recover_lookout(exact, "a"));
    }

    #[test]
    fn should_reject_multi_symbol_recovery_keys() {
        let dfa: Dfa<()> = Dfa::new();

        assert_eq!(
            Err(RuntimeErrorKind::LookoutNotSingleSymbol),
            dfa.recover_lookout(dfa.start(), "abc").map_err(|e| e.kind())
        );
        assert_eq!(
            Err(RuntimeErrorKind::UndefinedState),
            dfa.recover_lookout(StateId::new(4), 'a').map_err(|e| e.kind())
        );
    }

    #[test]
    fn should_walk_to_longest_terminal_prefix() {
        let mut dfa = Dfa::new();
        let start = dfa.start();
        let a = dfa.ensure_transition(start, Lookout::from('a'));
        let ab = dfa.ensure_transition(a, Lookout::from('b'));
        let abc = dfa.ensure_transition(ab, Lookout::from('c'));
        dfa.set_terminal(a, Some("A"));
        dfa.set_terminal(abc, Some("ABC"));

        assert_eq!(Some((3, abc)), dfa.walk(chars("abcd")));
        // falls back to the last terminal seen.
        assert_eq!(Some((1, a)), dfa.walk(chars("abd")));
        assert_eq!(None, dfa.walk(chars("b")));
    }

    #[test]
    fn should_follow_default_edges_without_consuming() {
        // approximate to `x?y`
        let mut dfa = Dfa::new();
        let start = dfa.start();
        let x = dfa.ensure_transition(start, Lookout::from('x'));
        let skip = dfa.ensure_transition(start, Lookout::Default);
        let y = dfa.ensure_transition(x, Lookout::from('y'));
        dfa.add_transition(skip, Lookout::from('y'), y);
        dfa.set_terminal(y, Some("XY"));

        assert_eq!(Some((2, y)), dfa.walk(chars("xy")));
        assert_eq!(Some((1, y)), dfa.walk(chars("y")));
        assert_eq!(None, dfa.walk(chars("z")));
    }

    #[test]
    fn should_terminate_walk_on_default_cycles() {
        let mut dfa: Dfa<()> = Dfa::new();
        let start = dfa.start();
        let loop_state = dfa.ensure_transition(start, Lookout::Default);
        dfa.add_transition(loop_state, Lookout::Default, start);

        assert_eq!(None, dfa.walk(chars("a")));
    }
}
