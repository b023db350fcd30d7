//! A nondeterministic automaton with range-labelled and epsilon edges.

use std::fmt::Display;

use crate::{CodePoint, RuntimeError, StateId, StateSet, Terminal};

/// The label on an NFA edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookout {
    /// Matches any code point in the closed interval `[min, max]`.
    Range { min: CodePoint, max: CodePoint },
    /// Traversable without consuming input.
    Empty,
}

impl Lookout {
    pub const fn range(min: CodePoint, max: CodePoint) -> Self {
        Self::Range { min, max }
    }

    pub const fn symbol(value: CodePoint) -> Self {
        Self::Range {
            min: value,
            max: value,
        }
    }

    /// Returns true if the lookout consumes the given code point. Epsilon
    /// edges never do.
    pub fn contains(&self, value: CodePoint) -> bool {
        match self {
            Self::Range { min, max } => (*min..=*max).contains(&value),
            Self::Empty => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Display for Lookout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range { min, max } if min == max => write!(f, "{}", min),
            Self::Range { min, max } => write!(f, "[{}-{}]", min, max),
            Self::Empty => write!(f, "ε"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NfaState<A> {
    terminal: Terminal<A>,
    /// Outgoing edges in insertion order. Duplicates and overlapping ranges
    /// are legal.
    transitions: Vec<(Lookout, StateId)>,
}

impl<A> NfaState<A> {
    pub fn terminal(&self) -> &Terminal<A> {
        &self.terminal
    }

    pub fn transitions(&self) -> &[(Lookout, StateId)] {
        &self.transitions
    }
}

impl<A> Default for NfaState<A> {
    fn default() -> Self {
        Self {
            terminal: Terminal::Absent,
            transitions: vec![],
        }
    }
}

/// An NFA whose states live in an arena. State `0` is the start state and
/// is created with the automaton.
#[derive(Debug, Clone, PartialEq)]
pub struct Nfa<A> {
    states: Vec<NfaState<A>>,
}

impl<A> Nfa<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![NfaState::default()],
        }
    }

    pub fn start(&self) -> StateId {
        StateId::new(0)
    }

    /// Returns the number of states in the automaton.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// An automaton always holds at least its start state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, state: StateId) -> Option<&NfaState<A>> {
        self.states.get(state.as_usize())
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &NfaState<A>)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (StateId::new(idx), state))
    }

    /// Allocates a new state, returning its id.
    pub fn add_state(&mut self) -> StateId {
        let id = StateId::new(self.states.len());
        self.states.push(NfaState::default());
        id
    }

    /// Adds an edge between two existing states.
    ///
    /// # Panics
    ///
    /// Panics if `from` is not a state of this automaton.
    pub fn add_transition(&mut self, from: StateId, lookout: Lookout, to: StateId) {
        self.states[from.as_usize()].transitions.push((lookout, to));
    }

    /// Adds an epsilon edge from `from` to a newly created state, returning
    /// the new state.
    pub fn add_empty_transition(&mut self, from: StateId) -> StateId {
        let to = self.add_state();
        self.add_transition(from, Lookout::Empty, to);
        to
    }

    /// Adds an edge on `[min, max]` from `from` to a newly created state,
    /// returning the new state.
    pub fn add_range_transition(&mut self, from: StateId, min: CodePoint, max: CodePoint) -> StateId {
        let to = self.add_state();
        self.add_transition(from, Lookout::range(min, max), to);
        to
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

    fn state(&self, state: StateId) -> Result<&NfaState<A>, RuntimeError> {
        self.get(state)
            .ok_or_else(|| RuntimeError::undefined_state(state))
    }

    /// Returns every state reachable from `state` by an edge whose range
    /// contains `value`.
    pub fn step(&self, state: StateId, value: CodePoint) -> Result<Vec<StateId>, RuntimeError> {
        self.state(state).map(|s| {
            s.transitions
                .iter()
                .filter(|(lookout, _)| lookout.contains(value))
                .map(|(_, target)| *target)
                .collect()
        })
    }

    /// Returns every state reachable from `state` by a single epsilon edge.
    pub fn epsilon_step(&self, state: StateId) -> Result<Vec<StateId>, RuntimeError> {
        self.state(state).map(|s| {
            s.transitions
                .iter()
                .filter(|(lookout, _)| lookout.is_empty())
                .map(|(_, target)| *target)
                .collect()
        })
    }

    /// Returns the token stored on a terminal state, `None` if the state is
    /// ignored, or a `NotTerminal` error if the slot is absent.
    pub fn terminal(&self, state: StateId) -> Result<Option<&A>, RuntimeError> {
        self.state(state).and_then(|s| s.terminal.token())
    }

    /// Returns the given states and everything reachable from them through
    /// epsilon edges, in discovery order.
    pub fn epsilon_closure(&self, states: &[StateId]) -> Result<Vec<StateId>, RuntimeError> {
        let mut closure = StateSet::new(self.len());
        let mut stack: Vec<StateId> = states.iter().rev().copied().collect();

        while let Some(state) = stack.pop() {
            if !closure.insert(state) {
                continue;
            }

            let mut targets = self.epsilon_step(state)?;
            targets.reverse();
            stack.extend(targets.into_iter().filter(|t| !closure.contains(t)));
        }

        Ok(closure.into_vec())
    }

    /// Simulates the automaton from the start state, returning the length of
    /// the longest accepted prefix of `input` along with the terminal state
    /// it ends on. When several terminal states are reached on the same
    /// prefix, the one with the lowest id wins.
    pub fn longest_match(&self, input: &[CodePoint]) -> Option<(usize, StateId)> {
        let mut current = self.epsilon_closure(&[self.start()]).ok()?;
        let mut best = self.lowest_terminal(&current).map(|state| (0, state));

        for (idx, &value) in input.iter().enumerate() {
            let mut next = StateSet::new(self.len());
            for &state in current.iter() {
                next.extend(self.step(state, value).ok()?);
            }

            current = self.epsilon_closure(next.as_slice()).ok()?;
            if current.is_empty() {
                break;
            }

            if let Some(state) = self.lowest_terminal(&current) {
                best = Some((idx + 1, state));
            }
        }

        best
    }

    fn lowest_terminal(&self, states: &[StateId]) -> Option<StateId> {
        states
            .iter()
            .copied()
            .filter(|&state| {
                self.get(state)
                    .map(|s| s.terminal.is_set())
                    .unwrap_or(false)
            })
            .min()
    }
}

impl<A> Default for Nfa<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::ops::Index<StateId> for Nfa<A> {
    type Output = NfaState<A>;

    fn index(&self, index: StateId) -> &Self::Output {
        &self.states[index.as_usize()]
    }
}
