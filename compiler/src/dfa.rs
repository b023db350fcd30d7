//! Direct, incremental construction of a [Dfa] from token streams.
//!
//! Each rule is walked token by token against a frontier of states,
//! starting at the shared start state. Symbol transitions are reused before
//! new states are created, so rules with common prefixes converge on the same
//! states.
//!
//! Repetition of a single-symbol alphabet is expanded in layers, one layer
//! per repeat. Each layer creates at most one fresh successor per symbol,
//! shared by every state of the previous layer lacking that transition.
//! Unbounded repeats close their last layer into a clique, and optional
//! repeats add a default transition to a state standing in for "zero
//! repeats".

use log::{debug, trace};

use crate::error::{CompileError, CompileErrorKind};
use crate::parser::tokenize;
use crate::token::Token;
use crate::{Config, Rule};
use lexer_runtime::dfa::Lookout;
use lexer_runtime::{CodePoint, Dfa, StateId, StateSet};

/// A state reached in a layer, along with the symbol that leads into it.
type LayerEntry = (CodePoint, StateId);

#[derive(Debug)]
pub struct DfaBuilder<A> {
    config: Config,
    dfa: Dfa<A>,
}

impl<A: Clone> DfaBuilder<A> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            dfa: Dfa::new(),
        }
    }

    /// Walks a rule from the start state, tagging every state of the final
    /// frontier with the rule's action. Returns the final frontier.
    pub fn add_rule(&mut self, rule: Rule<A>) -> Result<Vec<StateId>, CompileError> {
        let tokens = tokenize(&rule.pattern)?;
        let frontier = self.advance(vec![self.dfa.start()], &tokens)?;

        for &state in frontier.iter() {
            self.dfa.set_terminal(state, rule.action.clone());
        }

        debug!(
            "compiled rule {:?} into {} terminal states, dfa of {} states",
            rule.pattern,
            frontier.len(),
            self.dfa.len()
        );
        Ok(frontier)
    }

    /// Advances a frontier across a token stream.
    fn advance(
        &mut self,
        frontier: Vec<StateId>,
        tokens: &[Token],
    ) -> Result<Vec<StateId>, CompileError> {
        tokens
            .iter()
            .try_fold(frontier, |frontier, token| self.advance_token(frontier, token))
    }

    fn advance_token(
        &mut self,
        frontier: Vec<StateId>,
        token: &Token,
    ) -> Result<Vec<StateId>, CompileError> {
        match token {
            Token::Branch(alternatives) if alternatives.is_empty() => Ok(frontier),
            Token::Branch(alternatives) => {
                let mut merged = StateSet::new(self.dfa.len());
                for alternative in alternatives {
                    merged.extend(self.advance(frontier.clone(), alternative)?);
                }

                Ok(merged.into_vec())
            }
            Token::Group(inner) => self.advance(frontier, inner),
            _ => {
                let mut next = StateSet::new(self.dfa.len());
                for state in frontier {
                    next.extend(self.step(state, token)?);
                }

                Ok(next.into_vec())
            }
        }
    }

    /// Returns the states reached from `state` across a single token,
    /// creating states and transitions as needed.
    pub fn step(&mut self, state: StateId, token: &Token) -> Result<Vec<StateId>, CompileError> {
        match token {
            Token::Literal(_) | Token::Range(..) | Token::CharClass(_) => {
                let code_points = token.code_points().unwrap_or_default();
                if code_points.is_empty() {
                    return Err(CompileError::new(CompileErrorKind::EmptyCharClass)
                        .with_data(format!("{:?}", token)));
                }

                let targets: StateSet = code_points
                    .into_iter()
                    .map(|value| self.dfa.ensure_transition(state, Lookout::Symbol(value)))
                    .collect();

                Ok(targets.into_vec())
            }
            Token::Repeat { min, max, sub } => self.repeat(state, *min, *max, sub),
            Token::Branch(_) | Token::Group(_) => self.advance_token(vec![state], token),
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

    fn repeat(
        &mut self,
        state: StateId,
        min: usize,
        max: Option<usize>,
        sub: &[Token],
    ) -> Result<Vec<StateId>, CompileError> {
        if let Some(max) = max.filter(|&max| max < min) {
            return Err(CompileError::new(CompileErrorKind::InvalidRepetitionRange)
                .with_data(format!("{{{},{}}}", min, max)));
        }

        let max = self.config.effective_max(max);
        if max == Some(0) {
            return Ok(vec![state]);
        }

        let (alphabet, nullable) = match alphabet(sub, &self.config) {
            Some(alphabet) => alphabet,
            None => return self.unroll(state, min, max, sub),
        };
        if alphabet.is_empty() {
            return Ok(vec![state]);
        }
        // a repeat that may match nothing makes every mandatory copy optional.
        let min = if nullable { 0 } else { min };

        let reached = match (min, max) {
            (0, None) => self.zero_or_more(state, &alphabet),
            (min, None) => self.at_least(state, min, &alphabet),
            (0, Some(max)) => self.zero_to(state, max, &alphabet),
            (min, Some(max)) => self.between(state, min, max, &alphabet),
        };

        Ok(reached)
    }

    /// `{n,}`: `n` chained layers, the last of which is closed into a
    /// clique.
    fn at_least(&mut self, state: StateId, min: usize, alphabet: &[CodePoint]) -> Vec<StateId> {
        trace!("::repeat at_least min={} alphabet={:?}", min, alphabet);
        let mut sources = vec![state];
        let mut entries = vec![];

        for _ in 0..min {
            entries = self.layer(&sources, alphabet);
            sources = states_of(&entries);
        }

        self.clique(&entries);
        sources
    }

    /// `{0,}`: a default transition for zero repeats, plus one layer closed
    /// into a clique.
    fn zero_or_more(&mut self, state: StateId, alphabet: &[CodePoint]) -> Vec<StateId> {
        trace!("::repeat zero_or_more alphabet={:?}", alphabet);
        let skip = self.dfa.ensure_transition(state, Lookout::Default);

        let entries = self.layer(&[state], alphabet);
        self.clique(&entries);

        let mut reached: StateSet = states_of(&entries).into_iter().collect();
        reached.insert(skip);
        reached.into_vec()
    }

    /// `{n,m}`: `m` chained layers, every layer from the `n`th on being an
    /// accepting stopping point.
    fn between(
        &mut self,
        state: StateId,
        min: usize,
        max: usize,
        alphabet: &[CodePoint],
    ) -> Vec<StateId> {
        trace!("::repeat between min={} max={} alphabet={:?}", min, max, alphabet);
        let mut sources = vec![state];
        let mut reached = StateSet::new(self.dfa.len());

        for depth in 1..=max {
            sources = states_of(&self.layer(&sources, alphabet));
            if depth >= min {
                reached.extend(sources.iter().copied());
            }
        }

        reached.into_vec()
    }

    /// `{0,m}`: a default transition for zero repeats, then `m` chained
    /// layers starting from both the state and the zero-repeat state. The
    /// starting states themselves are accepting.
    fn zero_to(&mut self, state: StateId, max: usize, alphabet: &[CodePoint]) -> Vec<StateId> {
        trace!("::repeat zero_to max={} alphabet={:?}", max, alphabet);
        let skip = self.dfa.ensure_transition(state, Lookout::Default);

        let mut sources = vec![state, skip];
        let mut reached: StateSet = sources.iter().copied().collect();

        for _ in 0..max {
            sources = states_of(&self.layer(&sources, alphabet));
            reached.extend(sources.iter().copied());
        }

        reached.into_vec()
    }

    /// Repeats a stream that is not a single-symbol alphabet by advancing
    /// the frontier once per repeat. Only bounded repeats can be expanded
    /// this way.
    fn unroll(
        &mut self,
        state: StateId,
        min: usize,
        max: Option<usize>,
        sub: &[Token],
    ) -> Result<Vec<StateId>, CompileError> {
        let max = max.ok_or_else(|| {
            CompileError::new(CompileErrorKind::UnsupportedRepetition)
                .with_data(format!("{:?}", sub))
        })?;
        trace!("::repeat unroll min={} max={}", min, max);

        let mut frontier = vec![state];
        let mut reached = StateSet::new(self.dfa.len());
        if min == 0 {
            reached.insert(state);
        }

        for pass in 1..=max {
            frontier = self.advance(frontier, sub)?;
            if pass >= min {
                reached.extend(frontier.iter().copied());
            }
        }

        Ok(reached.into_vec())
    }

    /// Builds one layer of successors from `sources`. Existing transitions
    /// are reused. Sources lacking a transition on a symbol share a single
    /// fresh successor for it.
    fn layer(&mut self, sources: &[StateId], alphabet: &[CodePoint]) -> Vec<LayerEntry> {
        let mut entries: Vec<LayerEntry> = vec![];

        for &symbol in alphabet {
            let lookout = Lookout::Symbol(symbol);
            let mut fresh = None;

            for &source in sources {
                let target = match self.dfa.target(source, lookout) {
                    Some(target) => target,
                    None => {
                        let target = match fresh {
                            Some(target) => target,
                            None => self.dfa.add_state(),
                        };
                        fresh = Some(target);
                        self.dfa.add_transition(source, lookout, target);
                        target
                    }
                };

                if !entries.contains(&(symbol, target)) {
                    entries.push((symbol, target));
                }
            }
        }

        entries
    }

    /// Links every state of a layer to every other, itself included, on
    /// the symbol leading into the target. Existing transitions are kept.
    fn clique(&mut self, entries: &[LayerEntry]) {
        let sources = states_of(entries);

        for &(symbol, target) in entries {
            for &source in sources.iter() {
                self.dfa
                    .add_transition(source, Lookout::Symbol(symbol), target);
            }
        }
    }

    /// Compiles every rule in order, returning the finished automaton.
    pub fn build<I>(mut self, rules: I) -> Result<Dfa<A>, CompileError>
    where
        I: IntoIterator<Item = Rule<A>>,
    {
        for rule in rules {
            self.add_rule(rule)?;
        }

        Ok(self.finish())
    }

    pub fn finish(self) -> Dfa<A> {
        self.dfa
    }
}

impl<A: Clone> Default for DfaBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the distinct states of a layer, in order.
fn states_of(entries: &[LayerEntry]) -> Vec<StateId> {
    entries
        .iter()
        .map(|&(_, state)| state)
        .collect::<StateSet>()
        .into_vec()
}

/// Returns the sorted code points a repeated stream draws from when each
/// repeat matches at most one symbol, along with whether a repeat may match
/// nothing at all.
fn alphabet(sub: &[Token], config: &Config) -> Option<(Vec<CodePoint>, bool)> {
    let (mut code_points, nullable) = match sub {
        [] => (vec![], true),
        [Token::Group(inner)] => return alphabet(inner, config),
        [Token::Branch(alternatives)] => alternatives.iter().try_fold(
            (vec![], alternatives.is_empty()),
            |(mut code_points, nullable), alternative| {
                let (symbols, empty) = alphabet(alternative, config)?;
                code_points.extend(symbols);
                Some((code_points, nullable || empty))
            },
        )?,
        [Token::Repeat { min, max, sub }]
            if *min <= 1 && config.effective_max(*max) == Some(1) =>
        {
            let (symbols, empty) = alphabet(sub, config)?;
            (symbols, empty || *min == 0)
        }
        [token] => (token.code_points()?, false),
        _ => return None,
    };

    code_points.sort_unstable();
    code_points.dedup();
    Some((code_points, nullable))
}

/// Compiles rules into a DFA with the default configuration.
///
/// ```
/// use lexer_compiler::{build_dfa, Rule};
///
/// let dfa = build_dfa([Rule::new("a", "A"), Rule::new("ab", "B")]).unwrap();
///
/// let start = dfa.start();
/// let a = dfa.recover_lookout(start, 'a').unwrap().unwrap();
/// let ab = dfa.recover_lookout(a, 'b').unwrap().unwrap();
///
/// assert_eq!(Ok(Some(&"A")), dfa.terminal(a));
/// assert_eq!(Ok(Some(&"B")), dfa.terminal(ab));
/// assert_eq!(Ok(None), dfa.recover_lookout(start, 'c'));
/// ```
pub fn build_dfa<A, I>(rules: I) -> Result<Dfa<A>, CompileError>
where
    A: Clone,
    I: IntoIterator<Item = Rule<A>>,
{
    DfaBuilder::new().build(rules)
}
