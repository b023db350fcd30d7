//! Provides a sparse set of state ids as an alternative to HashSets.
//!
//! Iteration follows insertion order, which keeps frontier and closure
//! computations deterministic.

use crate::StateId;

#[derive(Default, Clone)]
pub struct StateSet {
    dense: Vec<StateId>,
    sparse: Vec<usize>,
}

impl StateSet {
    /// Initializes a new set taking a value representing the expected number
    /// of states in the automaton.
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            dense: vec![],
            sparse: vec![0; max_len],
        }
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns the number of elements that the set can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Inserts a state into the set, returning `true` if it was not already
    /// present.
    pub fn insert(&mut self, state: StateId) -> bool {
        if self.contains(&state) {
            return false;
        }

        let idx = state.as_usize();
        if self.sparse.len() <= idx {
            // double the size.
            self.sparse.resize((idx + 1) * 2, 0);
        }

        self.sparse[idx] = self.dense.len();
        self.dense.push(state);
        true
    }

    /// Returns `true` if the set contains a state.
    pub fn contains(&self, state: &StateId) -> bool {
        self.sparse
            .get(state.as_usize())
            .map(|&dense_idx| self.dense.get(dense_idx) == Some(state))
            // if none, the bounds of the set are exceeded and thus doesn't
            // contain the value.
            .unwrap_or(false)
    }

    /// Clears the set, removing all values.
    pub fn clear(&mut self) {
        self.dense.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateId> {
        self.dense.iter()
    }

    pub fn as_slice(&self) -> &[StateId] {
        &self.dense
    }

    pub fn into_vec(self) -> Vec<StateId> {
        self.dense
    }
}

impl Extend<StateId> for StateSet {
    fn extend<T: IntoIterator<Item = StateId>>(&mut self, iter: T) {
        for state in iter {
            self.insert(state);
        }
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<T: IntoIterator<Item = StateId>>(iter: T) -> Self {
        let mut set = Self::new(0);
        set.extend(iter);
        set
    }
}

impl IntoIterator for StateSet {
    type Item = StateId;
    type IntoIter = std::vec::IntoIter<StateId>;

    fn into_iter(self) -> Self::IntoIter {
        self.dense.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = &'a StateId;
    type IntoIter = std::slice::Iter<'a, StateId>;

    fn into_iter(self) -> Self::IntoIter {
        self.dense.iter()
    }
}

impl core::fmt::Debug for StateSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "StateSet({:?})", &self.dense)
    }
}
