//! State unions: minimal antichains of states under dominance.

use smallvec::SmallVec;

use super::{State, StateManager};

/// A minimal antichain of [`State`]s under the dominance order.
///
/// Invariant: no element is dominated by another element. The empty union is
/// a valid value meaning "reachable with indeterminate state"; absence of a
/// union (`Option::None` at the call sites) means "not yet reachable".
///
/// Equality is set equality: two unions are equal when each element of one is
/// structurally present in the other, regardless of order.
#[derive(Debug, Clone)]
pub struct StateUnion {
    states: SmallVec<[State; 2]>,
}

impl StateUnion {
    /// The canonical empty union.
    pub fn empty() -> Self {
        StateUnion {
            states: SmallVec::new(),
        }
    }

    /// Singleton union.
    pub fn single(state: State) -> Self {
        let mut states = SmallVec::new();
        states.push(state);
        StateUnion { states }
    }

    /// Builds a union from a list by discarding every element dominated by
    /// another (duplicates collapse to one representative).
    pub fn from_states(states: Vec<State>, sm: &StateManager) -> Self {
        let mut union = StateUnion::empty();
        for state in states {
            union.insert(state, sm);
        }
        union
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// Whether `state` would strictly improve this union, i.e. it is not
    /// dominated by any current element.
    pub fn improves(&self, state: &State, sm: &StateManager) -> bool {
        !self.states.iter().any(|s| state.le(s, sm))
    }

    /// Inserts a state, restoring the antichain invariant. Returns `true`
    /// when the union changed.
    pub fn insert(&mut self, state: State, sm: &StateManager) -> bool {
        if !self.improves(&state, sm) {
            return false;
        }
        self.states.retain(|s| !s.le(&state, sm));
        self.states.push(state);
        true
    }

    /// Merges two unions into a reduced antichain.
    pub fn union(a: &StateUnion, b: &StateUnion, sm: &StateManager) -> StateUnion {
        let mut out = a.clone();
        for state in b.iter() {
            out.insert(state.clone(), sm);
        }
        out
    }

    /// Incremental merge used by the fixed-point machinery.
    ///
    /// Returns `None` only when `current` is absent and `new_states` is
    /// empty — nothing to report. Otherwise returns the reduced union, which
    /// is `current` itself (cheaply cloned) when no new state improves it.
    pub fn try_union(
        current: Option<&StateUnion>,
        new_states: &[State],
        sm: &StateManager,
    ) -> Option<StateUnion> {
        match current {
            None if new_states.is_empty() => None,
            None => Some(StateUnion::from_states(new_states.to_vec(), sm)),
            Some(cur) => {
                if new_states.iter().any(|s| cur.improves(s, sm)) {
                    let mut out = cur.clone();
                    for state in new_states {
                        out.insert(state.clone(), sm);
                    }
                    Some(out)
                } else {
                    Some(cur.clone())
                }
            }
        }
    }

    /// Antichain check, used by property tests.
    pub fn is_antichain(&self, sm: &StateManager) -> bool {
        for (i, a) in self.states.iter().enumerate() {
            for (j, b) in self.states.iter().enumerate() {
                if i != j && a.le(b, sm) {
                    return false;
                }
            }
        }
        true
    }
}

impl PartialEq for StateUnion {
    fn eq(&self, other: &Self) -> bool {
        self.states.len() == other.states.len()
            && self.states.iter().all(|s| other.states.contains(s))
    }
}

impl Eq for StateUnion {}

impl<'a> IntoIterator for &'a StateUnion {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
