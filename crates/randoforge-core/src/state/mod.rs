//! Immutable resource states, their dominance order, and the schema registry.
//!
//! A [`State`] is a packed vector of bools and ints indexed by field id.
//! States are partially ordered by *dominance*: `a <= b` means any situation
//! reachable starting from `a` is also reachable starting from `b`. The
//! direction of each field's contribution to the order is part of the schema
//! frozen by the [`StateManager`].

mod field;
mod lazy;
mod manager;
mod union;

#[cfg(test)]
mod tests;

pub use field::{FieldDirection, FieldKind, FieldProperty, StateBool, StateInt};
pub use lazy::LazyStateBuilder;
pub use manager::{StateManager, StateManagerBuilder, DEFAULT_VALUE_PROPERTY};
pub use union::StateUnion;

use std::sync::Arc;

const WORD_BITS: usize = u32::BITS as usize;

pub(crate) fn word_count(bools: usize) -> usize {
    bools.div_ceil(WORD_BITS)
}

/// An immutable resource vector: packed bools plus a slice of ints.
///
/// Shared via `Arc` internally, so cloning a state is cheap and unions of
/// states do not duplicate storage. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    bools: Arc<[u32]>,
    ints: Arc<[i32]>,
}

impl State {
    pub(crate) fn from_parts(bools: Vec<u32>, ints: Vec<i32>) -> Self {
        State {
            bools: bools.into(),
            ints: ints.into(),
        }
    }

    pub fn get_bool(&self, field: StateBool) -> bool {
        let id = field.index();
        (self.bools[id / WORD_BITS] >> (id % WORD_BITS)) & 1 != 0
    }

    pub fn get_int(&self, field: StateInt) -> i32 {
        self.ints[field.index()]
    }

    pub(crate) fn bool_words(&self) -> &[u32] {
        &self.bools
    }

    pub(crate) fn int_values(&self) -> &[i32] {
        &self.ints
    }

    /// Dominance comparison: `true` iff `self <= other` under the per-field
    /// directions frozen in `sm`, i.e. `other` is at least as useful.
    ///
    /// Bool words are normalized against the manager's low-is-better mask so
    /// the componentwise test reduces to a subset check; ints compare with a
    /// per-field sign.
    pub fn le(&self, other: &State, sm: &StateManager) -> bool {
        let mask = sm.bool_invert_mask();
        for (w, (&a, &b)) in self.bools.iter().zip(other.bools.iter()).enumerate() {
            let ca = a ^ mask[w];
            let cb = b ^ mask[w];
            if ca & !cb != 0 {
                return false;
            }
        }
        for (i, (&a, &b)) in self.ints.iter().zip(other.ints.iter()).enumerate() {
            let sign = sm.int_sign(i) as i32;
            if a * sign > b * sign {
                return false;
            }
        }
        true
    }

    /// `true` iff `self` dominates `other` (`other <= self`).
    pub fn dominates(&self, other: &State, sm: &StateManager) -> bool {
        other.le(self, sm)
    }
}
