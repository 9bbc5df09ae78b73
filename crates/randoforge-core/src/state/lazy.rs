//! Copy-on-write mutable view over a base state.

use super::field::{StateBool, StateInt};
use super::State;

/// Copy-on-write builder used during clause evaluation.
///
/// Reads hit the base state until the first write, which clones the packed
/// arrays into a private overlay. [`LazyStateBuilder::get_state`] materializes
/// back into a [`State`], returning the shared base when untouched. Cloning a
/// builder forks the overlay, which is how state modifiers branch.
#[derive(Debug, Clone)]
pub struct LazyStateBuilder {
    base: State,
    overlay: Option<Overlay>,
}

#[derive(Debug, Clone)]
struct Overlay {
    bools: Vec<u32>,
    ints: Vec<i32>,
}

impl LazyStateBuilder {
    pub fn new(base: State) -> Self {
        LazyStateBuilder {
            base,
            overlay: None,
        }
    }

    pub fn get_bool(&self, field: StateBool) -> bool {
        match &self.overlay {
            Some(o) => (o.bools[field.index() / 32] >> (field.index() % 32)) & 1 != 0,
            None => self.base.get_bool(field),
        }
    }

    pub fn get_int(&self, field: StateInt) -> i32 {
        match &self.overlay {
            Some(o) => o.ints[field.index()],
            None => self.base.get_int(field),
        }
    }

    pub fn set_bool(&mut self, field: StateBool, value: bool) {
        let o = self.touch();
        let (w, bit) = (field.index() / 32, 1u32 << (field.index() % 32));
        if value {
            o.bools[w] |= bit;
        } else {
            o.bools[w] &= !bit;
        }
    }

    pub fn set_int(&mut self, field: StateInt, value: i32) {
        self.touch().ints[field.index()] = value;
    }

    pub fn increment_int(&mut self, field: StateInt, amount: i32) {
        let o = self.touch();
        o.ints[field.index()] += amount;
    }

    /// Materializes the builder. Cheap when nothing was written.
    pub fn get_state(&self) -> State {
        match &self.overlay {
            Some(o) => State::from_parts(o.bools.clone(), o.ints.clone()),
            None => self.base.clone(),
        }
    }

    fn touch(&mut self) -> &mut Overlay {
        self.overlay.get_or_insert_with(|| Overlay {
            bools: self.base.bool_words().to_vec(),
            ints: self.base.int_values().to_vec(),
        })
    }
}

impl From<State> for LazyStateBuilder {
    fn from(state: State) -> Self {
        LazyStateBuilder::new(state)
    }
}
