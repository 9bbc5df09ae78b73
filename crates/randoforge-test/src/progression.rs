//! A fixed-map progression store for evaluator tests.

use std::collections::HashMap;
use std::sync::Arc;

use randoforge_core::{StateManager, StateUnion, TermId, TermValue};
use randoforge_logic::reader::ProgressionReader;

/// Progression backed by plain maps; no fixed-point machinery.
#[derive(Debug)]
pub struct FixedProgression {
    sm: Arc<StateManager>,
    values: HashMap<TermId, TermValue>,
    states: HashMap<TermId, StateUnion>,
}

impl FixedProgression {
    pub fn new(sm: Arc<StateManager>) -> Self {
        FixedProgression {
            sm,
            values: HashMap::new(),
            states: HashMap::new(),
        }
    }

    pub fn set(&mut self, term: TermId, value: TermValue) -> &mut Self {
        self.values.insert(term, value);
        self
    }

    pub fn set_state(&mut self, term: TermId, union: StateUnion) -> &mut Self {
        self.states.insert(term, union);
        self
    }

    pub fn clear(&mut self, term: TermId) -> &mut Self {
        self.values.remove(&term);
        self.states.remove(&term);
        self
    }
}

impl ProgressionReader for FixedProgression {
    fn get(&self, term: TermId) -> TermValue {
        if self.states.contains_key(&term) {
            return 1;
        }
        self.values.get(&term).copied().unwrap_or(0)
    }

    fn get_state(&self, term: TermId) -> Option<&StateUnion> {
        self.states.get(&term)
    }

    fn state_manager(&self) -> &StateManager {
        &self.sm
    }
}
