//! Generic state modifiers used by evaluator and randomization tests.

use randoforge_core::{LazyStateBuilder, State, StateBool, StateInt};
use randoforge_logic::reader::ProgressionReader;
use randoforge_logic::variable::{ClauseContext, StateModifier, VariableBase};

/// Consumes a bool resource: passes only when the flag is still set on the
/// in-flight state, clearing it on the output branch.
#[derive(Debug)]
pub struct FlagConsumeModifier {
    name: String,
    flag: StateBool,
}

impl FlagConsumeModifier {
    pub fn new(name: impl Into<String>, flag: StateBool) -> Self {
        FlagConsumeModifier {
            name: name.into(),
            flag,
        }
    }
}

impl VariableBase for FlagConsumeModifier {
    fn name(&self) -> &str {
        &self.name
    }
}

impl StateModifier for FlagConsumeModifier {
    fn modify_state(
        &self,
        _ctx: &ClauseContext<'_>,
        _pm: &dyn ProgressionReader,
        input: &LazyStateBuilder,
    ) -> Vec<LazyStateBuilder> {
        if !input.get_bool(self.flag) {
            return Vec::new();
        }
        let mut out = input.clone();
        out.set_bool(self.flag, false);
        vec![out]
    }
}

/// Spends from an int counter up to a limit; the branch fails once the
/// accumulated cost would exceed it.
#[derive(Debug)]
pub struct CostModifier {
    name: String,
    counter: StateInt,
    amount: i32,
    limit: i32,
}

impl CostModifier {
    pub fn new(name: impl Into<String>, counter: StateInt, amount: i32, limit: i32) -> Self {
        CostModifier {
            name: name.into(),
            counter,
            amount,
            limit,
        }
    }
}

impl VariableBase for CostModifier {
    fn name(&self) -> &str {
        &self.name
    }
}

impl StateModifier for CostModifier {
    fn modify_state(
        &self,
        _ctx: &ClauseContext<'_>,
        _pm: &dyn ProgressionReader,
        input: &LazyStateBuilder,
    ) -> Vec<LazyStateBuilder> {
        if input.get_int(self.counter) + self.amount > self.limit {
            return Vec::new();
        }
        let mut out = input.clone();
        out.increment_int(self.counter, self.amount);
        vec![out]
    }
}

/// Originates states without an input: `provide_state` branches over the
/// configured states (an empty list succeeds with indeterminate output), and
/// `modify_state` passes an existing input through untouched.
#[derive(Debug)]
pub struct OriginModifier {
    name: String,
    states: Vec<State>,
}

impl OriginModifier {
    pub fn new(name: impl Into<String>, states: Vec<State>) -> Self {
        OriginModifier {
            name: name.into(),
            states,
        }
    }

    /// An originator that succeeds with indeterminate output.
    pub fn indeterminate(name: impl Into<String>) -> Self {
        OriginModifier::new(name, Vec::new())
    }
}

impl VariableBase for OriginModifier {
    fn name(&self) -> &str {
        &self.name
    }
}

impl StateModifier for OriginModifier {
    fn modify_state(
        &self,
        _ctx: &ClauseContext<'_>,
        _pm: &dyn ProgressionReader,
        input: &LazyStateBuilder,
    ) -> Vec<LazyStateBuilder> {
        vec![input.clone()]
    }

    fn provide_state(
        &self,
        _ctx: &ClauseContext<'_>,
        _pm: &dyn ProgressionReader,
    ) -> Option<Vec<LazyStateBuilder>> {
        Some(self.states.iter().cloned().map(LazyStateBuilder::new).collect())
    }
}
