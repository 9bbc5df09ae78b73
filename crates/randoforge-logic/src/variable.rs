//! Logic variables: negative-id symbols with pluggable behavior.
//!
//! Variables are modeled as a tagged sum over capability traits rather than a
//! deep hierarchy; the evaluator dispatches on the tag. All variables expose
//! the common surface (`name`, `terms`); the kind decides where they may
//! appear in a compiled clause.

use std::fmt::Debug;
use std::sync::Arc;

use randoforge_core::{LazyStateBuilder, StateInt, StateManager, StateUnion, TermId};

use crate::reader::ProgressionReader;

/// Non-owning evaluation context handed to variable callbacks: the parent
/// def is identified by name and clause index instead of a back-pointer, so
/// compiled defs form no reference cycles.
#[derive(Debug, Clone, Copy)]
pub struct ClauseContext<'a> {
    pub def_name: &'a str,
    pub clause_index: usize,
    pub sm: &'a StateManager,
}

/// Common capability surface of every variable.
pub trait VariableBase: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Terms the variable reads; dependents must be re-evaluated when any of
    /// them changes.
    fn terms(&self) -> Vec<TermId> {
        Vec::new()
    }
}

/// A variable resolving to an integer for comparison operands and bare
/// appearances in boolean logic.
pub trait LogicInt: VariableBase {
    fn value(&self, pm: &dyn ProgressionReader) -> i32;
}

/// A [`LogicInt`] that can additionally originate the input state of its
/// clause.
pub trait StateProvider: LogicInt {
    fn input_state(&self, pm: &dyn ProgressionReader) -> Option<StateUnion>;
}

/// A variable transforming the in-flight lazy state during state-logic
/// evaluation, and/or originating states on the no-input branch.
pub trait StateModifier: VariableBase {
    /// Transforms the input builder into zero or more output builders; an
    /// empty result fails this branch.
    fn modify_state(
        &self,
        ctx: &ClauseContext<'_>,
        pm: &dyn ProgressionReader,
        input: &LazyStateBuilder,
    ) -> Vec<LazyStateBuilder>;

    /// Originates states without an input. `None` fails the no-input branch;
    /// an empty vector succeeds with indeterminate output; a non-empty
    /// vector yields branches.
    fn provide_state(
        &self,
        _ctx: &ClauseContext<'_>,
        _pm: &dyn ProgressionReader,
    ) -> Option<Vec<LazyStateBuilder>> {
        None
    }
}

/// A variable reading a scalar from the in-flight lazy state. Valid only as
/// a comparison operand inside state logic.
pub trait StateAccessVariable: VariableBase {
    fn value_from(&self, pm: &dyn ProgressionReader, state: &LazyStateBuilder) -> i32;
}

/// Tagged sum of the variable kinds.
#[derive(Debug, Clone)]
pub enum Variable {
    Int(Arc<dyn LogicInt>),
    Provider(Arc<dyn StateProvider>),
    Modifier(Arc<dyn StateModifier>),
    Access(Arc<dyn StateAccessVariable>),
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Variable::Int(v) => v.name(),
            Variable::Provider(v) => v.name(),
            Variable::Modifier(v) => v.name(),
            Variable::Access(v) => v.name(),
        }
    }

    pub fn terms(&self) -> Vec<TermId> {
        match self {
            Variable::Int(v) => v.terms(),
            Variable::Provider(v) => v.terms(),
            Variable::Modifier(v) => v.terms(),
            Variable::Access(v) => v.terms(),
        }
    }

    /// Integer capability: plain ints and state providers both qualify.
    pub fn as_logic_int(&self) -> Option<&dyn LogicInt> {
        match self {
            Variable::Int(v) => Some(v.as_ref()),
            Variable::Provider(v) => Some(v.as_ref() as &dyn LogicInt),
            _ => None,
        }
    }

    pub fn as_provider(&self) -> Option<&dyn StateProvider> {
        match self {
            Variable::Provider(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_modifier(&self) -> Option<&dyn StateModifier> {
        match self {
            Variable::Modifier(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    pub fn as_access(&self) -> Option<&dyn StateAccessVariable> {
        match self {
            Variable::Access(v) => Some(v.as_ref()),
            _ => None,
        }
    }
}

/// Built-in integer-literal variable, resolved for purely numeric names.
#[derive(Debug)]
pub struct ConstantVariable {
    name: String,
    value: i32,
}

impl ConstantVariable {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        ConstantVariable {
            name: name.into(),
            value,
        }
    }
}

impl VariableBase for ConstantVariable {
    fn name(&self) -> &str {
        &self.name
    }
}

impl LogicInt for ConstantVariable {
    fn value(&self, _pm: &dyn ProgressionReader) -> i32 {
        self.value
    }
}

/// Built-in state-field access variable: reads `$FIELD` from the in-flight
/// builder. Bool fields read as 0/1.
#[derive(Debug)]
pub struct StateFieldVariable {
    name: String,
    field: StateFieldRef,
}

#[derive(Debug, Clone, Copy)]
enum StateFieldRef {
    Bool(randoforge_core::StateBool),
    Int(StateInt),
}

impl StateFieldVariable {
    /// The `$` prefix marks state-field access in logic source.
    pub const PREFIX: &'static str = "$";

    pub fn try_resolve(sm: &StateManager, name: &str) -> Option<Self> {
        let field_name = name.strip_prefix(Self::PREFIX)?;
        let field = if let Some(b) = sm.get_bool(field_name) {
            StateFieldRef::Bool(b)
        } else {
            StateFieldRef::Int(sm.get_int(field_name)?)
        };
        Some(StateFieldVariable {
            name: name.to_string(),
            field,
        })
    }
}

impl VariableBase for StateFieldVariable {
    fn name(&self) -> &str {
        &self.name
    }
}

impl StateAccessVariable for StateFieldVariable {
    fn value_from(&self, _pm: &dyn ProgressionReader, state: &LazyStateBuilder) -> i32 {
        match self.field {
            StateFieldRef::Bool(b) => state.get_bool(b) as i32,
            StateFieldRef::Int(i) => state.get_int(i),
        }
    }
}
