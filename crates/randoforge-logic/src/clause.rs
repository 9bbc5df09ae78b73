//! One conjunctive clause of a DNF formula, and its evaluation primitives.

use std::collections::BTreeSet;

use randoforge_core::{LazyStateBuilder, State, StateUnion, TermId};

use crate::manager::LogicManager;
use crate::ops::{is_term, is_variable, LogicReader, LogicStep};
use crate::reader::ProgressionReader;
use crate::variable::{ClauseContext, Variable};

/// A compiled conjunction: boolean logic, state logic, and the clause's
/// state origin.
///
/// Both arrays are in the mixed tag form decoded by
/// [`LogicReader`](crate::ops::LogicReader). `state_provider` names where the
/// clause's input state comes from: a state-valued term, a
/// [`StateProvider`](crate::variable::StateProvider) variable, or nothing.
#[derive(Debug, Clone)]
pub struct Clause {
    logic: Box<[i32]>,
    state_logic: Box<[i32]>,
    state_provider: Option<i32>,
}

impl Clause {
    pub fn new(logic: Vec<i32>, state_logic: Vec<i32>, state_provider: Option<i32>) -> Self {
        Clause {
            logic: logic.into_boxed_slice(),
            state_logic: state_logic.into_boxed_slice(),
            state_provider,
        }
    }

    pub fn logic(&self) -> &[i32] {
        &self.logic
    }

    pub fn state_logic(&self) -> &[i32] {
        &self.state_logic
    }

    pub fn state_provider(&self) -> Option<i32> {
        self.state_provider
    }

    /// Walks the boolean logic left to right; any atomic failure
    /// short-circuits the clause to false.
    pub fn evaluate_logic(&self, lm: &LogicManager, pm: &dyn ProgressionReader) -> bool {
        for step in LogicReader::new(&self.logic) {
            let ok = match step {
                LogicStep::Term(t) => pm.has(t),
                LogicStep::Any => true,
                LogicStep::None => false,
                LogicStep::Variable(v) => resolve_int(lm, pm, v).is_some_and(|value| value > 0),
                LogicStep::Comparison(op, lhs, rhs) => {
                    match (resolve_int(lm, pm, lhs), resolve_int(lm, pm, rhs)) {
                        (Some(l), Some(r)) => op.apply(l, r),
                        _ => false,
                    }
                }
            };
            if !ok {
                return false;
            }
        }
        true
    }

    /// The clause's input state union, if its provider yields one.
    pub fn input_state(&self, lm: &LogicManager, pm: &dyn ProgressionReader) -> Option<StateUnion> {
        match self.state_provider {
            Some(id) if is_term(id) => pm.get_state(id).cloned(),
            Some(id) if is_variable(id) => lm
                .variable_by_id(id)
                .and_then(Variable::as_provider)
                .and_then(|p| p.input_state(pm)),
            _ => None,
        }
    }

    /// Whether at least one (input x state-logic) path succeeds, without
    /// materializing outputs.
    pub fn evaluate_state_discard(
        &self,
        ctx: &ClauseContext<'_>,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
    ) -> bool {
        if let Some(union) = self.input_state(lm, pm) {
            for state in union.iter() {
                if self.discard_rec(ctx, lm, pm, 0, &LazyStateBuilder::new(state.clone())) {
                    return true;
                }
            }
        }
        self.empty_discard_rec(ctx, lm, pm, 0)
    }

    /// Enumerates output states into `result`. Returns `true` iff the clause
    /// also succeeds on the empty/indeterminate branch.
    pub fn evaluate_state_change(
        &self,
        ctx: &ClauseContext<'_>,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        result: &mut Vec<State>,
    ) -> bool {
        if let Some(union) = self.input_state(lm, pm) {
            for state in union.iter() {
                self.change_rec(ctx, lm, pm, 0, LazyStateBuilder::new(state.clone()), result);
            }
        }
        self.empty_change_rec(ctx, lm, pm, 0, result)
    }

    /// Every term the clause depends on: logic entries, state-logic entries,
    /// the provider, and the terms read by referenced variables.
    pub fn collect_terms(&self, lm: &LogicManager, out: &mut BTreeSet<TermId>) {
        let mut visit = |seq: &[i32]| {
            for step in LogicReader::new(seq) {
                match step {
                    LogicStep::Term(t) => {
                        out.insert(t);
                    }
                    LogicStep::Variable(v) => visit_variable(lm, v, out),
                    LogicStep::Comparison(_, lhs, rhs) => {
                        for id in [lhs, rhs] {
                            if is_term(id) {
                                out.insert(id);
                            } else if is_variable(id) {
                                visit_variable(lm, id, out);
                            }
                        }
                    }
                    _ => {}
                }
            }
        };
        visit(&self.logic);
        visit(&self.state_logic);
        match self.state_provider {
            Some(id) if is_term(id) => {
                out.insert(id);
            }
            Some(id) if is_variable(id) => visit_variable(lm, id, out),
            _ => {}
        }
    }

    fn change_rec(
        &self,
        ctx: &ClauseContext<'_>,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        pos: usize,
        builder: LazyStateBuilder,
        result: &mut Vec<State>,
    ) {
        let Some(step) = LogicReader::at(&self.state_logic, pos).peek() else {
            result.push(builder.get_state());
            return;
        };
        match step {
            LogicStep::Variable(v) => {
                let Some(modifier) = lm.variable_by_id(v).and_then(Variable::as_modifier) else {
                    debug_assert!(false, "non-modifier variable in state logic");
                    return;
                };
                for next in modifier.modify_state(ctx, pm, &builder) {
                    self.change_rec(ctx, lm, pm, pos + 1, next, result);
                }
            }
            LogicStep::Comparison(op, lhs, rhs) => {
                let lv = resolve_state_operand(lm, pm, &builder, lhs);
                let rv = resolve_state_operand(lm, pm, &builder, rhs);
                if let (Some(l), Some(r)) = (lv, rv) {
                    if op.apply(l, r) {
                        self.change_rec(ctx, lm, pm, pos + 3, builder, result);
                    }
                }
            }
            _ => {
                debug_assert!(false, "boolean-only step in state logic");
            }
        }
    }

    /// No-input branch: only state-originating modifiers are valid here; a
    /// comparison requires an input state and fails the branch. Returns
    /// `true` iff an indeterminate path reaches the end of the sequence.
    fn empty_change_rec(
        &self,
        ctx: &ClauseContext<'_>,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        pos: usize,
        result: &mut Vec<State>,
    ) -> bool {
        let Some(step) = LogicReader::at(&self.state_logic, pos).peek() else {
            return true;
        };
        match step {
            LogicStep::Variable(v) => {
                let Some(modifier) = lm.variable_by_id(v).and_then(Variable::as_modifier) else {
                    return false;
                };
                match modifier.provide_state(ctx, pm) {
                    None => false,
                    Some(builders) if builders.is_empty() => {
                        self.empty_change_rec(ctx, lm, pm, pos + 1, result)
                    }
                    Some(builders) => {
                        for builder in builders {
                            self.change_rec(ctx, lm, pm, pos + 1, builder, result);
                        }
                        false
                    }
                }
            }
            _ => false,
        }
    }

    fn discard_rec(
        &self,
        ctx: &ClauseContext<'_>,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        pos: usize,
        builder: &LazyStateBuilder,
    ) -> bool {
        let Some(step) = LogicReader::at(&self.state_logic, pos).peek() else {
            return true;
        };
        match step {
            LogicStep::Variable(v) => lm
                .variable_by_id(v)
                .and_then(Variable::as_modifier)
                .is_some_and(|modifier| {
                    modifier
                        .modify_state(ctx, pm, builder)
                        .iter()
                        .any(|next| self.discard_rec(ctx, lm, pm, pos + 1, next))
                }),
            LogicStep::Comparison(op, lhs, rhs) => {
                let lv = resolve_state_operand(lm, pm, builder, lhs);
                let rv = resolve_state_operand(lm, pm, builder, rhs);
                match (lv, rv) {
                    (Some(l), Some(r)) => {
                        op.apply(l, r) && self.discard_rec(ctx, lm, pm, pos + 3, builder)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn empty_discard_rec(
        &self,
        ctx: &ClauseContext<'_>,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        pos: usize,
    ) -> bool {
        let Some(step) = LogicReader::at(&self.state_logic, pos).peek() else {
            return true;
        };
        match step {
            LogicStep::Variable(v) => lm
                .variable_by_id(v)
                .and_then(Variable::as_modifier)
                .is_some_and(|modifier| match modifier.provide_state(ctx, pm) {
                    None => false,
                    Some(builders) if builders.is_empty() => {
                        self.empty_discard_rec(ctx, lm, pm, pos + 1)
                    }
                    Some(builders) => builders
                        .iter()
                        .any(|builder| self.discard_rec(ctx, lm, pm, pos + 1, builder)),
                }),
            _ => false,
        }
    }
}

/// Resolves a boolean-logic comparison operand: terms via the progression
/// store, variables via their integer capability.
fn resolve_int(lm: &LogicManager, pm: &dyn ProgressionReader, id: i32) -> Option<i32> {
    if is_term(id) {
        return Some(pm.get(id));
    }
    lm.variable_by_id(id)?
        .as_logic_int()
        .map(|variable| variable.value(pm))
}

/// Resolves a state-logic comparison operand, additionally consulting state
/// access variables against the current builder.
fn resolve_state_operand(
    lm: &LogicManager,
    pm: &dyn ProgressionReader,
    builder: &LazyStateBuilder,
    id: i32,
) -> Option<i32> {
    if is_term(id) {
        return Some(pm.get(id));
    }
    let variable = lm.variable_by_id(id)?;
    if let Some(access) = variable.as_access() {
        return Some(access.value_from(pm, builder));
    }
    variable.as_logic_int().map(|v| v.value(pm))
}

fn visit_variable(lm: &LogicManager, id: i32, out: &mut BTreeSet<TermId>) {
    if let Some(variable) = lm.variable_by_id(id) {
        out.extend(variable.terms());
    }
}
