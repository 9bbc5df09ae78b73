//! Compiled DNF logic definitions.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use randoforge_core::{State, StateUnion, TermId};

use crate::clause::Clause;
use crate::manager::LogicManager;
use crate::reader::ProgressionReader;
use crate::token::LogicToken;
use crate::variable::ClauseContext;

/// A compiled formula in disjunctive normal form: an ordered array of
/// clauses, evaluated in declaration order.
///
/// The per-term clause lookup powering incremental reevaluation is built
/// lazily on first use and shared; defs are immutable and safe to consult
/// from parallel runs.
#[derive(Debug)]
pub struct DnfLogicDef {
    name: String,
    clauses: Box<[Clause]>,
    term_clause_lookup: OnceLock<HashMap<TermId, Vec<usize>>>,
}

impl DnfLogicDef {
    pub fn new(name: impl Into<String>, clauses: Vec<Clause>) -> Self {
        DnfLogicDef {
            name: name.into(),
            clauses: clauses.into_boxed_slice(),
            term_clause_lookup: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether any clause is satisfied: its boolean logic passes and at
    /// least one state path (or the no-input branch) succeeds.
    pub fn can_get(&self, lm: &LogicManager, pm: &dyn ProgressionReader) -> bool {
        self.first_successful_clause(lm, pm).is_some()
    }

    /// Lowest-indexed satisfied clause, honoring declaration order.
    pub fn first_successful_clause(
        &self,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
    ) -> Option<usize> {
        self.clauses.iter().enumerate().find_map(|(index, clause)| {
            let ctx = self.ctx(lm, index);
            (clause.evaluate_logic(lm, pm) && clause.evaluate_state_discard(&ctx, lm, pm))
                .then_some(index)
        })
    }

    /// Evaluates every disjunct, appending output states to `result`.
    /// Returns `true` iff any clause succeeded on the empty branch.
    pub fn evaluate_state(
        &self,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        result: &mut Vec<State>,
    ) -> bool {
        let mut on_empty = false;
        for (index, clause) in self.clauses.iter().enumerate() {
            if !clause.evaluate_logic(lm, pm) {
                continue;
            }
            let ctx = self.ctx(lm, index);
            on_empty |= clause.evaluate_state_change(&ctx, lm, pm, result);
        }
        on_empty
    }

    /// Incremental state reevaluation.
    ///
    /// With `modified_term` set, only clauses depending on that term are
    /// re-evaluated; their outputs merge into `current`. Returns `None` when
    /// there is no state at all, `Some(union)` (possibly empty, meaning
    /// "reachable with indeterminate state") otherwise.
    pub fn check_for_updated_state(
        &self,
        lm: &LogicManager,
        pm: &dyn ProgressionReader,
        current: Option<&StateUnion>,
        modified_term: Option<TermId>,
    ) -> Option<StateUnion> {
        let mut new_states = Vec::new();
        let mut on_empty = false;
        match modified_term {
            Some(term) => {
                let lookup = self.term_clause_lookup(lm);
                if let Some(indices) = lookup.get(&term) {
                    for &index in indices {
                        let clause = &self.clauses[index];
                        if !clause.evaluate_logic(lm, pm) {
                            continue;
                        }
                        let ctx = self.ctx(lm, index);
                        on_empty |= clause.evaluate_state_change(&ctx, lm, pm, &mut new_states);
                    }
                }
            }
            None => {
                on_empty = self.evaluate_state(lm, pm, &mut new_states);
            }
        }
        let sm = pm.state_manager();
        match (new_states.is_empty(), on_empty) {
            (true, false) => current.cloned(),
            (true, true) => Some(current.cloned().unwrap_or_else(StateUnion::empty)),
            (false, _) => StateUnion::try_union(current, &new_states, sm),
        }
    }

    /// Every term the formula depends on, in ascending order.
    pub fn get_terms(&self, lm: &LogicManager) -> Vec<TermId> {
        let mut terms = BTreeSet::new();
        for clause in self.clauses.iter() {
            clause.collect_terms(lm, &mut terms);
        }
        terms.into_iter().collect()
    }

    /// Reconstructs a name-level token stream that a parser can compile back
    /// into an equivalent def.
    pub fn to_token_sequence(&self, lm: &LogicManager) -> Vec<LogicToken> {
        crate::token::tokenize_def(self, lm)
    }

    fn ctx<'a>(&'a self, lm: &'a LogicManager, clause_index: usize) -> ClauseContext<'a> {
        ClauseContext {
            def_name: &self.name,
            clause_index,
            sm: lm.state_manager(),
        }
    }

    fn term_clause_lookup(&self, lm: &LogicManager) -> &HashMap<TermId, Vec<usize>> {
        self.term_clause_lookup.get_or_init(|| {
            let mut lookup: HashMap<TermId, Vec<usize>> = HashMap::new();
            for (index, clause) in self.clauses.iter().enumerate() {
                let mut terms = BTreeSet::new();
                clause.collect_terms(lm, &mut terms);
                for term in terms {
                    lookup.entry(term).or_default().push(index);
                }
            }
            lookup
        })
    }
}
