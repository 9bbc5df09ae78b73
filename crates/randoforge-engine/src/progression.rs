//! The progression manager: the live knowledge base of a run.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;

use randoforge_core::{StateManager, StateUnion, TermId, TermValue};
use randoforge_logic::{LogicManager, ProgressionReader};

use crate::item::LogicItem;
use crate::updater::MainUpdater;

/// Mutable fixed-point store of term values and per-term state unions.
///
/// Monotone within a stage: term values never decrease and unions are only
/// replaced by strictly-improving ones. Every mutation enqueues the affected
/// term; draining the queue through the attached [`MainUpdater`] reaches a
/// fixed point because all updates are monotone.
#[derive(Debug)]
pub struct ProgressionManager {
    lm: Arc<LogicManager>,
    obtained: Vec<TermValue>,
    state_unions: Vec<Option<StateUnion>>,
    change_queue: VecDeque<TermId>,
    updater: Option<MainUpdater>,
}

impl ProgressionManager {
    pub fn new(lm: Arc<LogicManager>) -> Self {
        let terms = lm.term_count();
        ProgressionManager {
            lm,
            obtained: vec![0; terms],
            state_unions: vec![None; terms],
            change_queue: VecDeque::new(),
            updater: None,
        }
    }

    pub fn logic_manager(&self) -> &LogicManager {
        &self.lm
    }

    pub fn shared_logic_manager(&self) -> Arc<LogicManager> {
        Arc::clone(&self.lm)
    }

    /// Current value of a term. A state-valued term reads 1 when its union
    /// is present and 0 otherwise.
    pub fn get(&self, term: TermId) -> TermValue {
        if self.lm.is_state_term(term) {
            return self.state_unions[term as usize].is_some() as TermValue;
        }
        self.obtained[term as usize]
    }

    pub fn has(&self, term: TermId) -> bool {
        self.get(term) > 0
    }

    pub fn get_state(&self, term: TermId) -> Option<&StateUnion> {
        self.state_unions[term as usize].as_ref()
    }

    /// Raw counter of a term, ignoring state-valued derivation.
    pub fn value_of(&self, term: TermId) -> TermValue {
        self.obtained[term as usize]
    }

    /// Increments a term and enqueues it for propagation. Item effects call
    /// this; the queue drains once the triggering `add` returns.
    pub fn incr(&mut self, term: TermId, amount: TermValue) {
        if amount == 0 {
            return;
        }
        self.obtained[term as usize] += amount;
        self.change_queue.push_back(term);
    }

    /// Merges a union into a state-valued term, keeping only strict
    /// improvements under the dominance order.
    pub fn give_state(&mut self, term: TermId, union: StateUnion) {
        let sm = self.lm.state_manager();
        let current = self.state_unions[term as usize].as_ref();
        if let Some(merged) = StateUnion::try_union(current, union.states(), sm) {
            // An empty incoming union still flips an absent term to
            // "reachable with indeterminate state".
            let improved = current != Some(&merged);
            if improved || current.is_none() {
                self.set_state_internal(term, merged);
            }
        } else if current.is_none() {
            self.set_state_internal(term, StateUnion::empty());
        }
    }

    /// Replaces a term's union when the replacement differs, enqueueing the
    /// term. Used by managed-state watchers that already merged.
    pub(crate) fn set_state_if_improved(&mut self, term: TermId, union: StateUnion) -> bool {
        if self.state_unions[term as usize].as_ref() == Some(&union) {
            return false;
        }
        self.set_state_internal(term, union);
        true
    }

    fn set_state_internal(&mut self, term: TermId, union: StateUnion) {
        self.state_unions[term as usize] = Some(union);
        self.change_queue.push_back(term);
    }

    /// Applies an item's effects, then drives the updater to fixed point.
    pub fn add(&mut self, item: &dyn LogicItem) {
        tracing::trace!(item = item.name(), "adding item");
        item.add_to(self);
        self.run_updates();
    }

    /// [`ProgressionManager::add`] with the source location recorded for
    /// diagnostics.
    pub fn add_at(&mut self, item: &dyn LogicItem, location: &str) {
        tracing::trace!(item = item.name(), location, "adding placed item");
        item.add_to(self);
        self.run_updates();
    }

    pub fn add_all<'a>(&mut self, items: impl IntoIterator<Item = &'a dyn LogicItem>) {
        for item in items {
            item.add_to(self);
        }
        self.run_updates();
    }

    /// Attaches an updater, performing its initial sweep and driving the
    /// change queue to fixed point.
    pub fn attach_and_hook(&mut self, mut updater: MainUpdater) {
        updater.hook(self);
        self.updater = Some(updater);
        self.run_updates();
    }

    /// Zeroes all term values and unions; the attached updater is dropped.
    pub fn reset(&mut self) {
        self.obtained.fill(0);
        self.state_unions.fill(None);
        self.change_queue.clear();
        self.updater = None;
    }

    pub(crate) fn pop_change(&mut self) -> Option<TermId> {
        self.change_queue.pop_front()
    }

    pub(crate) fn run_updates(&mut self) {
        // The updater is detached while draining so entries can mutate this
        // manager without aliasing it.
        let Some(mut updater) = self.updater.take() else {
            return;
        };
        updater.drain(self);
        self.updater = Some(updater);
    }

    /// Diagnostic rendering of all non-zero terms.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for term in self.lm.terms() {
            let value = self.get(term.id());
            if value != 0 {
                let _ = write!(out, "{}={} ", term.name(), value);
            }
        }
        out
    }
}

impl ProgressionReader for ProgressionManager {
    fn get(&self, term: TermId) -> TermValue {
        ProgressionManager::get(self, term)
    }

    fn get_state(&self, term: TermId) -> Option<&StateUnion> {
        ProgressionManager::get_state(self, term)
    }

    fn state_manager(&self) -> &StateManager {
        self.lm.state_manager()
    }
}
