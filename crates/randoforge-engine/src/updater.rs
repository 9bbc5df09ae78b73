//! The main updater: event-driven fixed-point propagation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use randoforge_core::{RandoCoreError, Result, TermId};
use randoforge_logic::{DnfLogicDef, LogicManager};

use crate::item::LogicItem;
use crate::progression::ProgressionManager;

/// A watcher observing one or more terms, fired when any of them changes.
pub trait UpdateEntry: Debug + Send {
    /// Terms whose changes re-fire this entry.
    fn watched_terms(&self, lm: &LogicManager) -> Vec<TermId>;

    /// Fires the watcher. Returning `true` deactivates the entry: its work
    /// is done and it will not fire again this run.
    fn update(&mut self, pm: &mut ProgressionManager, modified: Option<TermId>) -> bool;
}

/// Grants an item once its location's logic is satisfied. Used for vanilla
/// placements and for fixed placements of other stages.
#[derive(Debug)]
pub struct PrePlacedItemUpdateEntry {
    item: Arc<dyn LogicItem>,
    location: Arc<DnfLogicDef>,
    obtained: bool,
}

impl PrePlacedItemUpdateEntry {
    pub fn new(item: Arc<dyn LogicItem>, location: Arc<DnfLogicDef>) -> Self {
        PrePlacedItemUpdateEntry {
            item,
            location,
            obtained: false,
        }
    }

    pub fn obtained(&self) -> bool {
        self.obtained
    }
}

impl UpdateEntry for PrePlacedItemUpdateEntry {
    fn watched_terms(&self, lm: &LogicManager) -> Vec<TermId> {
        self.location.get_terms(lm)
    }

    fn update(&mut self, pm: &mut ProgressionManager, _modified: Option<TermId>) -> bool {
        if self.obtained {
            return true;
        }
        let lm = pm.shared_logic_manager();
        if !self.location.can_get(&lm, pm) {
            return false;
        }
        tracing::trace!(
            item = self.item.name(),
            location = self.location.name(),
            "pre-placed item obtained"
        );
        self.item.add_to(pm);
        self.obtained = true;
        true
    }
}

/// Keeps a state-valued term (waypoint or transition) in sync with its
/// logic def, merging improved unions back into the manager. Never
/// deactivates: a better union can always arrive.
#[derive(Debug)]
pub struct StateUpdateEntry {
    term: TermId,
    def: Arc<DnfLogicDef>,
}

impl StateUpdateEntry {
    pub fn new(term: TermId, def: Arc<DnfLogicDef>) -> Self {
        StateUpdateEntry { term, def }
    }
}

impl UpdateEntry for StateUpdateEntry {
    fn watched_terms(&self, lm: &LogicManager) -> Vec<TermId> {
        self.def.get_terms(lm)
    }

    fn update(&mut self, pm: &mut ProgressionManager, modified: Option<TermId>) -> bool {
        let lm = pm.shared_logic_manager();
        let current = pm.get_state(self.term).cloned();
        if let Some(union) = self
            .def
            .check_for_updated_state(&lm, pm, current.as_ref(), modified)
        {
            if pm.set_state_if_improved(self.term, union) {
                tracing::trace!(term = self.term, def = self.def.name(), "state union improved");
            }
        }
        false
    }
}

/// Event-driven propagator: drains the progression manager's change queue,
/// re-firing the entries watching each changed term until quiescence.
///
/// Firing order within a pass is unspecified; termination is guaranteed
/// because every update is monotone.
#[derive(Debug, Default)]
pub struct MainUpdater {
    entries: Vec<Box<dyn UpdateEntry>>,
    active: Vec<bool>,
    watchers: HashMap<TermId, Vec<usize>>,
    hooked: bool,
}

impl MainUpdater {
    pub fn new() -> Self {
        MainUpdater::default()
    }

    /// Registers an entry. Entries must be added before the updater hooks.
    pub fn add_entry(&mut self, entry: Box<dyn UpdateEntry>) -> Result<()> {
        if self.hooked {
            return Err(RandoCoreError::InvalidOperation(
                "entries must be registered before the updater hooks".into(),
            ));
        }
        self.entries.push(entry);
        self.active.push(true);
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Links to the manager: builds the watcher index, fires every entry
    /// once, and drains to fixed point.
    pub(crate) fn hook(&mut self, pm: &mut ProgressionManager) {
        let lm = pm.shared_logic_manager();
        self.watchers.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            for term in entry.watched_terms(&lm) {
                self.watchers.entry(term).or_default().push(index);
            }
        }
        self.hooked = true;

        for index in 0..self.entries.len() {
            if self.active[index] && self.entries[index].update(pm, None) {
                self.active[index] = false;
            }
        }
        self.drain(pm);
    }

    /// Drains the change queue: each popped term re-fires its watchers,
    /// whose own mutations enqueue further terms. The pass ends when the
    /// queue empties, which the monotonicity of all updates guarantees.
    pub(crate) fn drain(&mut self, pm: &mut ProgressionManager) {
        let mut epoch = 0u64;
        while let Some(term) = pm.pop_change() {
            let Some(indices) = self.watchers.get(&term).cloned() else {
                continue;
            };
            epoch += 1;
            for index in indices {
                if self.active[index] && self.entries[index].update(pm, Some(term)) {
                    self.active[index] = false;
                }
            }
        }
        if epoch > 0 {
            tracing::trace!(passes = epoch, "updater drained");
        }
    }
}
