//! Read access to progression state, as seen by the evaluator.

use randoforge_core::{StateManager, StateUnion, TermId, TermValue};

/// Object-safe read surface of a progression store.
///
/// The engine's `ProgressionManager` implements this; tests may substitute a
/// fixed map. Evaluation never mutates progression.
pub trait ProgressionReader {
    /// Current integer value of a term. State-valued terms report 1 when
    /// their union is present and 0 otherwise.
    fn get(&self, term: TermId) -> TermValue;

    fn has(&self, term: TermId) -> bool {
        self.get(term) > 0
    }

    /// Current state union of a state-valued term; `None` means the term is
    /// not yet reachable.
    fn get_state(&self, term: TermId) -> Option<&StateUnion>;

    /// The frozen schema backing all states in this run.
    fn state_manager(&self) -> &StateManager;
}
