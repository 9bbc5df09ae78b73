//! Randomization groups: items and locations under one label.

use std::sync::Arc;

use randoforge_logic::DnfLogicDef;

use crate::item::LogicItem;

/// Canonical tri-state for items (placed) and locations (reachable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementState {
    #[default]
    None,
    Temporary,
    Permanent,
}

/// An item under randomization: a shared immutable effect plus the mutable
/// placement bookkeeping the selectors drive.
#[derive(Debug, Clone)]
pub struct RandoItem {
    pub effect: Arc<dyn LogicItem>,
    pub priority: f32,
    pub placed: PlacementState,
}

impl RandoItem {
    pub fn new(effect: Arc<dyn LogicItem>) -> Self {
        RandoItem {
            effect,
            priority: 0.0,
            placed: PlacementState::None,
        }
    }

    pub fn name(&self) -> &str {
        self.effect.name()
    }
}

/// A location under randomization: availability logic plus reachability
/// bookkeeping.
#[derive(Debug, Clone)]
pub struct RandoLocation {
    pub logic: Arc<DnfLogicDef>,
    pub priority: f32,
    pub reachable: PlacementState,
}

impl RandoLocation {
    pub fn new(logic: Arc<DnfLogicDef>) -> Self {
        RandoLocation {
            logic,
            priority: 0.0,
            reachable: PlacementState::None,
        }
    }

    pub fn name(&self) -> &str {
        self.logic.name()
    }
}

/// Items and locations randomized together under one label.
///
/// In a coupled group the element at index `i` is simultaneously the item
/// `items[i]` and the location `locations[i]`; the vectors are never
/// reordered (permutation shuffles priorities only), so the dual of an item
/// is the location at the same index.
#[derive(Debug)]
pub struct RandomizationGroup {
    pub label: String,
    pub items: Vec<RandoItem>,
    pub locations: Vec<RandoLocation>,
    pub coupled: bool,
    /// Coupled items dropped because their dual was consumed as a location;
    /// filled when a sphere pass completes.
    pub discarded: Vec<usize>,
}

impl RandomizationGroup {
    pub fn new(
        label: impl Into<String>,
        items: Vec<RandoItem>,
        locations: Vec<RandoLocation>,
    ) -> Self {
        RandomizationGroup {
            label: label.into(),
            items,
            locations,
            coupled: false,
            discarded: Vec::new(),
        }
    }

    /// A coupled group over item/location pairs of equal length.
    pub fn coupled(
        label: impl Into<String>,
        items: Vec<RandoItem>,
        locations: Vec<RandoLocation>,
    ) -> Self {
        debug_assert_eq!(items.len(), locations.len());
        RandomizationGroup {
            label: label.into(),
            items,
            locations,
            coupled: true,
            discarded: Vec::new(),
        }
    }

    /// Clears all placement bookkeeping, keeping priorities.
    pub fn reset(&mut self) {
        for item in &mut self.items {
            item.placed = PlacementState::None;
        }
        for location in &mut self.locations {
            location.reachable = PlacementState::None;
        }
        self.discarded.clear();
    }
}
