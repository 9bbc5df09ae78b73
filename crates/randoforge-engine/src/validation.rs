//! Post-run validation: counts, uniqueness, and replay reachability.

use std::collections::HashSet;
use std::sync::Arc;

use randoforge_logic::LogicManager;

use crate::error::{Result, ValidationError};
use crate::progression::ProgressionManager;
use crate::randomizer::RandoContext;
use crate::stage::{RandomizationStage, RandoPlacement};
use crate::updater::{MainUpdater, PrePlacedItemUpdateEntry, StateUpdateEntry};

/// Checks the full run's invariants: every group's placement list matches
/// its item pool, no item or location is used twice, and replaying every
/// placement into a fresh manager makes each placed location reachable.
pub(crate) fn validate_run(
    lm: &Arc<LogicManager>,
    ctx: &RandoContext,
    stages: &[RandomizationStage],
    staged_placements: &[Vec<Vec<RandoPlacement>>],
) -> Result<()> {
    if staged_placements.len() != stages.len() {
        return Err(ValidationError::new(format!(
            "{} placement stages for {} stages",
            staged_placements.len(),
            stages.len()
        ))
        .into());
    }

    for (stage, placements) in stages.iter().zip(staged_placements) {
        if placements.len() != stage.groups.len() {
            return Err(ValidationError::new(format!(
                "stage {}: {} placement groups for {} groups",
                stage.label,
                placements.len(),
                stage.groups.len()
            ))
            .into());
        }
        for (group, group_placements) in stage.groups.iter().zip(placements) {
            let expected = group.items.len() - group.discarded.len();
            if group_placements.len() != expected {
                return Err(ValidationError::new(format!(
                    "group {}: {} placements for {} placeable items",
                    group.label,
                    group_placements.len(),
                    expected
                ))
                .into());
            }
            let mut items = HashSet::new();
            let mut locations = HashSet::new();
            for placement in group_placements {
                if !items.insert(placement.item) {
                    return Err(ValidationError::new(format!(
                        "group {}: item {} placed twice",
                        group.label,
                        group.items[placement.item].name()
                    ))
                    .into());
                }
                if !locations.insert(placement.location) {
                    return Err(ValidationError::new(format!(
                        "group {}: location {} filled twice",
                        group.label,
                        group.locations[placement.location].name()
                    ))
                    .into());
                }
            }
        }
    }

    // Replay everything into a fresh manager and updater.
    let mut pm = ProgressionManager::new(Arc::clone(lm));
    let mut mu = MainUpdater::new();
    for (term, def) in &ctx.waypoints {
        mu.add_entry(Box::new(StateUpdateEntry::new(*term, Arc::clone(def))))?;
    }
    for (item, location) in &ctx.vanilla {
        mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
            Arc::clone(item),
            Arc::clone(location),
        )))?;
    }
    for (stage, placements) in stages.iter().zip(staged_placements) {
        for (group, group_placements) in stage.groups.iter().zip(placements) {
            for placement in group_placements {
                mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
                    Arc::clone(&group.items[placement.item].effect),
                    Arc::clone(&group.locations[placement.location].logic),
                )))?;
            }
        }
    }
    pm.attach_and_hook(mu);

    for (stage, placements) in stages.iter().zip(staged_placements) {
        for (group, group_placements) in stage.groups.iter().zip(placements) {
            for placement in group_placements {
                let location = &group.locations[placement.location];
                if !location.logic.can_get(lm, &pm) {
                    return Err(ValidationError::new(format!(
                        "group {}: placement {} -> {} is unreachable",
                        group.label,
                        group.items[placement.item].name(),
                        location.name()
                    ))
                    .into());
                }
            }
        }
    }
    Ok(())
}
