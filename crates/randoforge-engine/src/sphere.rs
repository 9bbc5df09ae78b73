//! Sphere-by-sphere reachability expansion.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{OutOfLocationsError, Result};
use crate::group::{PlacementState, RandomizationGroup};
use crate::progression::ProgressionManager;
use crate::selector::GroupItemSelector;

/// One batch of progression: the items accepted together and the locations
/// they newly unlocked, per group in declaration order.
///
/// Sphere 0 carries the initially-reachable locations with no items; a
/// terminal sphere may carry leftover items with no locations.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub items: Vec<Vec<usize>>,
    pub locations: Vec<Vec<usize>>,
}

impl Sphere {
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(Vec::is_empty) && self.locations.iter().all(Vec::is_empty)
    }
}

/// Iteratively advances reachability over a stage's groups, emitting
/// spheres until every selector is exhausted.
///
/// The proposal loop is cumulative: priority layers are proposed (their
/// effects entering the progression manager) until new locations unlock,
/// and everything proposed in the round is accepted into the emitted
/// sphere. A round that exhausts the selectors with locations still
/// unreachable fails with [`OutOfLocationsError`].
#[derive(Debug)]
pub struct SphereBuilder<'a> {
    pm: &'a mut ProgressionManager,
    groups: &'a mut [RandomizationGroup],
    selectors: Vec<GroupItemSelector>,
    mode: PlacementState,
    spheres: Vec<Sphere>,
    granted: HashSet<(usize, usize)>,
    initialized: bool,
    done: bool,
}

impl<'a> SphereBuilder<'a> {
    pub fn new(
        pm: &'a mut ProgressionManager,
        groups: &'a mut [RandomizationGroup],
        mode: PlacementState,
    ) -> Self {
        let selectors = groups
            .iter()
            .enumerate()
            .map(|(index, group)| GroupItemSelector::new(index, group))
            .collect();
        SphereBuilder {
            pm,
            groups,
            selectors,
            mode,
            spheres: Vec::new(),
            granted: HashSet::new(),
            initialized: false,
            done: false,
        }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn into_spheres(self) -> Vec<Sphere> {
        self.spheres
    }

    /// Emits the next sphere. Returns `false` once every selector is
    /// finished.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if !self.initialized {
            return self.initialize().map(|_| true);
        }
        if self.all_locations_reachable() {
            return self.terminal_sweep();
        }
        self.proposal_round()
    }

    /// Drives to completion; callers wanting cancellation points loop over
    /// [`SphereBuilder::advance`] themselves.
    pub fn run_to_completion(&mut self) -> Result<()> {
        while self.advance()? {}
        Ok(())
    }

    /// Sphere 0: everything reachable before any proposal.
    fn initialize(&mut self) -> Result<()> {
        let locations = self.collect_new_locations();
        for (index, new) in locations.iter().enumerate() {
            self.selectors[index].increment_cap(new.len() as i32)?;
        }
        tracing::debug!(
            locations = locations.iter().map(Vec::len).sum::<usize>(),
            "initial sphere"
        );
        self.spheres.push(Sphere {
            items: vec![Vec::new(); self.groups.len()],
            locations,
        });
        self.initialized = true;
        Ok(())
    }

    fn proposal_round(&mut self) -> Result<bool> {
        loop {
            let Some(frontier) = self.next_frontier() else {
                return Err(OutOfLocationsError(format!(
                    "selectors exhausted with {} locations unreachable",
                    self.unreachable_location_count()
                ))
                .into());
            };

            for index in 0..self.groups.len() {
                loop {
                    let next = self.selectors[index]
                        .try_get_next_proposal_priority(&mut self.groups[index]);
                    match next {
                        Some(priority) if priority.total_cmp(&frontier).is_eq() => {}
                        _ => break,
                    }
                    let Some(item) =
                        self.selectors[index].try_propose_next(&mut self.groups[index])
                    else {
                        break;
                    };
                    if self.granted.insert((index, item)) {
                        let effect = Arc::clone(&self.groups[index].items[item].effect);
                        self.pm.add(effect.as_ref());
                    }
                }
            }

            let locations = self.collect_new_locations();
            if locations.iter().all(Vec::is_empty) {
                // No progress: keep the proposals live and try the next
                // priority layer on top of them.
                continue;
            }

            let mut items = Vec::with_capacity(self.groups.len());
            for (index, selector) in self.selectors.iter_mut().enumerate() {
                selector.accept_all_proposed();
                items.push(selector.take_accepted());
                selector.increment_cap(locations[index].len() as i32)?;
                selector.finish_accepting(&self.groups[index]);
            }
            tracing::debug!(
                sphere = self.spheres.len(),
                items = items.iter().map(Vec::len).sum::<usize>(),
                locations = locations.iter().map(Vec::len).sum::<usize>(),
                "sphere emitted"
            );
            self.spheres.push(Sphere { items, locations });
            return Ok(true);
        }
    }

    /// Accepts every leftover item into a final location-less sphere.
    fn terminal_sweep(&mut self) -> Result<bool> {
        let mut items = Vec::with_capacity(self.groups.len());
        for (index, selector) in self.selectors.iter_mut().enumerate() {
            let leftovers = selector.finish(&mut self.groups[index])?;
            items.push(leftovers);
            self.groups[index]
                .discarded
                .extend(selector.collect_discarded());
        }
        self.done = true;
        if items.iter().all(Vec::is_empty) {
            return Ok(false);
        }
        self.spheres.push(Sphere {
            items,
            locations: vec![Vec::new(); self.groups.len()],
        });
        Ok(true)
    }

    fn next_frontier(&mut self) -> Option<f32> {
        let mut frontier: Option<f32> = None;
        for index in 0..self.groups.len() {
            if let Some(priority) =
                self.selectors[index].try_get_next_proposal_priority(&mut self.groups[index])
            {
                frontier = Some(match frontier {
                    Some(current) if current.total_cmp(&priority).is_le() => current,
                    _ => priority,
                });
            }
        }
        frontier
    }

    fn all_locations_reachable(&self) -> bool {
        self.groups.iter().all(|group| {
            group
                .locations
                .iter()
                .all(|location| location.reachable != PlacementState::None)
        })
    }

    fn unreachable_location_count(&self) -> usize {
        self.groups
            .iter()
            .map(|group| {
                group
                    .locations
                    .iter()
                    .filter(|location| location.reachable == PlacementState::None)
                    .count()
            })
            .sum()
    }

    /// Marks and collects locations that just became reachable, ascending
    /// by priority within each group.
    fn collect_new_locations(&mut self) -> Vec<Vec<usize>> {
        let lm = self.pm.shared_logic_manager();
        let pm: &ProgressionManager = self.pm;
        let mode = self.mode;
        let mut out = Vec::with_capacity(self.groups.len());
        for group in self.groups.iter_mut() {
            let mut fresh = Vec::new();
            for (index, location) in group.locations.iter_mut().enumerate() {
                if location.reachable == PlacementState::None && location.logic.can_get(&lm, pm) {
                    location.reachable = mode;
                    fresh.push(index);
                }
            }
            fresh.sort_by(|&a, &b| {
                group.locations[a]
                    .priority
                    .total_cmp(&group.locations[b].priority)
            });
            out.push(fresh);
        }
        out
    }
}
