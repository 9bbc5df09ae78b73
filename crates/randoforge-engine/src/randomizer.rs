//! The staged randomizer: permutation, forward passes, rerandomization,
//! retry and validation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use randoforge_config::RandomizerConfig;
use randoforge_core::TermId;
use randoforge_logic::{DnfLogicDef, LogicManager};

use crate::error::{RandoError, Result};
use crate::event::EventSupport;
use crate::group::PlacementState;
use crate::item::LogicItem;
use crate::progression::ProgressionManager;
use crate::sphere::SphereBuilder;
use crate::stage::{PlacementRecord, RandomizationStage, RandoPlacement};
use crate::updater::{MainUpdater, PrePlacedItemUpdateEntry, StateUpdateEntry};
use crate::validation::validate_run;

/// World context independent of any particular stage: managed-state
/// waypoints/transitions and vanilla placements, hooked into every run's
/// updater.
#[derive(Debug, Default)]
pub struct RandoContext {
    pub waypoints: Vec<(TermId, Arc<DnfLogicDef>)>,
    pub vanilla: Vec<(Arc<dyn LogicItem>, Arc<DnfLogicDef>)>,
}

impl RandoContext {
    pub fn new() -> Self {
        RandoContext::default()
    }

    pub fn add_waypoint(&mut self, term: TermId, def: Arc<DnfLogicDef>) {
        self.waypoints.push((term, def));
    }

    pub fn add_vanilla(&mut self, item: Arc<dyn LogicItem>, location: Arc<DnfLogicDef>) {
        self.vanilla.push((item, location));
    }
}

/// Orchestrates the full pipeline: permute, forward stages with later
/// stages pre-added, a permanent last stage, reverse rerandomization with
/// other stages fixed, retry on exhaustion, and validation.
#[derive(Debug)]
pub struct Randomizer {
    lm: Arc<LogicManager>,
    ctx: RandoContext,
    stages: Vec<RandomizationStage>,
    rng: ChaCha8Rng,
    staged_placements: Vec<Vec<Vec<RandoPlacement>>>,
    events: EventSupport,
    cancel: Arc<AtomicBool>,
    attempt_limit: Option<u32>,
}

impl Randomizer {
    pub fn new(
        lm: Arc<LogicManager>,
        ctx: RandoContext,
        stages: Vec<RandomizationStage>,
        seed: u64,
    ) -> Self {
        Randomizer {
            lm,
            ctx,
            stages,
            rng: ChaCha8Rng::seed_from_u64(seed),
            staged_placements: Vec::new(),
            events: EventSupport::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            attempt_limit: None,
        }
    }

    pub fn with_config(
        lm: Arc<LogicManager>,
        ctx: RandoContext,
        stages: Vec<RandomizationStage>,
        config: &RandomizerConfig,
    ) -> Self {
        let mut randomizer = Randomizer::new(lm, ctx, stages, config.seed);
        randomizer.attempt_limit = config.attempt_limit;
        randomizer
    }

    pub fn events_mut(&mut self) -> &mut EventSupport {
        &mut self.events
    }

    /// Shared flag for cooperative cancellation; checked at sphere
    /// boundaries.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn stages(&self) -> &[RandomizationStage] {
        &self.stages
    }

    pub fn staged_placements(&self) -> &[Vec<Vec<RandoPlacement>>] {
        &self.staged_placements
    }

    /// Runs to a validated result: one entry per stage, one list per group.
    ///
    /// Exhaustion retries from a fresh permutation with the RNG continuing,
    /// so retries stay deterministic for a given seed. Validation failures
    /// and domain errors surface immediately.
    pub fn run(&mut self) -> Result<Vec<Vec<Vec<RandoPlacement>>>> {
        let mut attempt = 0u32;
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(RandoError::Cancelled);
            }
            attempt += 1;
            self.events.fire_attempt_started(attempt);
            match self.attempt() {
                Ok(()) => {
                    validate_run(&self.lm, &self.ctx, &self.stages, &self.staged_placements)?;
                    self.events.fire_finished(attempt);
                    tracing::debug!(attempt, "randomization validated");
                    return Ok(self.staged_placements.clone());
                }
                Err(RandoError::OutOfLocations(error)) => {
                    tracing::debug!(attempt, %error, "attempt exhausted; retrying");
                    self.events.fire_retry(&error);
                    if let Some(limit) = self.attempt_limit {
                        if attempt >= limit {
                            return Err(error.into());
                        }
                    }
                    self.reset();
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Name-level export of the current placements.
    pub fn export_placements(&self) -> Vec<Vec<Vec<PlacementRecord>>> {
        self.staged_placements
            .iter()
            .enumerate()
            .map(|(si, groups)| {
                groups
                    .iter()
                    .enumerate()
                    .map(|(gi, placements)| {
                        let group = &self.stages[si].groups[gi];
                        placements
                            .iter()
                            .map(|p| PlacementRecord {
                                item: group.items[p.item].name().to_string(),
                                location: group.locations[p.location].name().to_string(),
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    fn attempt(&mut self) -> Result<()> {
        let stage_count = self.stages.len();
        if stage_count == 0 {
            return Ok(());
        }
        self.permute_all();
        self.staged_placements = vec![Vec::new(); stage_count];

        for index in 0..stage_count - 1 {
            self.randomize_stage(index, PlacementState::Temporary)?;
        }
        self.randomize_stage(stage_count - 1, PlacementState::Permanent)?;
        for index in (0..stage_count - 1).rev() {
            self.randomize_stage(index, PlacementState::Permanent)?;
        }
        Ok(())
    }

    /// Runs one stage: other stages contribute either their fixed
    /// placements (as pre-placed watchers) or, when not yet placed, their
    /// items directly — those are assumed obtainable later.
    fn randomize_stage(&mut self, index: usize, state: PlacementState) -> Result<()> {
        tracing::debug!(stage = %self.stages[index].label, ?state, "randomizing stage");
        for group in &mut self.stages[index].groups {
            group.reset();
        }

        let mut pm = ProgressionManager::new(Arc::clone(&self.lm));
        let mut mu = MainUpdater::new();
        for (term, def) in &self.ctx.waypoints {
            mu.add_entry(Box::new(StateUpdateEntry::new(*term, Arc::clone(def))))?;
        }
        for (item, location) in &self.ctx.vanilla {
            mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
                Arc::clone(item),
                Arc::clone(location),
            )))?;
        }

        for other in 0..self.stages.len() {
            if other == index {
                continue;
            }
            if self.staged_placements[other].is_empty() {
                for group in &self.stages[other].groups {
                    for item in &group.items {
                        item.effect.add_to(&mut pm);
                    }
                }
            } else {
                for (gi, placements) in self.staged_placements[other].iter().enumerate() {
                    let group = &self.stages[other].groups[gi];
                    for placement in placements {
                        mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
                            Arc::clone(&group.items[placement.item].effect),
                            Arc::clone(&group.locations[placement.location].logic),
                        )))?;
                    }
                }
            }
        }

        pm.attach_and_hook(mu);

        let stage = &mut self.stages[index];
        let mut builder = SphereBuilder::new(&mut pm, &mut stage.groups, state);
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(RandoError::Cancelled);
            }
            if !builder.advance()? {
                break;
            }
        }
        let spheres = builder.into_spheres();
        let placements = stage
            .strategy
            .place_items(&mut stage.groups, &spheres, state, &mut self.rng)?;
        self.events.fire_stage_placed(&stage.label, state);
        self.staged_placements[index] = placements;
        Ok(())
    }

    /// Uniform permutation: priorities become shuffled indices. The vectors
    /// themselves are never reordered, so coupled duals stay aligned.
    fn permute_all(&mut self) {
        for stage in &mut self.stages {
            for group in &mut stage.groups {
                let mut order: Vec<usize> = (0..group.items.len()).collect();
                order.shuffle(&mut self.rng);
                for (position, &item) in order.iter().enumerate() {
                    group.items[item].priority = position as f32;
                }
                let mut order: Vec<usize> = (0..group.locations.len()).collect();
                order.shuffle(&mut self.rng);
                for (position, &location) in order.iter().enumerate() {
                    group.locations[location].priority = position as f32;
                }
            }
        }
    }

    /// Clears staged placements and all group bookkeeping for a retry.
    fn reset(&mut self) {
        self.staged_placements.clear();
        for stage in &mut self.stages {
            for group in &mut stage.groups {
                group.reset();
            }
        }
    }
}
