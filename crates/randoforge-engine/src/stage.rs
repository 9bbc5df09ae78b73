//! Randomization stages and placement strategies.

use std::fmt::Debug;

use rand::Rng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::OutOfLocationsError;
use crate::group::{PlacementState, RandomizationGroup};
use crate::sphere::Sphere;

/// One placement: item and location indices within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandoPlacement {
    pub item: usize,
    pub location: usize,
}

/// Name-level placement record for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub item: String,
    pub location: String,
}

/// A stage: groups randomized together plus the strategy that turns spheres
/// into placements.
#[derive(Debug)]
pub struct RandomizationStage {
    pub label: String,
    pub groups: Vec<RandomizationGroup>,
    pub strategy: Box<dyn PlacementStrategy>,
}

impl RandomizationStage {
    pub fn new(
        label: impl Into<String>,
        groups: Vec<RandomizationGroup>,
        strategy: Box<dyn PlacementStrategy>,
    ) -> Self {
        RandomizationStage {
            label: label.into(),
            groups,
            strategy,
        }
    }
}

/// Consumes spheres, producing placements that respect reachability: one
/// list per group in declaration order.
pub trait PlacementStrategy: Debug + Send {
    fn place_items(
        &self,
        groups: &mut [RandomizationGroup],
        spheres: &[Sphere],
        state: PlacementState,
        rng: &mut dyn RngCore,
    ) -> std::result::Result<Vec<Vec<RandoPlacement>>, OutOfLocationsError>;
}

/// Places each sphere's items uniformly at random into unfilled locations
/// of strictly earlier spheres, so an item never lands somewhere whose
/// reachability already assumed it. Terminal-sweep items (spheres with no
/// locations of their own) draw from everything still unfilled.
#[derive(Debug, Default)]
pub struct UniformPlacementStrategy;

impl UniformPlacementStrategy {
    pub fn new() -> Self {
        UniformPlacementStrategy
    }
}

impl PlacementStrategy for UniformPlacementStrategy {
    fn place_items(
        &self,
        groups: &mut [RandomizationGroup],
        spheres: &[Sphere],
        state: PlacementState,
        rng: &mut dyn RngCore,
    ) -> std::result::Result<Vec<Vec<RandoPlacement>>, OutOfLocationsError> {
        let mut placements = Vec::with_capacity(groups.len());
        for (gi, group) in groups.iter_mut().enumerate() {
            let mut pool: Vec<usize> = Vec::new();
            let mut placed = Vec::new();
            for sphere in spheres {
                for &item in &sphere.items[gi] {
                    if pool.is_empty() {
                        return Err(OutOfLocationsError(format!(
                            "no unfilled location available in group {}",
                            group.label
                        )));
                    }
                    let pick = rng.random_range(0..pool.len());
                    let location = pool.swap_remove(pick);
                    group.items[item].placed = state;
                    placed.push(RandoPlacement { item, location });
                }
                pool.extend_from_slice(&sphere.locations[gi]);
            }
            tracing::debug!(
                group = group.label,
                placements = placed.len(),
                unfilled = pool.len(),
                "group placed"
            );
            placements.push(placed);
        }
        Ok(placements)
    }
}
