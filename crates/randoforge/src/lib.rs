//! RandoForge - A logic-driven progression randomizer core
//!
//! RandoForge assigns items to locations so that every placement stays
//! reachable from the start state under declarative boolean/state logic.
//! Logic compiles to DNF and is evaluated symbolically over a progression
//! vector plus partially-ordered bundles of resource states; a monotone
//! fixed-point updater drives reachability, and a staged randomizer turns
//! sphere-by-sphere expansion into validated placements.
//!
//! # Architecture
//!
//! - [`randoforge_core`]: terms, packed states, dominance, the schema registry
//! - [`randoforge_logic`]: compiled clauses, variables, the evaluator
//! - [`randoforge_engine`]: progression manager, updater, spheres, randomizer
//! - [`randoforge_config`]: TOML/YAML run configuration
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use randoforge::prelude::*;
//!
//! # fn demo(lm: Arc<randoforge::LogicManager>, stage: RandomizationStage) -> randoforge::Result<()> {
//! let mut randomizer = Randomizer::new(lm, RandoContext::new(), vec![stage], 42);
//! let placements = randomizer.run()?;
//! # let _ = placements; Ok(())
//! # }
//! ```

// =============================================================================
// Core types (state model)
// =============================================================================

pub use randoforge_core::{
    FieldDirection, FieldKind, FieldProperty, LazyStateBuilder, RandoCoreError, State, StateBool,
    StateInt, StateManager, StateManagerBuilder, StateUnion, Term, TermId, TermKind, TermValue,
};

// =============================================================================
// Logic (compiled formulae and evaluation)
// =============================================================================

pub use randoforge_logic::{
    BaseVariableResolver, Clause, ClauseContext, CompareOp, ConstantVariable, DnfLogicDef,
    LogicCompileCtx, LogicInt, LogicManager, LogicManagerBuilder, LogicParser, LogicReader,
    LogicSource, LogicStep, LogicToken, ProgressionReader, RawClause, ResolverCtx,
    StateAccessVariable, StateFieldVariable, StateModifier, StateProvider, Variable, VariableBase,
    VariableResolver,
};

// =============================================================================
// Engine (progression and randomization)
// =============================================================================

pub use randoforge_engine::{
    CappedItem, ConditionalItem, CountingEventListener, EmptyItem, EventSupport, FirstOfItem,
    GroupItemSelector, LogicItem, MainUpdater, MultiItem, OutOfLocationsError, PlacementRecord,
    PlacementState, PlacementStrategy, PrePlacedItemUpdateEntry, ProgressionManager, RandoContext,
    RandoError, RandoItem, RandoLocation, RandoPlacement, RandomizationGroup, RandomizationStage,
    Randomizer, RandomizerEventListener, Result, SingleItem, Sphere, SphereBuilder, StateItem,
    StateUpdateEntry, UniformPlacementStrategy, UpdateEntry, ValidationError,
};

// =============================================================================
// Configuration
// =============================================================================

pub use randoforge_config::{ConfigError, PlacementConfig, RandomizerConfig, StrategyKind};

/// Convenience imports for building and running a randomizer.
pub mod prelude {
    pub use randoforge_config::RandomizerConfig;
    pub use randoforge_core::{
        LazyStateBuilder, State, StateManager, StateManagerBuilder, StateUnion, TermKind,
    };
    pub use randoforge_engine::{
        LogicItem, PlacementState, ProgressionManager, RandoContext, RandoItem, RandoLocation,
        RandomizationGroup, RandomizationStage, Randomizer, SingleItem, UniformPlacementStrategy,
    };
    pub use randoforge_logic::{LogicManager, LogicManagerBuilder, ProgressionReader};
}
