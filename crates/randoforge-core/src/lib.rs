//! RandoForge Core - State model and shared types for progression randomization
//!
//! This crate provides the fundamental abstractions for RandoForge:
//! - Terms, the atoms tracked by progression logic
//! - Packed immutable resource states and their dominance order
//! - State unions (minimal antichains of states)
//! - The state schema registry (`StateManager`)

pub mod error;
pub mod state;
pub mod term;

pub use error::{RandoCoreError, Result};
pub use state::{
    FieldDirection, FieldKind, FieldProperty, LazyStateBuilder, State, StateBool, StateInt,
    StateManager, StateManagerBuilder, StateUnion, DEFAULT_VALUE_PROPERTY,
};
pub use term::{Term, TermId, TermKind, TermValue};
