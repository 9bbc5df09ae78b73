//! Shared test fixtures for RandoForge crates.
//!
//! The production parser lives outside this workspace; tests compile logic
//! through [`SimpleDnfParser`], a minimal infix reader covering the clause
//! forms the evaluator supports. [`modifiers`] holds generic state modifiers
//! used by state-evaluation and randomization tests.
//!
//! Add as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! randoforge-test = { workspace = true }
//! ```

pub mod modifiers;
pub mod parser;
pub mod progression;

pub use modifiers::{CostModifier, FlagConsumeModifier, OriginModifier};
pub use parser::SimpleDnfParser;
pub use progression::FixedProgression;
