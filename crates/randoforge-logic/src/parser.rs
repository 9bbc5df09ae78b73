//! The external-parser seam.
//!
//! RandoForge consumes compiled DNF clause arrays; the infix tokenizer and
//! DNF conversion live outside the core. A parser implementation compiles a
//! source string against a [`LogicCompileCtx`], resolving term and variable
//! names to banded ids.

use randoforge_core::{Result, StateManager, TermId};

/// A named infix logic source awaiting compilation.
#[derive(Debug, Clone)]
pub struct LogicSource {
    pub name: String,
    pub infix: String,
}

impl LogicSource {
    pub fn new(name: impl Into<String>, infix: impl Into<String>) -> Self {
        LogicSource {
            name: name.into(),
            infix: infix.into(),
        }
    }
}

/// An uncompiled clause: banded id arrays straight from the DNF converter.
#[derive(Debug, Clone, Default)]
pub struct RawClause {
    pub logic: Vec<i32>,
    pub state_logic: Vec<i32>,
    pub state_provider: Option<i32>,
}

/// Name resolution offered to a parser during compilation.
///
/// Before freezing, the logic manager builder implements this with on-demand
/// variable allocation through the resolver chain; after freezing, the
/// manager offers a lookup-only view that rejects unknown names.
pub trait LogicCompileCtx {
    fn term_id(&self, name: &str) -> Option<TermId>;

    /// Whether the term carries a state union.
    fn is_state_term(&self, term: TermId) -> bool;

    /// Resolves a variable name to its negative id, allocating through the
    /// resolver chain when the context permits it.
    fn resolve_variable(&mut self, name: &str) -> Result<i32>;

    fn state_manager(&self) -> &StateManager;
}

/// Produces compiled DNF clause arrays from infix source.
pub trait LogicParser: std::fmt::Debug + Send + Sync {
    fn parse_dnf(&self, ctx: &mut dyn LogicCompileCtx, source: &LogicSource)
        -> Result<Vec<RawClause>>;
}
