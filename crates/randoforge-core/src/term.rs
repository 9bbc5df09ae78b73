//! Terms: the atomic named symbols tracked by progression logic.

/// Identifier of a term. Non-negative by construction; the negative id space
/// is reserved for operator sentinels and variables in compiled logic.
pub type TermId = i32;

/// Integer value a term carries in the progression manager.
pub type TermValue = i32;

/// Value kind of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Plain counter semantics: the term holds a non-negative integer.
    Int,
    /// State-valued semantics: the term carries a state union, and its
    /// integer value is 1 when the union is present and 0 otherwise.
    State,
}

/// An atomic named symbol with a stable id assigned at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    id: TermId,
    name: String,
    kind: TermKind,
}

impl Term {
    pub fn new(id: TermId, name: impl Into<String>, kind: TermKind) -> Self {
        debug_assert!(id >= 0, "term ids are non-negative");
        Term {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn id(&self) -> TermId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    /// Whether the term carries a state union in addition to its value.
    pub fn is_state_valued(&self) -> bool {
        self.kind == TermKind::State
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}
