//! State field handles and per-field schema metadata.

/// Kind discriminant for state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int,
}

/// Direction of a field's contribution to the dominance order.
///
/// `HighIsBetter` is the common case (`true` dominates `false`, larger ints
/// dominate smaller). Some fields are better when low, e.g. a "resource
/// spent" counter or a "handicap applied" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldDirection {
    #[default]
    HighIsBetter,
    LowIsBetter,
}

/// A value in a field's property map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProperty {
    Bool(bool),
    Int(i32),
}

impl FieldProperty {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldProperty::Bool(b) => Some(*b),
            FieldProperty::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldProperty::Int(i) => Some(*i),
            FieldProperty::Bool(_) => None,
        }
    }
}

/// Handle to a registered bool field. The wrapped index is dense within the
/// bool kind and stable once the manager is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateBool(pub(crate) usize);

impl StateBool {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle to a registered int field. Dense within the int kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateInt(pub(crate) usize);

impl StateInt {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Frozen schema entry for one field.
#[derive(Debug, Clone)]
pub(crate) struct FieldDef {
    pub name: String,
    pub direction: FieldDirection,
    pub properties: std::collections::HashMap<String, FieldProperty>,
    pub tags: Vec<String>,
}

impl FieldDef {
    pub fn new(name: String) -> Self {
        FieldDef {
            name,
            direction: FieldDirection::default(),
            properties: std::collections::HashMap::new(),
            tags: Vec::new(),
        }
    }
}
