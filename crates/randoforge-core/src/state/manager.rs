//! Schema registry for state fields: builder and frozen manager.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{RandoCoreError, Result};

use super::field::{FieldDef, FieldDirection, FieldKind, FieldProperty, StateBool, StateInt};
use super::union::StateUnion;
use super::{word_count, State};

/// Property key holding a field's default value.
pub const DEFAULT_VALUE_PROPERTY: &str = "DefaultValue";

/// Mutable schema under construction. Fields, defaults, directions, tags and
/// named states can all be edited until [`StateManagerBuilder::build`]
/// freezes them.
#[derive(Debug, Default)]
pub struct StateManagerBuilder {
    bools: Vec<FieldDef>,
    ints: Vec<FieldDef>,
    index: HashMap<String, (FieldKind, usize)>,
    named_states: Vec<(String, Vec<(String, FieldProperty)>)>,
    named_unions: Vec<(String, Vec<String>)>,
}

impl StateManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bool field. Ids are dense in registration order.
    pub fn add_bool(&mut self, name: impl Into<String>) -> Result<StateBool> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RandoCoreError::Duplicate(name));
        }
        let id = self.bools.len();
        self.index.insert(name.clone(), (FieldKind::Bool, id));
        self.bools.push(FieldDef::new(name));
        Ok(StateBool(id))
    }

    /// Registers an int field. Ids are dense in registration order.
    pub fn add_int(&mut self, name: impl Into<String>) -> Result<StateInt> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RandoCoreError::Duplicate(name));
        }
        let id = self.ints.len();
        self.index.insert(name.clone(), (FieldKind::Int, id));
        self.ints.push(FieldDef::new(name));
        Ok(StateInt(id))
    }

    /// Sets or rewrites a field property. Defaults may be rewritten any
    /// number of times before freezing.
    pub fn set_property(
        &mut self,
        field: &str,
        key: impl Into<String>,
        value: FieldProperty,
    ) -> Result<()> {
        let def = self.field_mut(field)?;
        def.properties.insert(key.into(), value);
        Ok(())
    }

    /// Convenience for the `DefaultValue` property of a bool field.
    pub fn set_bool_default(&mut self, field: &str, value: bool) -> Result<()> {
        self.set_property(field, DEFAULT_VALUE_PROPERTY, FieldProperty::Bool(value))
    }

    /// Convenience for the `DefaultValue` property of an int field.
    pub fn set_int_default(&mut self, field: &str, value: i32) -> Result<()> {
        self.set_property(field, DEFAULT_VALUE_PROPERTY, FieldProperty::Int(value))
    }

    pub fn set_direction(&mut self, field: &str, direction: FieldDirection) -> Result<()> {
        self.field_mut(field)?.direction = direction;
        Ok(())
    }

    pub fn add_tag(&mut self, field: &str, tag: impl Into<String>) -> Result<()> {
        self.field_mut(field)?.tags.push(tag.into());
        Ok(())
    }

    /// Registers a named state as a list of field overrides on the default
    /// state. Unknown fields are rejected at build time.
    pub fn add_named_state(
        &mut self,
        name: impl Into<String>,
        overrides: Vec<(String, FieldProperty)>,
    ) {
        self.named_states.push((name.into(), overrides));
    }

    /// Registers a named union as a list of named-state names.
    pub fn add_named_union(&mut self, name: impl Into<String>, states: Vec<String>) {
        self.named_unions.push((name.into(), states));
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FieldDef> {
        match self.index.get(name) {
            Some((FieldKind::Bool, id)) => Ok(&mut self.bools[*id]),
            Some((FieldKind::Int, id)) => Ok(&mut self.ints[*id]),
            None => Err(RandoCoreError::UnknownStateField(name.to_string())),
        }
    }

    /// Freezes the schema. Fields cannot be renamed or retyped afterwards.
    pub fn build(self) -> Result<StateManager> {
        let words = word_count(self.bools.len());
        let mut invert_mask = vec![0u32; words];
        let mut start_bools = vec![0u32; words];
        for (id, def) in self.bools.iter().enumerate() {
            let (w, bit) = (id / 32, 1u32 << (id % 32));
            if def.direction == FieldDirection::LowIsBetter {
                invert_mask[w] |= bit;
            }
            if let Some(FieldProperty::Bool(true)) = def.properties.get(DEFAULT_VALUE_PROPERTY) {
                start_bools[w] |= bit;
            }
        }
        let start_ints: Vec<i32> = self
            .ints
            .iter()
            .map(|def| {
                def.properties
                    .get(DEFAULT_VALUE_PROPERTY)
                    .and_then(FieldProperty::as_int)
                    .unwrap_or(0)
            })
            .collect();
        let int_signs: Vec<i8> = self
            .ints
            .iter()
            .map(|def| match def.direction {
                FieldDirection::HighIsBetter => 1,
                FieldDirection::LowIsBetter => -1,
            })
            .collect();

        let mut tags: HashMap<String, Vec<(FieldKind, usize)>> = HashMap::new();
        for (id, def) in self.bools.iter().enumerate() {
            for tag in &def.tags {
                tags.entry(tag.clone()).or_default().push((FieldKind::Bool, id));
            }
        }
        for (id, def) in self.ints.iter().enumerate() {
            for tag in &def.tags {
                tags.entry(tag.clone()).or_default().push((FieldKind::Int, id));
            }
        }

        let mut sm = StateManager {
            bools: self.bools.into_boxed_slice(),
            ints: self.ints.into_boxed_slice(),
            index: self.index,
            tags,
            invert_mask: invert_mask.into_boxed_slice(),
            int_signs: int_signs.into_boxed_slice(),
            start_state: State::from_parts(start_bools, start_ints),
            named_states: HashMap::new(),
            named_unions: HashMap::new(),
        };

        for (name, overrides) in self.named_states {
            let state = sm.materialize(&name, &overrides)?;
            if sm.named_states.insert(name.clone(), state).is_some() {
                return Err(RandoCoreError::Duplicate(name));
            }
        }
        for (name, members) in self.named_unions {
            let states = members
                .iter()
                .map(|m| sm.named_state(m).cloned())
                .collect::<Result<Vec<_>>>()?;
            let union = StateUnion::from_states(states, &sm);
            if sm.named_unions.insert(name.clone(), union).is_some() {
                return Err(RandoCoreError::Duplicate(name));
            }
        }
        Ok(sm)
    }
}

/// Frozen schema registry for state fields.
///
/// Built once via [`StateManagerBuilder`] and immutable thereafter; safe to
/// share read-only between parallel runs.
#[derive(Debug)]
pub struct StateManager {
    bools: Box<[FieldDef]>,
    ints: Box<[FieldDef]>,
    index: HashMap<String, (FieldKind, usize)>,
    tags: HashMap<String, Vec<(FieldKind, usize)>>,
    invert_mask: Box<[u32]>,
    int_signs: Box<[i8]>,
    start_state: State,
    named_states: HashMap<String, State>,
    named_unions: HashMap<String, StateUnion>,
}

impl StateManager {
    pub fn bool_count(&self) -> usize {
        self.bools.len()
    }

    pub fn int_count(&self) -> usize {
        self.ints.len()
    }

    pub fn get_bool(&self, name: &str) -> Option<StateBool> {
        match self.index.get(name) {
            Some((FieldKind::Bool, id)) => Some(StateBool(*id)),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<StateInt> {
        match self.index.get(name) {
            Some((FieldKind::Int, id)) => Some(StateInt(*id)),
            _ => None,
        }
    }

    /// Strict variant of [`StateManager::get_bool`].
    pub fn bool_strict(&self, name: &str) -> Result<StateBool> {
        self.get_bool(name)
            .ok_or_else(|| RandoCoreError::UnknownStateBool(name.to_string()))
    }

    /// Strict variant of [`StateManager::get_int`].
    pub fn int_strict(&self, name: &str) -> Result<StateInt> {
        self.get_int(name)
            .ok_or_else(|| RandoCoreError::UnknownStateInt(name.to_string()))
    }

    pub fn bool_name(&self, field: StateBool) -> &str {
        &self.bools[field.index()].name
    }

    pub fn int_name(&self, field: StateInt) -> &str {
        &self.ints[field.index()].name
    }

    /// All fields carrying the given tag, in registration order.
    pub fn list_by_tag(&self, tag: &str) -> &[(FieldKind, usize)] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn try_get_property(&self, field: &str, key: &str) -> Option<&FieldProperty> {
        let def = match self.index.get(field)? {
            (FieldKind::Bool, id) => &self.bools[*id],
            (FieldKind::Int, id) => &self.ints[*id],
        };
        def.properties.get(key)
    }

    /// The state with every field's declared default applied.
    pub fn start_state(&self) -> &State {
        &self.start_state
    }

    /// Strict named-state lookup; unknown keys are a domain error.
    pub fn named_state(&self, name: &str) -> Result<&State> {
        self.named_states
            .get(name)
            .ok_or_else(|| RandoCoreError::UnknownNamedState(name.to_string()))
    }

    /// Strict named-union lookup; unknown keys are a domain error.
    pub fn named_state_union(&self, name: &str) -> Result<&StateUnion> {
        self.named_unions
            .get(name)
            .ok_or_else(|| RandoCoreError::UnknownNamedStateUnion(name.to_string()))
    }

    /// Diagnostic rendering of a state as `name=value` pairs.
    pub fn pretty_print(&self, state: &State) -> String {
        let mut out = String::new();
        for id in 0..self.bools.len() {
            let field = StateBool(id);
            if !out.is_empty() {
                out.push_str(", ");
            }
            let _ = write!(out, "{}={}", self.bool_name(field), state.get_bool(field));
        }
        for id in 0..self.ints.len() {
            let field = StateInt(id);
            if !out.is_empty() {
                out.push_str(", ");
            }
            let _ = write!(out, "{}={}", self.int_name(field), state.get_int(field));
        }
        out
    }

    pub(crate) fn bool_invert_mask(&self) -> &[u32] {
        &self.invert_mask
    }

    pub(crate) fn int_sign(&self, id: usize) -> i8 {
        self.int_signs[id]
    }

    fn materialize(&self, name: &str, overrides: &[(String, FieldProperty)]) -> Result<State> {
        let mut bools = self.start_state.bool_words().to_vec();
        let mut ints = self.start_state.int_values().to_vec();
        for (field, value) in overrides {
            match (self.index.get(field.as_str()), value) {
                (Some((FieldKind::Bool, id)), FieldProperty::Bool(v)) => {
                    let (w, bit) = (id / 32, 1u32 << (id % 32));
                    if *v {
                        bools[w] |= bit;
                    } else {
                        bools[w] &= !bit;
                    }
                }
                (Some((FieldKind::Int, id)), FieldProperty::Int(v)) => ints[*id] = *v,
                _ => {
                    return Err(RandoCoreError::MalformedLogic {
                        name: name.to_string(),
                        reason: format!("bad field override {field}"),
                    })
                }
            }
        }
        Ok(State::from_parts(bools, ints))
    }
}
