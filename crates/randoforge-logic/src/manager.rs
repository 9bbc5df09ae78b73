//! The frozen logic registry and its builder.

use std::collections::HashMap;
use std::sync::Arc;

use randoforge_core::{RandoCoreError, Result, StateManager, Term, TermId, TermKind};

use crate::clause::Clause;
use crate::def::DnfLogicDef;
use crate::ops::{self, is_operator, is_term, is_variable, LogicReader, LogicStep};
use crate::parser::{LogicCompileCtx, LogicParser, LogicSource, RawClause};
use crate::resolver::{BaseVariableResolver, ResolverCtx, VariableResolver};
use crate::variable::Variable;

/// Mutable registry under construction: terms, variables, logic sources.
///
/// Variables are resolved on demand through the resolver chain while sources
/// compile; [`LogicManagerBuilder::build`] freezes everything.
#[derive(Debug)]
pub struct LogicManagerBuilder {
    sm: Arc<StateManager>,
    terms: Vec<Term>,
    term_index: HashMap<String, TermId>,
    variables: Vec<Variable>,
    variable_index: HashMap<String, i32>,
    resolver: Option<Box<dyn VariableResolver>>,
    parser: Option<Arc<dyn LogicParser>>,
    sources: Vec<LogicSource>,
    raw_defs: Vec<(String, Vec<RawClause>)>,
}

impl LogicManagerBuilder {
    pub fn new(sm: Arc<StateManager>) -> Self {
        LogicManagerBuilder {
            sm,
            terms: Vec::new(),
            term_index: HashMap::new(),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            resolver: Some(Box::new(BaseVariableResolver)),
            parser: None,
            sources: Vec::new(),
            raw_defs: Vec::new(),
        }
    }

    /// Registers a term, or returns the existing id. Re-registering with a
    /// different kind is a domain error.
    pub fn get_or_add_term(&mut self, name: &str, kind: TermKind) -> Result<TermId> {
        if let Some(&id) = self.term_index.get(name) {
            let existing = &self.terms[id as usize];
            if existing.kind() != kind {
                return Err(RandoCoreError::Duplicate(name.to_string()));
            }
            return Ok(id);
        }
        let id = self.terms.len() as TermId;
        self.terms.push(Term::new(id, name, kind));
        self.term_index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Replaces the resolver chain. The provided resolver is expected to
    /// fall back to [`BaseVariableResolver`] via its `inner` link if the
    /// built-ins should stay available.
    pub fn set_resolver(&mut self, resolver: Box<dyn VariableResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn set_parser(&mut self, parser: Arc<dyn LogicParser>) {
        self.parser = Some(parser);
    }

    /// Registers a variable under its own name, assigning the next id in the
    /// variable band.
    pub fn add_variable(&mut self, variable: Variable) -> Result<i32> {
        let name = variable.name().to_string();
        if self.variable_index.contains_key(&name) {
            return Err(RandoCoreError::Duplicate(name));
        }
        let id = ops::VARIABLE_ID_OFFSET - self.variables.len() as i32;
        self.variable_index.insert(name, id);
        self.variables.push(variable);
        Ok(id)
    }

    /// Queues an infix source for compilation at build time.
    pub fn add_logic(&mut self, name: impl Into<String>, infix: impl Into<String>) {
        self.sources.push(LogicSource::new(name, infix));
    }

    /// Registers an already-compiled def.
    pub fn add_raw_logic(&mut self, name: impl Into<String>, clauses: Vec<RawClause>) {
        self.raw_defs.push((name.into(), clauses));
    }

    /// Compiles all queued sources and freezes the registry.
    pub fn build(mut self) -> Result<LogicManager> {
        let parser = self.parser.clone();
        let sources = std::mem::take(&mut self.sources);
        let mut compiled: Vec<(String, Vec<RawClause>)> = std::mem::take(&mut self.raw_defs);
        for source in sources {
            let parser = parser.as_ref().ok_or_else(|| {
                RandoCoreError::InvalidOperation(format!(
                    "no parser configured; cannot compile {}",
                    source.name
                ))
            })?;
            let clauses = parser.parse_dnf(&mut self, &source)?;
            compiled.push((source.name, clauses));
        }

        let mut defs = HashMap::new();
        for (name, raw_clauses) in compiled {
            let mut clauses = Vec::with_capacity(raw_clauses.len());
            for raw in raw_clauses {
                validate_raw(&name, &raw, &self.terms, |id| self.variable_at(id))?;
                clauses.push(Clause::new(raw.logic, raw.state_logic, raw.state_provider));
            }
            let def = Arc::new(DnfLogicDef::new(name.clone(), clauses));
            if defs.insert(name.clone(), def).is_some() {
                return Err(RandoCoreError::Duplicate(name));
            }
        }

        tracing::debug!(
            terms = self.terms.len(),
            variables = self.variables.len(),
            defs = defs.len(),
            "logic manager frozen"
        );
        Ok(LogicManager {
            sm: self.sm,
            terms: self.terms.into_boxed_slice(),
            term_index: self.term_index,
            variables: self.variables.into_boxed_slice(),
            variable_index: self.variable_index,
            defs,
            parser,
        })
    }

    fn variable_at(&self, id: i32) -> Option<&Variable> {
        let index = (ops::VARIABLE_ID_OFFSET - id) as usize;
        self.variables.get(index)
    }
}

impl LogicCompileCtx for LogicManagerBuilder {
    fn term_id(&self, name: &str) -> Option<TermId> {
        self.term_index.get(name).copied()
    }

    fn is_state_term(&self, term: TermId) -> bool {
        self.terms
            .get(term as usize)
            .is_some_and(Term::is_state_valued)
    }

    fn resolve_variable(&mut self, name: &str) -> Result<i32> {
        if let Some(&id) = self.variable_index.get(name) {
            return Ok(id);
        }
        // The chain is detached while it runs so it can read the builder's
        // schema without aliasing the variable tables it feeds.
        let resolver = self.resolver.take().ok_or_else(|| {
            RandoCoreError::InvalidOperation("variable resolver re-entered".into())
        })?;
        let matched = resolver.try_match(&ResolverCtx { sm: &self.sm }, name);
        self.resolver = Some(resolver);
        match matched? {
            Some(variable) => self.add_variable(variable),
            None => Err(RandoCoreError::UnknownVariable(name.to_string())),
        }
    }

    fn state_manager(&self) -> &StateManager {
        &self.sm
    }
}

/// Immutable registry mapping names and ids for terms, variables and
/// compiled logic defs. Safe to share read-only between parallel runs.
#[derive(Debug)]
pub struct LogicManager {
    sm: Arc<StateManager>,
    terms: Box<[Term]>,
    term_index: HashMap<String, TermId>,
    variables: Box<[Variable]>,
    variable_index: HashMap<String, i32>,
    defs: HashMap<String, Arc<DnfLogicDef>>,
    parser: Option<Arc<dyn LogicParser>>,
}

impl LogicManager {
    pub fn state_manager(&self) -> &StateManager {
        &self.sm
    }

    pub fn shared_state_manager(&self) -> Arc<StateManager> {
        Arc::clone(&self.sm)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn term(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id as usize)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    pub fn term_id(&self, name: &str) -> Option<TermId> {
        self.term_index.get(name).copied()
    }

    /// Strict term lookup by name.
    pub fn term_strict(&self, name: &str) -> Result<TermId> {
        self.term_id(name)
            .ok_or_else(|| RandoCoreError::UnknownTerm(name.to_string()))
    }

    pub fn is_state_term(&self, id: TermId) -> bool {
        self.term(id).is_some_and(Term::is_state_valued)
    }

    pub fn variable_by_id(&self, id: i32) -> Option<&Variable> {
        if !is_variable(id) {
            return None;
        }
        let index = (ops::VARIABLE_ID_OFFSET - id) as usize;
        self.variables.get(index)
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variable_index
            .get(name)
            .and_then(|&id| self.variable_by_id(id))
    }

    pub fn variable_id(&self, name: &str) -> Option<i32> {
        self.variable_index.get(name).copied()
    }

    pub fn logic_def(&self, name: &str) -> Option<&Arc<DnfLogicDef>> {
        self.defs.get(name)
    }

    /// Strict def lookup by name.
    pub fn logic_def_strict(&self, name: &str) -> Result<&Arc<DnfLogicDef>> {
        self.logic_def(name)
            .ok_or_else(|| RandoCoreError::UnknownTerm(name.to_string()))
    }

    pub fn logic_defs(&self) -> impl Iterator<Item = &Arc<DnfLogicDef>> {
        self.defs.values()
    }

    /// Compiles an ad-hoc def against the frozen registry. Only names known
    /// at freeze time resolve; the allocation path is closed.
    pub fn create_dnf_logic_def(&self, source: &LogicSource) -> Result<DnfLogicDef> {
        let parser = self.parser.as_ref().ok_or_else(|| {
            RandoCoreError::InvalidOperation(format!(
                "no parser configured; cannot compile {}",
                source.name
            ))
        })?;
        let mut ctx = FrozenCompileCtx { lm: self };
        let raw_clauses = parser.parse_dnf(&mut ctx, source)?;
        let mut clauses = Vec::with_capacity(raw_clauses.len());
        for raw in raw_clauses {
            validate_raw(&source.name, &raw, &self.terms, |id| self.variable_by_id(id))?;
            clauses.push(Clause::new(raw.logic, raw.state_logic, raw.state_provider));
        }
        Ok(DnfLogicDef::new(source.name.clone(), clauses))
    }
}

/// Lookup-only compile context over a frozen manager.
struct FrozenCompileCtx<'a> {
    lm: &'a LogicManager,
}

impl LogicCompileCtx for FrozenCompileCtx<'_> {
    fn term_id(&self, name: &str) -> Option<TermId> {
        self.lm.term_id(name)
    }

    fn is_state_term(&self, term: TermId) -> bool {
        self.lm.is_state_term(term)
    }

    fn resolve_variable(&mut self, name: &str) -> Result<i32> {
        self.lm
            .variable_id(name)
            .ok_or_else(|| RandoCoreError::UnknownVariable(name.to_string()))
    }

    fn state_manager(&self) -> &StateManager {
        self.lm.state_manager()
    }
}

/// Structural and kind validation of a compiled clause against the registry.
fn validate_raw<'a>(
    def_name: &str,
    raw: &RawClause,
    terms: &[Term],
    variable: impl Fn(i32) -> Option<&'a Variable>,
) -> Result<()> {
    let malformed = |reason: String| RandoCoreError::MalformedLogic {
        name: def_name.to_string(),
        reason,
    };

    for seq in [&raw.logic, &raw.state_logic] {
        ops::validate_sequence(seq).map_err(|reason| malformed(reason))?;
    }

    let check_term = |id: TermId| -> Result<()> {
        if (id as usize) < terms.len() {
            Ok(())
        } else {
            Err(malformed(format!("term id {id} out of range")))
        }
    };

    for step in LogicReader::new(&raw.logic) {
        match step {
            LogicStep::Term(t) => check_term(t)?,
            LogicStep::Variable(v) => {
                let var = variable(v).ok_or_else(|| malformed(format!("unknown variable {v}")))?;
                if var.as_logic_int().is_none() {
                    return Err(malformed(format!(
                        "variable {} lacks an integer value in boolean logic",
                        var.name()
                    )));
                }
            }
            LogicStep::Comparison(_, lhs, rhs) => {
                for id in [lhs, rhs] {
                    if is_term(id) {
                        check_term(id)?;
                    } else {
                        let var = variable(id)
                            .ok_or_else(|| malformed(format!("unknown variable {id}")))?;
                        if var.as_logic_int().is_none() {
                            return Err(malformed(format!(
                                "comparison operand {} is not integer-valued",
                                var.name()
                            )));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for step in LogicReader::new(&raw.state_logic) {
        match step {
            LogicStep::Variable(v) => {
                let var = variable(v).ok_or_else(|| malformed(format!("unknown variable {v}")))?;
                if var.as_modifier().is_none() {
                    return Err(malformed(format!(
                        "state logic entry {} is not a state modifier",
                        var.name()
                    )));
                }
            }
            LogicStep::Comparison(_, lhs, rhs) => {
                for id in [lhs, rhs] {
                    if is_term(id) {
                        check_term(id)?;
                    } else {
                        let var = variable(id)
                            .ok_or_else(|| malformed(format!("unknown variable {id}")))?;
                        if var.as_logic_int().is_none() && var.as_access().is_none() {
                            return Err(malformed(format!(
                                "state comparison operand {} is neither integer nor state access",
                                var.name()
                            )));
                        }
                    }
                }
            }
            LogicStep::Term(t) => {
                return Err(malformed(format!("bare term {t} in state logic")));
            }
            _ => {}
        }
    }

    if let Some(id) = raw.state_provider {
        if is_operator(id) {
            return Err(malformed(format!("operator {id} as state provider")));
        }
        if is_term(id) {
            check_term(id)?;
            if !terms[id as usize].is_state_valued() {
                return Err(malformed(format!(
                    "state provider {} is not state-valued",
                    terms[id as usize].name()
                )));
            }
        } else {
            let var = variable(id).ok_or_else(|| malformed(format!("unknown variable {id}")))?;
            if var.as_provider().is_none() {
                return Err(malformed(format!(
                    "state provider {} is not a state provider variable",
                    var.name()
                )));
            }
        }
    }
    Ok(())
}
