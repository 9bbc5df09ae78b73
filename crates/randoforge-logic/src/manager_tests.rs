//! Registry tests: banding, resolver chains, validation, strict lookups.

use std::sync::Arc;

use randoforge_core::{RandoCoreError, Result, StateManagerBuilder, TermKind};
use randoforge_test::SimpleDnfParser;

use crate::manager::LogicManagerBuilder;
use crate::ops;
use crate::parser::{LogicSource, RawClause};
use crate::resolver::{BaseVariableResolver, ResolverCtx, VariableResolver};
use crate::variable::{ConstantVariable, Variable};

fn builder() -> LogicManagerBuilder {
    let mut smb = StateManagerBuilder::new();
    smb.add_bool("FLAG").unwrap();
    let sm = Arc::new(smb.build().unwrap());
    let mut lmb = LogicManagerBuilder::new(sm);
    lmb.set_parser(Arc::new(SimpleDnfParser::new()));
    lmb
}

#[derive(Debug)]
struct MagicResolver {
    inner: BaseVariableResolver,
}

impl VariableResolver for MagicResolver {
    fn inner(&self) -> Option<&dyn VariableResolver> {
        Some(&self.inner)
    }

    fn try_match_local(&self, _ctx: &ResolverCtx<'_>, name: &str) -> Result<Option<Variable>> {
        if name == "MAGIC" {
            Ok(Some(Variable::Int(Arc::new(ConstantVariable::new(name, 7)))))
        } else {
            Ok(None)
        }
    }
}

#[test]
fn test_term_registration_is_stable_and_strict() {
    let mut lmb = builder();
    let key = lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    let again = lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    assert_eq!(key, again);
    assert!(matches!(
        lmb.get_or_add_term("KEY", TermKind::State),
        Err(RandoCoreError::Duplicate(_))
    ));

    let lm = lmb.build().unwrap();
    assert_eq!(lm.term_strict("KEY").unwrap(), key);
    assert_eq!(lm.term(key).unwrap().name(), "KEY");
    assert!(matches!(
        lm.term_strict("MISSING"),
        Err(RandoCoreError::UnknownTerm(_))
    ));
}

#[test]
fn test_variable_band_allocation() {
    let mut lmb = builder();
    let first = lmb
        .add_variable(Variable::Int(Arc::new(ConstantVariable::new("C1", 1))))
        .unwrap();
    let second = lmb
        .add_variable(Variable::Int(Arc::new(ConstantVariable::new("C2", 2))))
        .unwrap();
    assert_eq!(first, ops::VARIABLE_ID_OFFSET);
    assert_eq!(second, ops::VARIABLE_ID_OFFSET - 1);

    let lm = lmb.build().unwrap();
    assert_eq!(lm.variable_by_id(first).unwrap().name(), "C1");
    assert_eq!(lm.variable_by_name("C2").unwrap().name(), "C2");
    assert!(lm.variable_by_id(ops::ANY).is_none());
    assert!(lm.variable_by_id(0).is_none());
}

#[test]
fn test_resolver_chain_falls_back_to_inner() {
    let mut lmb = builder();
    lmb.set_resolver(Box::new(MagicResolver {
        inner: BaseVariableResolver,
    }));
    lmb.get_or_add_term("KEYS", TermKind::Int).unwrap();
    // MAGIC resolves in the outer link, the literal in the base fallback.
    lmb.add_logic("M", "MAGIC>2");
    lmb.add_logic("N", "KEYS>4");
    let lm = lmb.build().unwrap();
    assert!(lm.variable_by_name("MAGIC").is_some());
    assert!(lm.variable_by_name("4").is_some());
}

#[test]
fn test_unknown_variable_name_fails_build() {
    let mut lmb = builder();
    lmb.add_logic("BROKEN", "NO_SUCH_NAME");
    assert!(matches!(
        lmb.build(),
        Err(RandoCoreError::UnknownVariable(_))
    ));
}

#[test]
fn test_conjunction_marker_rejected_in_clause_array() {
    let mut lmb = builder();
    lmb.add_raw_logic(
        "BAD",
        vec![RawClause {
            logic: vec![ops::AND],
            ..RawClause::default()
        }],
    );
    assert!(matches!(
        lmb.build(),
        Err(RandoCoreError::MalformedLogic { .. })
    ));
}

#[test]
fn test_comparison_arity_enforced() {
    let mut lmb = builder();
    let key = lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    lmb.add_raw_logic(
        "BAD",
        vec![RawClause {
            logic: vec![ops::GT, key],
            ..RawClause::default()
        }],
    );
    assert!(matches!(
        lmb.build(),
        Err(RandoCoreError::MalformedLogic { .. })
    ));
}

#[test]
fn test_state_provider_must_be_state_valued() {
    let mut lmb = builder();
    let key = lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    lmb.add_raw_logic(
        "BAD",
        vec![RawClause {
            logic: vec![key],
            state_logic: Vec::new(),
            state_provider: Some(key),
        }],
    );
    assert!(matches!(
        lmb.build(),
        Err(RandoCoreError::MalformedLogic { .. })
    ));
}

#[test]
fn test_bare_term_rejected_in_state_logic() {
    let mut lmb = builder();
    let key = lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    lmb.add_raw_logic(
        "BAD",
        vec![RawClause {
            logic: Vec::new(),
            state_logic: vec![key],
            state_provider: None,
        }],
    );
    assert!(matches!(
        lmb.build(),
        Err(RandoCoreError::MalformedLogic { .. })
    ));
}

#[test]
fn test_create_def_after_freeze_uses_known_names_only() {
    let mut lmb = builder();
    lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    lmb.get_or_add_term("B", TermKind::Int).unwrap();
    lmb.add_logic("SEED", "KEY>0");
    let lm = lmb.build().unwrap();

    let def = lm
        .create_dnf_logic_def(&LogicSource::new("LATE", "KEY | B"))
        .unwrap();
    assert_eq!(def.clauses().len(), 2);

    assert!(matches!(
        lm.create_dnf_logic_def(&LogicSource::new("LATE2", "UNSEEN")),
        Err(RandoCoreError::UnknownVariable(_))
    ));
}

#[test]
fn test_logic_def_lookup_strict() {
    let mut lmb = builder();
    lmb.get_or_add_term("KEY", TermKind::Int).unwrap();
    lmb.add_logic("DOOR", "KEY");
    let lm = lmb.build().unwrap();
    assert!(lm.logic_def("DOOR").is_some());
    assert!(lm.logic_def_strict("MISSING").is_err());
}
