//! A minimal infix DNF parser for tests.
//!
//! Grammar: clauses joined by `|`, conjuncts joined by `+`. A conjunct is a
//! name, `TRUE`/`FALSE`, or a comparison `lhs=rhs` / `lhs<rhs` / `lhs>rhs`.
//! Names resolve to terms first, then through the variable chain. Conjuncts
//! are routed by kind: state modifiers and comparisons touching state-access
//! variables go to the state-logic array, everything else to boolean logic.
//! The clause's state provider is the first state-valued term or provider
//! variable encountered.

use randoforge_core::{RandoCoreError, Result};
use randoforge_logic::ops::{self, CompareOp};
use randoforge_logic::parser::{LogicCompileCtx, LogicParser, LogicSource, RawClause};

#[derive(Debug, Default)]
pub struct SimpleDnfParser;

impl SimpleDnfParser {
    pub fn new() -> Self {
        SimpleDnfParser
    }

    fn resolve_atom(ctx: &mut dyn LogicCompileCtx, name: &str) -> Result<i32> {
        if let Some(term) = ctx.term_id(name) {
            return Ok(term);
        }
        ctx.resolve_variable(name)
    }

    fn parse_clause(ctx: &mut dyn LogicCompileCtx, source: &str, def: &str) -> Result<RawClause> {
        let mut clause = RawClause::default();
        for conjunct in source.split('+') {
            let conjunct = conjunct.trim();
            if conjunct.is_empty() {
                return Err(RandoCoreError::MalformedLogic {
                    name: def.to_string(),
                    reason: "empty conjunct".to_string(),
                });
            }
            match conjunct {
                "TRUE" | "ANY" => clause.logic.push(ops::ANY),
                "FALSE" | "NONE" => clause.logic.push(ops::NONE),
                _ => Self::parse_conjunct(ctx, conjunct, &mut clause)?,
            }
        }
        Ok(clause)
    }

    fn parse_conjunct(
        ctx: &mut dyn LogicCompileCtx,
        conjunct: &str,
        clause: &mut RawClause,
    ) -> Result<()> {
        if let Some((op, lhs_name, rhs_name)) = split_comparison(conjunct) {
            let lhs = Self::resolve_atom(ctx, lhs_name)?;
            let rhs = Self::resolve_atom(ctx, rhs_name)?;
            // State-access operands are spelled with the `$` prefix; route
            // those comparisons through the state-logic array.
            let stateful = lhs_name.starts_with('$') || rhs_name.starts_with('$');
            if stateful {
                clause.state_logic.extend([op.id(), lhs, rhs]);
            } else {
                clause.logic.extend([op.id(), lhs, rhs]);
            }
            return Ok(());
        }

        let id = Self::resolve_atom(ctx, conjunct)?;
        if ops::is_term(id) {
            clause.logic.push(id);
            if clause.state_provider.is_none() && ctx.is_state_term(id) {
                clause.state_provider = Some(id);
            }
        } else if conjunct.starts_with('%') {
            // Modifier names are spelled with a `%` prefix in test logic.
            clause.state_logic.push(id);
        } else {
            clause.logic.push(id);
            if clause.state_provider.is_none() && conjunct.starts_with('*') {
                // Provider variables are spelled with a `*` prefix.
                clause.state_provider = Some(id);
            }
        }
        Ok(())
    }
}

impl LogicParser for SimpleDnfParser {
    fn parse_dnf(
        &self,
        ctx: &mut dyn LogicCompileCtx,
        source: &LogicSource,
    ) -> Result<Vec<RawClause>> {
        source
            .infix
            .split('|')
            .map(|clause| Self::parse_clause(ctx, clause.trim(), &source.name))
            .collect()
    }
}

fn split_comparison(conjunct: &str) -> Option<(CompareOp, &str, &str)> {
    for (symbol, op) in [('=', CompareOp::Eq), ('<', CompareOp::Lt), ('>', CompareOp::Gt)] {
        if let Some(pos) = conjunct.find(symbol) {
            let (lhs, rhs) = conjunct.split_at(pos);
            return Some((op, lhs.trim(), rhs[1..].trim()));
        }
    }
    None
}
