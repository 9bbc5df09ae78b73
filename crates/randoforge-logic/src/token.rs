//! Name-level token reconstruction from compiled defs.

use crate::def::DnfLogicDef;
use crate::manager::LogicManager;
use crate::ops::{is_term, is_variable, CompareOp, LogicReader, LogicStep};

/// One token of a reconstructed logic source. The stream is a flat DNF:
/// clause tokens separated by [`LogicToken::Or`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicToken {
    /// Term or variable reference by name.
    Name(String),
    Any,
    None,
    Or,
    Comparison(CompareOp, String, String),
}

pub(crate) fn tokenize_def(def: &DnfLogicDef, lm: &LogicManager) -> Vec<LogicToken> {
    let mut tokens = Vec::new();
    for (index, clause) in def.clauses().iter().enumerate() {
        if index > 0 {
            tokens.push(LogicToken::Or);
        }
        tokenize_sequence(clause.logic(), lm, &mut tokens);
        tokenize_sequence(clause.state_logic(), lm, &mut tokens);
        // A provider that is neither a logic term nor a state op still has to
        // survive the round trip.
        if let Some(id) = clause.state_provider() {
            if is_variable(id) && !clause.logic().contains(&id) {
                if let Some(name) = id_name(lm, id) {
                    tokens.push(LogicToken::Name(name));
                }
            }
        }
    }
    tokens
}

fn tokenize_sequence(seq: &[i32], lm: &LogicManager, tokens: &mut Vec<LogicToken>) {
    for step in LogicReader::new(seq) {
        match step {
            LogicStep::Term(t) => {
                if let Some(name) = id_name(lm, t) {
                    tokens.push(LogicToken::Name(name));
                }
            }
            LogicStep::Variable(v) => {
                if let Some(name) = id_name(lm, v) {
                    tokens.push(LogicToken::Name(name));
                }
            }
            LogicStep::Any => tokens.push(LogicToken::Any),
            LogicStep::None => tokens.push(LogicToken::None),
            LogicStep::Comparison(op, lhs, rhs) => {
                if let (Some(l), Some(r)) = (id_name(lm, lhs), id_name(lm, rhs)) {
                    tokens.push(LogicToken::Comparison(op, l, r));
                }
            }
        }
    }
}

fn id_name(lm: &LogicManager, id: i32) -> Option<String> {
    if is_term(id) {
        lm.term(id).map(|t| t.name().to_string())
    } else {
        lm.variable_by_id(id).map(|v| v.name().to_string())
    }
}
