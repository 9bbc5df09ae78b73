//! The compiled-logic id banding and the shared bytecode decoder.
//!
//! Compiled clause arrays are heterogeneous `i32` sequences: term ids
//! (`>= 0`), variable ids (`<= VARIABLE_ID_OFFSET`), and operator sentinels
//! in the reserved band `[-99, -1]`. Comparison operators consume the next
//! two entries as operands. [`LogicReader`] is the one decoder every walker
//! (evaluation, term extraction, token reconstruction) goes through.

use randoforge_core::TermId;

/// Always-true sentinel.
pub const ANY: i32 = -1;
/// Always-false sentinel.
pub const NONE: i32 = -2;
/// Conjunction marker; never present in DNF clause arrays.
pub const AND: i32 = -3;
/// Disjunction marker; never present in DNF clause arrays.
pub const OR: i32 = -4;
/// Equality comparison; consumes the next two ids.
pub const EQ: i32 = -5;
/// Less-than comparison; consumes the next two ids.
pub const LT: i32 = -6;
/// Greater-than comparison; consumes the next two ids.
pub const GT: i32 = -7;

/// Variables are allocated densely downward from this id.
pub const VARIABLE_ID_OFFSET: i32 = -100;

/// `true` for ids naming a term.
pub fn is_term(id: i32) -> bool {
    id >= 0
}

/// `true` for ids naming a variable.
pub fn is_variable(id: i32) -> bool {
    id <= VARIABLE_ID_OFFSET
}

/// `true` for ids in the reserved operator band.
pub fn is_operator(id: i32) -> bool {
    id < 0 && id > VARIABLE_ID_OFFSET
}

/// Comparison operators appearing inline in clause arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
}

impl CompareOp {
    pub fn from_id(id: i32) -> Option<CompareOp> {
        match id {
            EQ => Some(CompareOp::Eq),
            LT => Some(CompareOp::Lt),
            GT => Some(CompareOp::Gt),
            _ => None,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            CompareOp::Eq => EQ,
            CompareOp::Lt => LT,
            CompareOp::Gt => GT,
        }
    }

    pub fn apply(&self, lhs: i32, rhs: i32) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Gt => lhs > rhs,
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
        };
        f.write_str(symbol)
    }
}

/// One decoded step of a clause array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicStep {
    Term(TermId),
    Variable(i32),
    Any,
    None,
    /// Comparison with both operand ids already consumed.
    Comparison(CompareOp, i32, i32),
}

impl LogicStep {
    /// Width of the step in sequence entries.
    pub fn width(&self) -> usize {
        match self {
            LogicStep::Comparison(..) => 3,
            _ => 1,
        }
    }
}

/// Decoder over a compiled clause array.
///
/// Iteration assumes the sequence was validated at registration; a malformed
/// tail (a comparison missing operands, or a stray `AND`/`OR`) decodes to
/// [`LogicStep::None`], failing the walk rather than panicking.
#[derive(Debug, Clone)]
pub struct LogicReader<'a> {
    seq: &'a [i32],
    pos: usize,
}

impl<'a> LogicReader<'a> {
    pub fn new(seq: &'a [i32]) -> Self {
        LogicReader { seq, pos: 0 }
    }

    /// Resumes decoding at an entry offset, used by the recursive walkers.
    pub fn at(seq: &'a [i32], pos: usize) -> Self {
        LogicReader { seq, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Decodes the step at `pos` without advancing.
    pub fn peek(&self) -> Option<LogicStep> {
        let id = *self.seq.get(self.pos)?;
        Some(decode(id, self.seq, self.pos))
    }
}

impl Iterator for LogicReader<'_> {
    type Item = LogicStep;

    fn next(&mut self) -> Option<LogicStep> {
        let step = self.peek()?;
        self.pos += step.width();
        Some(step)
    }
}

fn decode(id: i32, seq: &[i32], pos: usize) -> LogicStep {
    if is_term(id) {
        return LogicStep::Term(id);
    }
    if is_variable(id) {
        return LogicStep::Variable(id);
    }
    if let Some(op) = CompareOp::from_id(id) {
        return match (seq.get(pos + 1), seq.get(pos + 2)) {
            (Some(&lhs), Some(&rhs)) if !is_operator(lhs) && !is_operator(rhs) => {
                LogicStep::Comparison(op, lhs, rhs)
            }
            _ => LogicStep::None,
        };
    }
    match id {
        ANY => LogicStep::Any,
        _ => LogicStep::None,
    }
}

/// Structural validation of a clause array: banding, comparison arity, and
/// absence of `AND`/`OR` (DNF clauses are flat conjunctions).
pub fn validate_sequence(seq: &[i32]) -> std::result::Result<(), String> {
    let mut i = 0;
    while i < seq.len() {
        let id = seq[i];
        if id == AND || id == OR {
            return Err(format!("conjunction/disjunction marker at entry {i}"));
        }
        if let Some(op) = CompareOp::from_id(id) {
            let lhs = seq.get(i + 1).copied();
            let rhs = seq.get(i + 2).copied();
            match (lhs, rhs) {
                (Some(l), Some(r)) if !is_operator(l) && !is_operator(r) => i += 3,
                _ => return Err(format!("comparison {op:?} at entry {i} lacks two operand ids")),
            }
        } else if is_term(id) || is_variable(id) || id == ANY || id == NONE {
            i += 1;
        } else {
            return Err(format!("unassigned operator id {id} at entry {i}"));
        }
    }
    Ok(())
}
