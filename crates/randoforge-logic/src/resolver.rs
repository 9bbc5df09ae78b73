//! Composable name-to-variable resolution.

use std::fmt::Debug;

use randoforge_core::{Result, StateManager};

use crate::variable::{ConstantVariable, StateFieldVariable, Variable};

/// What a resolver may consult while matching a name.
#[derive(Debug, Clone, Copy)]
pub struct ResolverCtx<'a> {
    pub sm: &'a StateManager,
}

/// Composable resolver: a user-provided resolver holds an inner fallback and
/// the chain is consulted outermost-first. Returning `Ok(None)` from the
/// whole chain means the name is unknown.
pub trait VariableResolver: Debug + Send + Sync {
    /// The fallback consulted when this resolver does not match.
    fn inner(&self) -> Option<&dyn VariableResolver> {
        None
    }

    /// Matches a name locally, without consulting the fallback.
    fn try_match_local(&self, ctx: &ResolverCtx<'_>, name: &str) -> Result<Option<Variable>>;

    /// Matches through the whole chain.
    fn try_match(&self, ctx: &ResolverCtx<'_>, name: &str) -> Result<Option<Variable>> {
        if let Some(variable) = self.try_match_local(ctx, name)? {
            return Ok(Some(variable));
        }
        match self.inner() {
            Some(inner) => inner.try_match(ctx, name),
            None => Ok(None),
        }
    }
}

/// Innermost resolver handling the generic built-ins: integer literals and
/// `$FIELD` state access.
#[derive(Debug, Default)]
pub struct BaseVariableResolver;

impl VariableResolver for BaseVariableResolver {
    fn try_match_local(&self, ctx: &ResolverCtx<'_>, name: &str) -> Result<Option<Variable>> {
        if let Ok(value) = name.parse::<i32>() {
            return Ok(Some(Variable::Int(std::sync::Arc::new(
                ConstantVariable::new(name, value),
            ))));
        }
        if let Some(access) = StateFieldVariable::try_resolve(ctx.sm, name) {
            return Ok(Some(Variable::Access(std::sync::Arc::new(access))));
        }
        Ok(None)
    }
}
