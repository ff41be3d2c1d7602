use carepath_security::access_scope::{FilterOp, ScopeConstraint};
use carepath_security::AccessScope;

use crate::condition::Condition;
use crate::spec::ListQuerySpec;

/// Compile an [`AccessScope`] into plan conditions using the spec's scope
/// field mapping.
///
/// # OR/AND Semantics
///
/// - Multiple constraints are OR-ed (alternative access paths)
/// - Filters within a constraint are AND-ed
/// - A property the entity does not map fails that constraint (fail-closed)
/// - If every constraint fails, the result is [`Condition::Never`]
///
/// | Scope | Conditions |
/// |-------|------------|
/// | allow-all | none |
/// | deny-all | `[Never]` |
/// | single constraint | its filters, AND-ed at top level |
/// | multiple constraints | `[Any([All(..), ..])]` |
#[must_use]
pub fn scope_conditions(spec: &ListQuerySpec, scope: &AccessScope) -> Vec<Condition> {
    if scope.is_unconstrained() {
        return Vec::new();
    }
    if scope.is_deny_all() {
        return vec![Condition::Never];
    }

    let compiled: Vec<Vec<Condition>> = scope
        .constraints()
        .iter()
        .filter_map(|c| constraint_conditions(spec, c))
        .collect();

    if compiled.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    match compiled.len() {
        0 => {
            tracing::warn!(
                entity = spec.entity(),
                "access scope references properties the entity does not carry; denying"
            );
            vec![Condition::Never]
        }
        1 => compiled.into_iter().next().unwrap_or_else(|| vec![Condition::Never]),
        _ => vec![Condition::Any(
            compiled.into_iter().map(Condition::All).collect(),
        )],
    }
}

/// Returns `None` if any filter references an unmapped property.
fn constraint_conditions(
    spec: &ListQuerySpec,
    constraint: &ScopeConstraint,
) -> Option<Vec<Condition>> {
    let mut conditions = Vec::with_capacity(constraint.filters().len());
    for filter in constraint.filters() {
        let field = spec.scope_field(filter.property())?;
        match filter.op() {
            FilterOp::In => conditions.push(Condition::is_in(field, filter.values().to_vec())),
        }
    }
    Some(conditions)
}
