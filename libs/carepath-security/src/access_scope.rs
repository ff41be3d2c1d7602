use uuid::Uuid;

/// Well-known scope property names.
///
/// Shared between the access-control engine (which emits scopes) and the
/// list-query engine (which compiles them into plan conditions). Each entity
/// spec maps these names to its own fields.
pub mod properties {
    /// Owning organization. Present on every organization-scoped row.
    pub const ORGANIZATION_ID: &str = "organization_id";

    /// Procedure location a booking or appointment takes place at.
    pub const PROCEDURE_LOCATION_ID: &str = "procedure_location_id";

    /// Technician assigned to a booking.
    pub const ASSIGNED_TECHNICIAN_ID: &str = "assigned_technician_id";

    /// Interpreting doctor assigned to an interpretation.
    pub const ASSIGNED_INTERPRETING_DOCTOR_ID: &str = "assigned_interpreting_doctor_id";

    /// Row identity. Typically the primary key.
    pub const RESOURCE_ID: &str = "id";
}

/// Predicate operation type for scope filters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FilterOp {
    /// `property IN (values)`.
    In,
}

/// A single scope filter on a named property.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScopeFilter {
    property: String,
    op: FilterOp,
    values: Vec<Uuid>,
}

impl ScopeFilter {
    #[must_use]
    pub fn new(property: impl Into<String>, op: FilterOp, values: Vec<Uuid>) -> Self {
        Self {
            property: property.into(),
            op,
            values,
        }
    }

    /// Shorthand for an `IN` filter.
    #[must_use]
    pub fn is_in(property: impl Into<String>, values: Vec<Uuid>) -> Self {
        Self::new(property, FilterOp::In, values)
    }

    #[inline]
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline]
    #[must_use]
    pub fn op(&self) -> &FilterOp {
        &self.op
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Uuid] {
        &self.values
    }
}

/// A conjunction (AND) of scope filters: one access path.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScopeConstraint {
    filters: Vec<ScopeFilter>,
}

impl ScopeConstraint {
    #[must_use]
    pub fn new(filters: Vec<ScopeFilter>) -> Self {
        Self { filters }
    }

    /// The filters in this constraint (AND-ed together).
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &[ScopeFilter] {
        &self.filters
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// A disjunction (OR) of scope constraints defining which rows are visible.
///
/// Each constraint is an independent access path. Filters within a constraint
/// are AND-ed. An unconstrained scope applies no row-level filtering.
///
/// # Examples
///
/// ```
/// use carepath_security::access_scope::{AccessScope, properties};
/// use uuid::Uuid;
///
/// let scope = AccessScope::deny_all();
/// assert!(scope.is_deny_all());
///
/// let org = Uuid::new_v4();
/// let scope = AccessScope::for_organization(org);
/// assert!(scope.contains_value(properties::ORGANIZATION_ID, org));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccessScope {
    constraints: Vec<ScopeConstraint>,
    unconstrained: bool,
}

impl Default for AccessScope {
    /// Default is deny-all.
    fn default() -> Self {
        Self::deny_all()
    }
}

impl AccessScope {
    // ── Constructors ────────────────────────────────────────────────

    /// Create an access scope from a list of constraints (OR-ed).
    #[must_use]
    pub fn from_constraints(constraints: Vec<ScopeConstraint>) -> Self {
        Self {
            constraints,
            unconstrained: false,
        }
    }

    #[must_use]
    pub fn single(constraint: ScopeConstraint) -> Self {
        Self::from_constraints(vec![constraint])
    }

    /// No row-level filtering. A legitimate outcome for unrestricted roles.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            constraints: Vec::new(),
            unconstrained: true,
        }
    }

    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            constraints: Vec::new(),
            unconstrained: false,
        }
    }

    /// Rows owned by any of the given organizations.
    ///
    /// An empty list yields deny-all.
    #[must_use]
    pub fn for_organizations(ids: Vec<Uuid>) -> Self {
        if ids.is_empty() {
            return Self::deny_all();
        }
        Self::single(ScopeConstraint::new(vec![ScopeFilter::is_in(
            properties::ORGANIZATION_ID,
            ids,
        )]))
    }

    #[must_use]
    pub fn for_organization(id: Uuid) -> Self {
        Self::for_organizations(vec![id])
    }

    // ── Narrowing ───────────────────────────────────────────────────

    /// AND an additional `property IN values` filter onto every access path.
    ///
    /// Restricting allow-all produces a single-path scope; restricting with an
    /// empty value set produces deny-all.
    #[must_use]
    pub fn restrict(self, property: &str, values: Vec<Uuid>) -> Self {
        if values.is_empty() || self.is_deny_all() {
            return Self::deny_all();
        }
        if self.unconstrained {
            return Self::single(ScopeConstraint::new(vec![ScopeFilter::is_in(
                property, values,
            )]));
        }
        let constraints = self
            .constraints
            .into_iter()
            .map(|c| {
                let mut filters = c.filters;
                filters.push(ScopeFilter::is_in(property, values.clone()));
                ScopeConstraint::new(filters)
            })
            .collect();
        Self::from_constraints(constraints)
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The constraints in this scope (OR-ed).
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &[ScopeConstraint] {
        &self.constraints
    }

    #[inline]
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }

    /// A scope is deny-all when it is not unconstrained and has no constraints.
    #[must_use]
    pub fn is_deny_all(&self) -> bool {
        !self.unconstrained && self.constraints.is_empty()
    }

    /// Every `IN` value granted for `property`, across all access paths.
    #[must_use]
    pub fn all_values_for(&self, property: &str) -> Vec<Uuid> {
        self.constraints
            .iter()
            .flat_map(ScopeConstraint::filters)
            .filter(|f| f.property() == property && *f.op() == FilterOp::In)
            .flat_map(|f| f.values().iter().copied())
            .collect()
    }

    /// Whether some access path grants `id` for `property`.
    #[must_use]
    pub fn contains_value(&self, property: &str, id: Uuid) -> bool {
        self.constraints.iter().any(|c| {
            c.filters().iter().any(|f| {
                f.property() == property && *f.op() == FilterOp::In && f.values().contains(&id)
            })
        })
    }

    #[must_use]
    pub fn has_property(&self, property: &str) -> bool {
        self.constraints
            .iter()
            .any(|c| c.filters().iter().any(|f| f.property() == property))
    }
}
