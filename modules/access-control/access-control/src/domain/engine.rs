//! Access decisions and list scopes.
//!
//! ## Decision order
//!
//! | step | rule | deny reason |
//! |------|------|-------------|
//! | 1 | principal has a known role | unknown role |
//! | 2 | matrix grants the action | insufficient role permissions |
//! | 3 | organization scope (organization-scoped resources) | organization access denied |
//! | 4 | location scope (front desk, location-bound resources) | location access denied |
//! | 5 | assignment scope (technician/booking, doctor/interpretation) | not assigned to this item |
//!
//! Steps 3-5 run only when a target instance is supplied. A scope attribute a
//! rule needs but the target lacks fails the rule.

use access_control_sdk::{
    AccessControlError, AccessDecision, Action, DenyReason, Resource, ResourceTarget,
};
use carepath_security::access_scope::properties;
use carepath_security::{AccessScope, Principal, RoleId};
use tracing::debug;
use uuid::Uuid;

use crate::config::AccessControlConfig;
use crate::domain::matrix::PermissionMatrix;

/// Single authoritative access decision point.
#[derive(Debug, Clone)]
pub struct AccessControlEngine {
    matrix: PermissionMatrix,
}

impl AccessControlEngine {
    #[must_use]
    pub fn new(matrix: PermissionMatrix) -> Self {
        Self { matrix }
    }

    /// Build the engine from configuration, validating the matrix.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::Configuration`] if the matrix is malformed.
    pub fn from_config(config: &AccessControlConfig) -> Result<Self, AccessControlError> {
        let matrix = match &config.matrix {
            Some(names) => PermissionMatrix::from_config(names)?,
            None => PermissionMatrix::builtin()?,
        };
        Ok(Self::new(matrix))
    }

    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Decide whether `principal` may perform `action` on `resource`.
    ///
    /// With `target == None` only the matrix is consulted ("may this role ever
    /// do this"); row-level restriction for lists comes from
    /// [`list_scope`](Self::list_scope).
    #[must_use]
    pub fn check(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
        target: Option<&ResourceTarget>,
    ) -> AccessDecision {
        let decision = self.evaluate(principal, resource, action, target);
        if let Some(reason) = decision.reason {
            log_denial(principal, resource.as_str(), action.as_str(), reason);
        }
        decision
    }

    /// [`check`](Self::check) for callers holding raw resource/action names.
    ///
    /// Names outside the closed sets deny with "unknown resource/action".
    #[must_use]
    pub fn check_named(
        &self,
        principal: &Principal,
        resource: &str,
        action: &str,
        target: Option<&ResourceTarget>,
    ) -> AccessDecision {
        if let (Ok(resource), Ok(action)) =
            (resource.parse::<Resource>(), action.parse::<Action>())
        {
            return self.check(principal, resource, action, target);
        }
        let reason = if principal.role().is_some() {
            DenyReason::UnknownResourceOrAction
        } else {
            DenyReason::UnknownRole
        };
        log_denial(principal, resource, action, reason);
        AccessDecision::deny(reason)
    }

    fn evaluate(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
        target: Option<&ResourceTarget>,
    ) -> AccessDecision {
        let Some(role) = principal.role() else {
            return AccessDecision::deny(DenyReason::UnknownRole);
        };
        if !self.matrix.grants(role, resource, action) {
            return AccessDecision::deny(DenyReason::InsufficientRolePermissions);
        }
        let Some(target) = target else {
            return AccessDecision::allow();
        };

        if resource.is_organization_scoped()
            && !organization_scope_passes(principal, role, target.organization_id)
        {
            return AccessDecision::deny(DenyReason::OrganizationAccessDenied);
        }
        if role == RoleId::FrontDesk
            && resource.is_location_bound()
            && !location_scope_passes(principal, target.procedure_location_id)
        {
            return AccessDecision::deny(DenyReason::LocationAccessDenied);
        }
        if let Some(property) = assignee_property(role, resource)
            && target.value_of(property) != Some(principal.user_id())
        {
            return AccessDecision::deny(DenyReason::NotAssigned);
        }
        AccessDecision::allow()
    }

    /// Row-level scope for listing `resource`.
    ///
    /// Requires the matrix to grant the resource's list action, then compiles
    /// the principal's scoping attributes:
    ///
    /// - unrestricted roles, or resources outside any organization: allow-all
    /// - `five_am_agent`: `organization_id IN agent_assigned_org_ids`
    /// - everyone else: `organization_id IN [own]`
    /// - front desk with assigned locations, location-bound resources:
    ///   `AND procedure_location_id IN assigned_location_ids`
    /// - technician on bookings, doctor on interpretations: `AND assignee IN [self]`
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::Denied`] when the role is unknown or may
    /// not list the resource.
    pub fn list_scope(
        &self,
        principal: &Principal,
        resource: Resource,
    ) -> Result<AccessScope, AccessControlError> {
        let decision = self.check(principal, resource, resource.list_action(), None);
        if let Some(reason) = decision.reason {
            return Err(AccessControlError::Denied(reason));
        }
        let Some(role) = principal.role() else {
            return Err(AccessControlError::Denied(DenyReason::UnknownRole));
        };

        let mut scope = if !resource.is_organization_scoped() || role.is_unrestricted() {
            AccessScope::allow_all()
        } else if role == RoleId::FiveAmAgent {
            AccessScope::for_organizations(principal.agent_assigned_org_ids().to_vec())
        } else {
            principal
                .organization_id()
                .map_or_else(AccessScope::deny_all, AccessScope::for_organization)
        };

        if role == RoleId::FrontDesk
            && resource.is_location_bound()
            && !principal.assigned_location_ids().is_empty()
        {
            scope = scope.restrict(
                properties::PROCEDURE_LOCATION_ID,
                principal.assigned_location_ids().to_vec(),
            );
        }
        if let Some(property) = assignee_property(role, resource) {
            scope = scope.restrict(property, vec![principal.user_id()]);
        }

        debug!(
            user_id = %principal.user_id(),
            role = role.as_str(),
            %resource,
            paths = scope.constraints().len(),
            unconstrained = scope.is_unconstrained(),
            "compiled list scope"
        );
        Ok(scope)
    }
}

fn log_denial(principal: &Principal, resource: &str, action: &str, reason: DenyReason) {
    debug!(
        user_id = %principal.user_id(),
        role = principal.role().map_or("<unknown>", RoleId::as_str),
        resource,
        action,
        %reason,
        "access denied"
    );
}

fn organization_scope_passes(
    principal: &Principal,
    role: RoleId,
    target_org: Option<Uuid>,
) -> bool {
    if role.is_unrestricted() {
        return true;
    }
    let Some(target_org) = target_org else {
        return false;
    };
    if role == RoleId::FiveAmAgent {
        return principal.agent_assigned_org_ids().contains(&target_org);
    }
    principal.organization_id() == Some(target_org)
}

fn location_scope_passes(principal: &Principal, target_location: Option<Uuid>) -> bool {
    let assigned = principal.assigned_location_ids();
    if assigned.is_empty() {
        return true;
    }
    target_location.is_some_and(|id| assigned.contains(&id))
}

/// Scope property naming the assignee `role` must match on `resource`, when
/// the assignment rule applies.
fn assignee_property(role: RoleId, resource: Resource) -> Option<&'static str> {
    resource
        .assignee()
        .filter(|(assignee_role, _)| *assignee_role == role)
        .map(|(_, property)| property)
}
