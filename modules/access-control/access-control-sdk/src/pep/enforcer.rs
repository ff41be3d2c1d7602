//! Policy Enforcement Point (`PEP`) object.
//!
//! [`PolicyEnforcer`] wraps the access-control client and turns its answers
//! into the shapes domain services want: `Result<(), _>` for single-instance
//! gates, [`AccessScope`] for list queries.

use std::sync::Arc;

use carepath_security::{AccessScope, Principal};

use crate::api::AccessControlClient;
use crate::error::AccessControlError;
use crate::models::{AccessDecision, Action, DenyReason, Resource, ResourceTarget};

/// Policy Enforcement Point.
///
/// Constructed once during service init; cloneable and cheap to pass around
/// (`Arc` inside).
///
/// # Example
///
/// ```ignore
/// use access_control_sdk::pep::PolicyEnforcer;
///
/// let enforcer = PolicyEnforcer::new(access.clone());
/// enforcer.authorize(&principal, Resource::Organization, Action::Edit, Some(&target)).await?;
/// let scope = enforcer.access_scope(&principal, Resource::Booking).await?;
/// ```
#[derive(Clone)]
pub struct PolicyEnforcer {
    access: Arc<dyn AccessControlClient>,
}

impl PolicyEnforcer {
    #[must_use]
    pub fn new(access: Arc<dyn AccessControlClient>) -> Self {
        Self { access }
    }

    /// Raw decision, for callers that branch on it (e.g. to hide a control).
    ///
    /// # Errors
    ///
    /// Propagates client failures.
    pub async fn check(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
        target: Option<&ResourceTarget>,
    ) -> Result<AccessDecision, AccessControlError> {
        self.access.check(principal, resource, action, target).await
    }

    /// Succeed only if the decision allows the action.
    ///
    /// # Errors
    ///
    /// - [`AccessControlError::Denied`] carrying the deny reason
    /// - client failures, propagated
    pub async fn authorize(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
        target: Option<&ResourceTarget>,
    ) -> Result<(), AccessControlError> {
        let decision = self.check(principal, resource, action, target).await?;
        if decision.allowed {
            return Ok(());
        }
        Err(AccessControlError::Denied(
            decision
                .reason
                .unwrap_or(DenyReason::InsufficientRolePermissions),
        ))
    }

    /// Row-level scope for listing `resource`.
    ///
    /// # Errors
    ///
    /// - [`AccessControlError::Denied`] if the principal may not list it at all
    pub async fn access_scope(
        &self,
        principal: &Principal,
        resource: Resource,
    ) -> Result<AccessScope, AccessControlError> {
        self.access.list_scope(principal, resource).await
    }
}

impl std::fmt::Debug for PolicyEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEnforcer").finish_non_exhaustive()
    }
}
