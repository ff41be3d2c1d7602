//! Public API trait for the access-control module.

use async_trait::async_trait;
use carepath_security::{AccessScope, Principal};

use crate::error::AccessControlError;
use crate::models::{AccessDecision, Action, Resource, ResourceTarget};

/// Public API trait for the access-control module.
///
/// Implemented in-process by the engine; request handlers and domain
/// services consume it through [`PolicyEnforcer`](crate::pep::PolicyEnforcer):
///
/// ```ignore
/// let decision = access
///     .check(&principal, Resource::Booking, Action::CheckInPatient, Some(&target))
///     .await?;
/// ```
#[async_trait]
pub trait AccessControlClient: Send + Sync {
    /// Decide whether `principal` may perform `action` on `resource`.
    ///
    /// A denial is an `Ok` decision with `allowed == false`, not an error.
    /// With `target == None` only the role's grants are consulted.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the implementation cannot evaluate at all
    async fn check(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
        target: Option<&ResourceTarget>,
    ) -> Result<AccessDecision, AccessControlError>;

    /// Row-level scope restricting which `resource` rows the principal may list.
    ///
    /// # Errors
    ///
    /// - `Denied` if the principal may not list this resource at all
    async fn list_scope(
        &self,
        principal: &Principal,
        resource: Resource,
    ) -> Result<AccessScope, AccessControlError>;
}
