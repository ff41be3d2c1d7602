//! In-process client for the access-control module.

use access_control_sdk::{
    AccessControlClient, AccessControlError, AccessDecision, Action, Resource, ResourceTarget,
};
use async_trait::async_trait;
use carepath_security::{AccessScope, Principal};

use super::engine::AccessControlEngine;

#[async_trait]
impl AccessControlClient for AccessControlEngine {
    async fn check(
        &self,
        principal: &Principal,
        resource: Resource,
        action: Action,
        target: Option<&ResourceTarget>,
    ) -> Result<AccessDecision, AccessControlError> {
        Ok(AccessControlEngine::check(self, principal, resource, action, target))
    }

    async fn list_scope(
        &self,
        principal: &Principal,
        resource: Resource,
    ) -> Result<AccessScope, AccessControlError> {
        AccessControlEngine::list_scope(self, principal, resource)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use access_control_sdk::DenyReason;
    use access_control_sdk::pep::PolicyEnforcer;
    use carepath_security::RoleId;
    use uuid::Uuid;

    use super::*;
    use crate::config::AccessControlConfig;

    #[tokio::test]
    async fn engine_serves_as_client_behind_enforcer() {
        let engine = AccessControlEngine::from_config(&AccessControlConfig::default()).unwrap();
        let enforcer = PolicyEnforcer::new(Arc::new(engine));
        let org = Uuid::from_u128(1);
        let p = Principal::builder()
            .user_id(Uuid::from_u128(2))
            .role(RoleId::ClientAdmin)
            .organization_id(org)
            .build()
            .unwrap();

        let own = ResourceTarget::in_organization(org);
        let foreign = ResourceTarget::in_organization(Uuid::from_u128(3));
        assert!(
            enforcer
                .authorize(&p, Resource::Organization, Action::Edit, Some(&own))
                .await
                .is_ok()
        );
        let err = enforcer
            .authorize(&p, Resource::Organization, Action::Edit, Some(&foreign))
            .await
            .unwrap_err();
        assert_eq!(err.deny_reason(), Some(DenyReason::OrganizationAccessDenied));

        let scope = enforcer.access_scope(&p, Resource::Patient).await.unwrap();
        assert!(scope.contains_value(carepath_security::properties::ORGANIZATION_ID, org));
    }
}
