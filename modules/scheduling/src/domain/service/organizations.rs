use std::sync::Arc;

use access_control_sdk::pep::PolicyEnforcer;
use access_control_sdk::{Action, Resource};
use carepath_security::{OrganizationType, Principal};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::load_live;
use crate::domain::error::DomainError;
use crate::domain::models::{Entity, Organization, OrganizationPatch};
use crate::domain::repos::EntityRepository;

pub struct OrganizationsService {
    repo: Arc<dyn EntityRepository<Organization>>,
    enforcer: PolicyEnforcer,
}

impl OrganizationsService {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository<Organization>>, enforcer: PolicyEnforcer) -> Self {
        Self { repo, enforcer }
    }

    /// Apply `patch` to an organization.
    ///
    /// Absent fields keep their stored values. The platform (`admin`-type)
    /// organization cannot be deactivated.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for a blank name or an attempt to
    ///   deactivate the platform organization
    /// - [`DomainError::NotFound`] if the organization does not exist
    /// - [`DomainError::AccessDenied`] without `organization:edit` on it
    #[instrument(skip(self, principal, patch), fields(organization_id = %id))]
    pub async fn update_organization(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: OrganizationPatch,
    ) -> Result<Organization, DomainError> {
        tracing::info!("Updating organization");

        if let Some(ref name) = patch.name
            && name.trim().is_empty()
        {
            return Err(DomainError::validation("name", "must not be blank"));
        }

        let mut current = load_live(self.repo.as_ref(), id).await?;
        self.enforcer
            .authorize(
                principal,
                Resource::Organization,
                Action::Edit,
                current.target().as_ref(),
            )
            .await?;

        if let Some(is_active) = patch.is_active {
            if !is_active && current.organization_type == OrganizationType::Admin {
                return Err(DomainError::validation(
                    "is_active",
                    "the platform organization cannot be deactivated",
                ));
            }
            current.is_active = is_active;
        }
        if let Some(name) = patch.name {
            current.name = name.trim().to_owned();
        }
        current
            .audit
            .touch(principal.user_id(), OffsetDateTime::now_utc());

        let updated = self.repo.save(current).await?;
        tracing::info!(is_active = updated.is_active, "Successfully updated organization");
        Ok(updated)
    }
}

impl std::fmt::Debug for OrganizationsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationsService").finish_non_exhaustive()
    }
}
