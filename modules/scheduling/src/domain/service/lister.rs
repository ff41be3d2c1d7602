use std::marker::PhantomData;
use std::sync::Arc;

use access_control_sdk::{Action, DenyReason};
use access_control_sdk::pep::PolicyEnforcer;
use carepath_listing::{ListQueryParams, ListQuerySpec, PaginatedResult};
use carepath_security::Principal;
use tracing::instrument;
use uuid::Uuid;

use super::{live_plan, load_live};
use crate::domain::error::DomainError;
use crate::domain::models::Entity;
use crate::domain::repos::EntityRepository;

/// Generic list / get flow for one entity type.
///
/// `list`: type-level check, list scope, scoped plan, repository, envelope.
pub struct EntityLister<T: Entity> {
    repo: Arc<dyn EntityRepository<T>>,
    enforcer: PolicyEnforcer,
    spec: Arc<ListQuerySpec>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityLister<T> {
    #[must_use]
    pub fn new(
        repo: Arc<dyn EntityRepository<T>>,
        enforcer: PolicyEnforcer,
        spec: ListQuerySpec,
    ) -> Self {
        Self {
            repo,
            enforcer,
            spec: Arc::new(spec),
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &ListQuerySpec {
        &self.spec
    }

    /// One page of the rows `principal` may see.
    ///
    /// # Errors
    ///
    /// - [`DomainError::AccessDenied`] if the role may not list this entity
    /// - [`DomainError::Repository`] if the store fails
    #[instrument(
        skip(self, principal, params),
        fields(entity = %T::KIND, user_id = %principal.user_id())
    )]
    pub async fn list(
        &self,
        principal: &Principal,
        params: &ListQueryParams,
    ) -> Result<PaginatedResult<T>, DomainError> {
        let resource = T::KIND.resource();
        self.enforcer
            .authorize(principal, resource, resource.list_action(), None)
            .await?;
        let scope = self.enforcer.access_scope(principal, resource).await?;
        let plan = live_plan(&self.spec, params, &scope, principal);

        let (rows, total) = self.repo.list(&plan).await.map_err(|e| {
            tracing::error!(error = %e, "list query failed");
            e
        })?;

        tracing::debug!(
            total,
            returned = rows.len(),
            page = plan.page.page(),
            "listed rows"
        );
        Ok(plan.paginate(rows, total))
    }

    /// A single live row, if `principal` may view it.
    ///
    /// Rows in an organization the caller cannot reach are reported as not
    /// found, the same as absent rows.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotFound`] if the row is absent, soft-deleted or
    ///   outside the caller's organizations
    /// - [`DomainError::AccessDenied`] if any other rule rejects the caller
    #[instrument(skip(self, principal), fields(entity = %T::KIND, id = %id))]
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<T, DomainError> {
        tracing::debug!("Getting row by id");
        let row = load_live(self.repo.as_ref(), id).await?;
        self.enforcer
            .authorize(
                principal,
                T::KIND.resource(),
                Action::View,
                row.target().as_ref(),
            )
            .await
            .map_err(|e| match DomainError::from(e) {
                DomainError::AccessDenied(DenyReason::OrganizationAccessDenied) => {
                    DomainError::not_found(T::KIND, id)
                }
                other => other,
            })?;
        Ok(row)
    }
}

impl<T: Entity> std::fmt::Debug for EntityLister<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityLister")
            .field("entity", &T::KIND)
            .finish_non_exhaustive()
    }
}
