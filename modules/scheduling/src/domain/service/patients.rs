use std::sync::Arc;

use access_control_sdk::pep::PolicyEnforcer;
use access_control_sdk::{Action, Resource};
use carepath_listing::{ListQueryParams, ListQuerySpec};
use carepath_security::Principal;
use tracing::instrument;

use super::live_plan;
use crate::domain::error::DomainError;
use crate::domain::models::Patient;
use crate::domain::repos::EntityRepository;

pub struct PatientsService {
    repo: Arc<dyn EntityRepository<Patient>>,
    enforcer: PolicyEnforcer,
    spec: ListQuerySpec,
}

impl PatientsService {
    #[must_use]
    pub fn new(
        repo: Arc<dyn EntityRepository<Patient>>,
        enforcer: PolicyEnforcer,
        spec: ListQuerySpec,
    ) -> Self {
        Self {
            repo,
            enforcer,
            spec,
        }
    }

    /// Every patient `principal` may see that matches the search and
    /// filters of `params`.
    ///
    /// Paging in `params` is ignored: the export walks the result set in
    /// pages of the maximum page size until the store's total is reached.
    ///
    /// # Errors
    ///
    /// - [`DomainError::AccessDenied`] without `patient:export_phi`
    /// - [`DomainError::Repository`] if the store fails
    #[instrument(skip(self, principal, params), fields(user_id = %principal.user_id()))]
    pub async fn export_patients(
        &self,
        principal: &Principal,
        params: &ListQueryParams,
    ) -> Result<Vec<Patient>, DomainError> {
        self.enforcer
            .authorize(principal, Resource::Patient, Action::ExportPhi, None)
            .await?;
        let scope = self
            .enforcer
            .access_scope(principal, Resource::Patient)
            .await?;

        let page_size = i64::from(self.spec.max_page_size());
        let mut exported = Vec::new();
        let mut page = 1_i64;
        loop {
            let params = params.clone().page(page).page_size(page_size);
            let plan = live_plan(&self.spec, &params, &scope, principal);
            let (rows, total) = self.repo.list(&plan).await.map_err(|e| {
                tracing::error!(error = %e, page, "patient export query failed");
                e
            })?;

            let fetched = rows.len();
            exported.extend(rows);
            if fetched == 0 || u64::try_from(exported.len()).unwrap_or(u64::MAX) >= total {
                break;
            }
            page += 1;
        }

        tracing::info!(exported = exported.len(), pages = page, "exported patients");
        Ok(exported)
    }
}

impl std::fmt::Debug for PatientsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientsService")
            .field("spec", &self.spec.entity())
            .finish_non_exhaustive()
    }
}
