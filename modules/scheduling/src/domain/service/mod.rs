//! Domain services.
//!
//! Every service takes the acting [`Principal`] explicitly, gates the
//! operation through the [`PolicyEnforcer`] and only then touches storage.
//! Single-instance gates use the scope attributes of the stored row, so a
//! caller cannot widen its access by supplying its own target.

mod bookings;
mod interpretations;
mod lister;
mod organizations;
mod patients;

use std::sync::Arc;

use access_control_sdk::AccessControlClient;
use access_control_sdk::pep::PolicyEnforcer;
use carepath_listing::{Condition, ListQueryParams, ListQuerySpec, QueryPlan, build_scoped_plan};
use carepath_security::{AccessScope, Principal, RoleId};
use uuid::Uuid;

pub use bookings::BookingsService;
pub use interpretations::InterpretationsService;
pub use lister::EntityLister;
pub use organizations::OrganizationsService;
pub use patients::PatientsService;

use super::error::DomainError;
use super::models::{
    Appointment, Booking, Entity, EntityKind, Interpretation, InterpretingDoctor, Member,
    Organization, Patient, Technician, User,
};
use super::registry::{DELETED_AT, INCLUDE_DELETED, ListQueryRegistry};
use super::repos::EntityRepository;

/// One repository per entity type.
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn EntityRepository<Organization>>,
    pub members: Arc<dyn EntityRepository<Member>>,
    pub users: Arc<dyn EntityRepository<User>>,
    pub technicians: Arc<dyn EntityRepository<Technician>>,
    pub interpreting_doctors: Arc<dyn EntityRepository<InterpretingDoctor>>,
    pub patients: Arc<dyn EntityRepository<Patient>>,
    pub appointments: Arc<dyn EntityRepository<Appointment>>,
    pub bookings: Arc<dyn EntityRepository<Booking>>,
    pub interpretations: Arc<dyn EntityRepository<Interpretation>>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// List endpoints, one per entity kind.
#[derive(Debug)]
pub struct Listers {
    pub organizations: EntityLister<Organization>,
    pub members: EntityLister<Member>,
    pub users: EntityLister<User>,
    pub technicians: EntityLister<Technician>,
    pub interpreting_doctors: EntityLister<InterpretingDoctor>,
    pub patients: EntityLister<Patient>,
    pub appointments: EntityLister<Appointment>,
    pub bookings: EntityLister<Booking>,
    pub interpretations: EntityLister<Interpretation>,
}

/// DI container for the scheduling services.
#[derive(Debug)]
pub struct AppServices {
    pub lists: Listers,
    pub organizations: OrganizationsService,
    pub bookings: BookingsService,
    pub interpretations: InterpretationsService,
    pub patients: PatientsService,
}

impl AppServices {
    /// Wire services over `repos`, gated by `access`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Configuration`] if `registry` lacks a spec.
    pub fn new(
        repos: &Repositories,
        access: Arc<dyn AccessControlClient>,
        registry: &ListQueryRegistry,
    ) -> Result<Self, DomainError> {
        let enforcer = PolicyEnforcer::new(access);
        let lists = Listers {
            organizations: lister(&repos.organizations, &enforcer, registry)?,
            members: lister(&repos.members, &enforcer, registry)?,
            users: lister(&repos.users, &enforcer, registry)?,
            technicians: lister(&repos.technicians, &enforcer, registry)?,
            interpreting_doctors: lister(&repos.interpreting_doctors, &enforcer, registry)?,
            patients: lister(&repos.patients, &enforcer, registry)?,
            appointments: lister(&repos.appointments, &enforcer, registry)?,
            bookings: lister(&repos.bookings, &enforcer, registry)?,
            interpretations: lister(&repos.interpretations, &enforcer, registry)?,
        };

        Ok(Self {
            lists,
            organizations: OrganizationsService::new(
                Arc::clone(&repos.organizations),
                enforcer.clone(),
            ),
            bookings: BookingsService::new(Arc::clone(&repos.bookings), enforcer.clone()),
            interpretations: InterpretationsService::new(
                Arc::clone(&repos.interpretations),
                Arc::clone(&repos.interpreting_doctors),
                enforcer.clone(),
            ),
            patients: PatientsService::new(
                Arc::clone(&repos.patients),
                enforcer,
                spec_for(registry, EntityKind::Patients)?,
            ),
        })
    }
}

fn lister<T: Entity>(
    repo: &Arc<dyn EntityRepository<T>>,
    enforcer: &PolicyEnforcer,
    registry: &ListQueryRegistry,
) -> Result<EntityLister<T>, DomainError> {
    let spec = spec_for(registry, T::KIND)?;
    Ok(EntityLister::new(Arc::clone(repo), enforcer.clone(), spec))
}

fn spec_for(registry: &ListQueryRegistry, kind: EntityKind) -> Result<ListQuerySpec, DomainError> {
    registry
        .spec(kind)
        .cloned()
        .ok_or_else(|| DomainError::Configuration(format!("no list spec registered for {kind}")))
}

/// Scoped plan that hides soft-deleted rows unless an unrestricted caller
/// asks for them with `includeDeleted`.
pub(crate) fn live_plan(
    spec: &ListQuerySpec,
    params: &ListQueryParams,
    scope: &AccessScope,
    principal: &Principal,
) -> QueryPlan {
    let mut plan = build_scoped_plan(spec, params, scope);
    if !include_deleted(principal, params) {
        plan.conditions.push(Condition::is_null(DELETED_AT));
    }
    plan
}

fn include_deleted(principal: &Principal, params: &ListQueryParams) -> bool {
    let requested = params
        .filters
        .get(INCLUDE_DELETED)
        .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"));
    if requested && !principal.role().is_some_and(RoleId::is_unrestricted) {
        tracing::debug!("includeDeleted ignored for a restricted role");
        return false;
    }
    requested
}

/// Fetch a row that has not been soft-deleted.
pub(crate) async fn load_live<T: Entity>(
    repo: &dyn EntityRepository<T>,
    id: Uuid,
) -> Result<T, DomainError> {
    repo.get(id)
        .await?
        .filter(|row| !row.audit().is_deleted())
        .ok_or_else(|| DomainError::not_found(T::KIND, id))
}

#[cfg(test)]
mod tests_workflows;
