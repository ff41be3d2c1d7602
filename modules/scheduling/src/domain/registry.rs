//! Per-entity list specs, built and validated once at startup.

use std::collections::HashMap;

use carepath_listing::{ListQuerySpec, ListQuerySpecBuilder, SortDirection, SpecError};
use carepath_security::RoleId;
use carepath_security::access_scope::properties;

use super::models::{AppointmentStatus, BookingStatus, EntityKind, InterpretationStatus};
use crate::config::SchedulingConfig;

/// Soft-delete timestamp field shared by every entity.
pub const DELETED_AT: &str = "deletedAt";

/// Filter key that lifts the soft-delete predicate. Handled by the lister,
/// not declared in any spec.
pub const INCLUDE_DELETED: &str = "includeDeleted";

/// Immutable `EntityKind -> ListQuerySpec` table.
#[derive(Debug, Clone)]
pub struct ListQueryRegistry {
    specs: HashMap<EntityKind, ListQuerySpec>,
}

impl ListQueryRegistry {
    /// Build the spec of every entity kind with the configured page limits.
    ///
    /// # Errors
    ///
    /// Returns the first [`SpecError`] found; startup must abort on it.
    pub fn builtin(config: &SchedulingConfig) -> Result<Self, SpecError> {
        let mut specs = HashMap::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let spec = definition(kind)
                .page_sizes(config.default_page_size, config.max_page_size)
                .min_search_length(config.search_min_length)
                .build()?;
            specs.insert(kind, spec);
        }
        tracing::debug!(entities = specs.len(), "list query specs registered");
        Ok(Self { specs })
    }

    #[must_use]
    pub fn spec(&self, kind: EntityKind) -> Option<&ListQuerySpec> {
        self.specs.get(&kind)
    }
}

fn base(kind: EntityKind) -> ListQuerySpecBuilder {
    ListQuerySpec::builder(kind.as_str())
        .sortable("createdAt", "createdAt")
        .sortable("updatedAt", "updatedAt")
        .filter_date_after("createdAfter", "createdAt")
        .filter_date_before("createdBefore", "createdAt")
        .default_sort("createdAt", SortDirection::Desc)
        .scope_field(properties::RESOURCE_ID, "id")
}

fn organization_owned(kind: EntityKind) -> ListQuerySpecBuilder {
    base(kind).scope_field(properties::ORGANIZATION_ID, "organizationId")
}

fn staff(kind: EntityKind) -> ListQuerySpecBuilder {
    organization_owned(kind)
        .searchable(["firstName", "lastName", "email"])
        .filter_bool("isActive", "isActive")
        .sortable("firstName", "firstName")
        .sortable("lastName", "lastName")
}

fn definition(kind: EntityKind) -> ListQuerySpecBuilder {
    match kind {
        EntityKind::Organizations => base(kind)
            .searchable(["name"])
            .filter_enum("type", "type", ["admin", "client"])
            .filter_bool("isActive", "isActive")
            .sortable("name", "name")
            .scope_field(properties::ORGANIZATION_ID, "id"),
        EntityKind::Members => organization_owned(kind)
            .searchable(["displayName", "email"])
            .filter_enum("role", "role", RoleId::ALL.map(RoleId::as_str))
            .sortable("displayName", "displayName")
            .sortable("email", "email"),
        EntityKind::Users => base(kind)
            .searchable(["name", "email"])
            .filter_bool("banned", "banned")
            .sortable("name", "name")
            .sortable("email", "email"),
        EntityKind::Technicians => staff(kind),
        EntityKind::InterpretingDoctors => staff(kind)
            .filter_text("specialty", "specialty")
            .sortable("specialty", "specialty"),
        EntityKind::Patients => organization_owned(kind)
            .searchable(["firstName", "lastName", "medicalRecordNumber", "email"])
            .filter_date_after("bornAfter", "dateOfBirth")
            .filter_date_before("bornBefore", "dateOfBirth")
            .sortable("firstName", "firstName")
            .sortable("lastName", "lastName")
            .sortable("dateOfBirth", "dateOfBirth"),
        EntityKind::Appointments => organization_owned(kind)
            .filter_enum("status", "status", AppointmentStatus::ALL.map(AppointmentStatus::as_str))
            .filter_date_after("scheduledAfter", "scheduledAt")
            .filter_date_before("scheduledBefore", "scheduledAt")
            .sortable("scheduledAt", "scheduledAt")
            .sortable("status", "status")
            .scope_field(properties::PROCEDURE_LOCATION_ID, "procedureLocationId"),
        EntityKind::Bookings => organization_owned(kind)
            .filter_enum("status", "status", BookingStatus::ALL.map(BookingStatus::as_str))
            .filter_date_after("scheduledAfter", "scheduledAt")
            .filter_date_before("scheduledBefore", "scheduledAt")
            .sortable("scheduledAt", "scheduledAt")
            .sortable("status", "status")
            .scope_field(properties::PROCEDURE_LOCATION_ID, "procedureLocationId")
            .scope_field(properties::ASSIGNED_TECHNICIAN_ID, "assignedTechnicianId"),
        EntityKind::Interpretations => organization_owned(kind)
            .searchable(["findings"])
            .filter_enum(
                "status",
                "status",
                InterpretationStatus::ALL.map(InterpretationStatus::as_str),
            )
            .sortable("status", "status")
            .scope_field(
                properties::ASSIGNED_INTERPRETING_DOCTOR_ID,
                "assignedInterpretingDoctorId",
            ),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use carepath_listing::{Condition, ListQueryParams, build_plan};

    fn registry() -> ListQueryRegistry {
        ListQueryRegistry::builtin(&SchedulingConfig::default()).unwrap()
    }

    #[test]
    fn every_kind_is_registered() {
        let registry = registry();
        for kind in EntityKind::ALL {
            let spec = registry.spec(kind).unwrap();
            assert_eq!(spec.entity(), kind.as_str());
            assert_eq!(spec.default_page_size(), 10);
            assert_eq!(spec.max_page_size(), 100);
        }
    }

    #[test]
    fn organization_scope_maps_to_own_id() {
        let registry = registry();
        let orgs = registry.spec(EntityKind::Organizations).unwrap();
        assert_eq!(orgs.scope_field(properties::ORGANIZATION_ID), Some("id"));
        let patients = registry.spec(EntityKind::Patients).unwrap();
        assert_eq!(
            patients.scope_field(properties::ORGANIZATION_ID),
            Some("organizationId")
        );
        assert_eq!(patients.scope_field(properties::PROCEDURE_LOCATION_ID), None);
    }

    #[test]
    fn default_order_is_newest_first() {
        let registry = registry();
        let spec = registry.spec(EntityKind::Patients).unwrap();
        let plan = build_plan(spec, &ListQueryParams::new().page(1).page_size(10));
        assert_eq!(plan.order_by.field, "createdAt");
        assert_eq!(plan.order_by.direction, SortDirection::Desc);
        assert!(plan.conditions.is_empty());
    }

    #[test]
    fn booking_status_filter_accepts_declared_values_only() {
        let registry = registry();
        let spec = registry.spec(EntityKind::Bookings).unwrap();

        let plan = build_plan(spec, &ListQueryParams::new().filter("status", "CHECKED_IN"));
        assert_eq!(
            plan.conditions,
            vec![Condition::equals_text("status", "checked_in")]
        );

        let plan = build_plan(spec, &ListQueryParams::new().filter("status", "lost"));
        assert!(plan.conditions.is_empty());
    }

    #[test]
    fn include_deleted_is_not_a_declared_filter() {
        let registry = registry();
        for kind in EntityKind::ALL {
            let spec = registry.spec(kind).unwrap();
            assert!(!spec.filterable_fields().contains_key(INCLUDE_DELETED));
        }
    }

    #[test]
    fn inconsistent_page_limits_fail_startup() {
        let config = SchedulingConfig {
            default_page_size: 200,
            max_page_size: 100,
            search_min_length: 1,
        };
        let err = ListQueryRegistry::builtin(&config).unwrap_err();
        assert!(matches!(err, SpecError::DefaultExceedsMax { .. }));
    }
}
