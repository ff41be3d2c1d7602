#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Service-level scenarios over the in-memory store and the built-in matrix.

use std::sync::Arc;

use access_control::{AccessControlConfig, AccessControlEngine};
use access_control_sdk::DenyReason;
use carepath_listing::ListQueryParams;
use carepath_security::{OrganizationType, Principal, RoleId};
use time::OffsetDateTime;
use time::macros::{date, datetime};
use tracing_test::traced_test;
use uuid::Uuid;

use super::*;
use crate::config::SchedulingConfig;
use crate::domain::models::{
    AuditStamp, BookingStatus, InterpretationStatus, OrganizationPatch,
};
use crate::infra::InMemoryRepository;

const ADMIN_ORG: &str = "00000000-0000-4000-8000-0000000000ad";
const ORG_A: &str = "00000000-0000-4000-8000-00000000000a";
const ORG_B: &str = "00000000-0000-4000-8000-00000000000b";
const LOC_1: &str = "10000000-0000-4000-8000-000000000001";
const LOC_2: &str = "10000000-0000-4000-8000-000000000002";
const TECH: &str = "20000000-0000-4000-8000-000000000001";
const TECH_OTHER: &str = "20000000-0000-4000-8000-000000000002";
const DOC: &str = "30000000-0000-4000-8000-000000000001";
const DOC_OTHER: &str = "30000000-0000-4000-8000-000000000002";
const DOC_B: &str = "30000000-0000-4000-8000-00000000000b";
const STAFF: &str = "40000000-0000-4000-8000-000000000001";

const PATIENT_A1: &str = "50000000-0000-4000-8000-0000000000a1";
const PATIENT_A2: &str = "50000000-0000-4000-8000-0000000000a2";
const PATIENT_A_DELETED: &str = "50000000-0000-4000-8000-0000000000a3";
const PATIENT_B1: &str = "50000000-0000-4000-8000-0000000000b1";
const PATIENT_B2: &str = "50000000-0000-4000-8000-0000000000b2";

const BOOKING_MINE: &str = "60000000-0000-4000-8000-000000000001";
const BOOKING_THEIRS: &str = "60000000-0000-4000-8000-000000000002";
const BOOKING_ORG_B: &str = "60000000-0000-4000-8000-000000000003";

const READING_ASSIGNED: &str = "70000000-0000-4000-8000-000000000001";
const READING_PENDING: &str = "70000000-0000-4000-8000-000000000002";

fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

fn stamp(at: OffsetDateTime) -> AuditStamp {
    AuditStamp::new(Some(uuid(STAFF)), at)
}

fn organization(id: &str, name: &str, kind: OrganizationType) -> Organization {
    Organization {
        id: uuid(id),
        name: name.to_owned(),
        organization_type: kind,
        is_active: true,
        audit: stamp(datetime!(2024-01-01 0:00 UTC)),
    }
}

fn patient(id: &str, org: &str, last_name: &str, day: u8) -> Patient {
    Patient {
        id: uuid(id),
        organization_id: uuid(org),
        first_name: "Pat".to_owned(),
        last_name: last_name.to_owned(),
        date_of_birth: date!(1980 - 05 - 17),
        medical_record_number: format!("MRN-{last_name}"),
        email: None,
        audit: stamp(datetime!(2025-02-01 8:00 UTC).replace_day(day).unwrap()),
    }
}

fn booking(id: &str, org: &str, location: &str, technician: Option<&str>) -> Booking {
    let at = datetime!(2025-03-10 9:00 UTC);
    Booking {
        id: uuid(id),
        organization_id: uuid(org),
        appointment_id: Uuid::new_v4(),
        patient_id: uuid(PATIENT_A1),
        procedure_location_id: uuid(location),
        assigned_technician_id: technician.map(uuid),
        scheduled_at: at,
        status: BookingStatus::Scheduled,
        audit: stamp(at),
    }
}

fn interpretation(id: &str, doctor: Option<&str>, status: InterpretationStatus) -> Interpretation {
    Interpretation {
        id: uuid(id),
        organization_id: uuid(ORG_A),
        booking_id: uuid(BOOKING_MINE),
        patient_id: uuid(PATIENT_A1),
        assigned_interpreting_doctor_id: doctor.map(uuid),
        status,
        findings: None,
        audit: stamp(datetime!(2025-03-11 9:00 UTC)),
    }
}

fn doctor(id: &str, org: &str, is_active: bool) -> InterpretingDoctor {
    InterpretingDoctor {
        id: uuid(id),
        organization_id: uuid(org),
        first_name: "Rhea".to_owned(),
        last_name: "Holter".to_owned(),
        email: format!("{id}@clinic.example"),
        specialty: Some("cardiology".to_owned()),
        is_active,
        audit: stamp(datetime!(2024-06-01 0:00 UTC)),
    }
}

struct Fixture {
    services: AppServices,
    bookings: Arc<InMemoryRepository<Booking>>,
}

fn fixture() -> Fixture {
    let mut deleted = patient(PATIENT_A_DELETED, ORG_A, "Gone", 3);
    deleted.audit.deleted_at = Some(datetime!(2025-02-20 0:00 UTC));

    let bookings = Arc::new(InMemoryRepository::with_rows([
        booking(BOOKING_MINE, ORG_A, LOC_1, Some(TECH)),
        booking(BOOKING_THEIRS, ORG_A, LOC_2, Some(TECH_OTHER)),
        booking(BOOKING_ORG_B, ORG_B, LOC_1, Some(TECH)),
    ]));

    let repos = Repositories {
        organizations: Arc::new(InMemoryRepository::with_rows([
            organization(ADMIN_ORG, "Platform", OrganizationType::Admin),
            organization(ORG_A, "Clinic A", OrganizationType::Client),
            organization(ORG_B, "Clinic B", OrganizationType::Client),
        ])),
        patients: Arc::new(InMemoryRepository::with_rows([
            patient(PATIENT_A1, ORG_A, "Avery", 1),
            patient(PATIENT_A2, ORG_A, "Blake", 2),
            deleted,
            patient(PATIENT_B1, ORG_B, "Casey", 4),
            patient(PATIENT_B2, ORG_B, "Drew", 5),
        ])),
        bookings: bookings.clone(),
        interpretations: Arc::new(InMemoryRepository::with_rows([
            interpretation(READING_ASSIGNED, Some(DOC), InterpretationStatus::Assigned),
            interpretation(READING_PENDING, None, InterpretationStatus::Pending),
        ])),
        interpreting_doctors: Arc::new(InMemoryRepository::with_rows([
            doctor(DOC, ORG_A, true),
            doctor(DOC_OTHER, ORG_A, false),
            doctor(DOC_B, ORG_B, true),
        ])),
        ..Repositories::in_memory()
    };

    let engine = AccessControlEngine::from_config(&AccessControlConfig::default()).unwrap();
    let registry = ListQueryRegistry::builtin(&SchedulingConfig::default()).unwrap();
    let services = AppServices::new(&repos, Arc::new(engine), &registry).unwrap();
    Fixture { services, bookings }
}

fn principal(role: RoleId, user: &str, org: &str) -> Principal {
    Principal::builder()
        .user_id(uuid(user))
        .role(role)
        .organization_id(uuid(org))
        .build()
        .unwrap()
}

fn client_admin() -> Principal {
    principal(RoleId::ClientAdmin, STAFF, ORG_A)
}

fn platform(role: RoleId) -> Principal {
    Principal::builder()
        .user_id(uuid(STAFF))
        .role(role)
        .organization_id(uuid(ADMIN_ORG))
        .organization_type(OrganizationType::Admin)
        .build()
        .unwrap()
}

fn agent_for(orgs: &[&str]) -> Principal {
    Principal::builder()
        .user_id(uuid(STAFF))
        .role(RoleId::FiveAmAgent)
        .organization_id(uuid(ADMIN_ORG))
        .organization_type(OrganizationType::Admin)
        .agent_assigned_org_ids(orgs.iter().map(|o| uuid(o)).collect())
        .build()
        .unwrap()
}

fn front_desk_at(locations: &[&str]) -> Principal {
    Principal::builder()
        .user_id(uuid(STAFF))
        .role(RoleId::FrontDesk)
        .organization_id(uuid(ORG_A))
        .assigned_location_ids(locations.iter().map(|l| uuid(l)).collect())
        .build()
        .unwrap()
}

fn denied_with(err: &DomainError) -> DenyReason {
    err.deny_reason()
        .unwrap_or_else(|| panic!("expected a denial, got {err:?}"))
}

// ── Lists ───────────────────────────────────────────────────────────

#[tokio::test]
async fn patient_list_is_scoped_to_own_organization_and_hides_deleted() {
    let f = fixture();
    let page = f
        .services
        .lists
        .patients
        .list(&client_admin(), &ListQueryParams::new())
        .await
        .unwrap();

    assert!(page.success);
    assert_eq!(page.pagination.total_count, 2);
    assert_eq!(page.pagination.total_pages, 1);
    let names: Vec<_> = page.data.iter().map(|p| p.last_name.as_str()).collect();
    assert_eq!(names, vec!["Blake", "Avery"]);
}

#[tokio::test]
async fn agent_sees_assigned_organizations_only() {
    let f = fixture();
    let lists = &f.services.lists;

    let both = lists
        .patients
        .list(&agent_for(&[ORG_A, ORG_B]), &ListQueryParams::new())
        .await
        .unwrap();
    assert_eq!(both.pagination.total_count, 4);

    let none = lists
        .patients
        .list(&agent_for(&[]), &ListQueryParams::new())
        .await
        .unwrap();
    assert_eq!(none.pagination.total_count, 0);
    assert!(none.data.is_empty());
}

#[tokio::test]
async fn include_deleted_is_honoured_for_unrestricted_roles_only() {
    let f = fixture();
    let params = ListQueryParams::new().filter("includeDeleted", "true");

    let admin = f
        .services
        .lists
        .patients
        .list(&platform(RoleId::SystemAdmin), &params)
        .await
        .unwrap();
    assert_eq!(admin.pagination.total_count, 5);

    let clinic = f
        .services
        .lists
        .patients
        .list(&client_admin(), &params)
        .await
        .unwrap();
    assert_eq!(clinic.pagination.total_count, 2);
}

#[tokio::test]
async fn technician_lists_only_assigned_bookings_in_own_organization() {
    let f = fixture();
    let page = f
        .services
        .lists
        .bookings
        .list(&principal(RoleId::Technician, TECH, ORG_A), &ListQueryParams::new())
        .await
        .unwrap();

    let ids: Vec<_> = page.data.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![uuid(BOOKING_MINE)]);
}

#[tokio::test]
async fn front_desk_lists_bookings_at_assigned_locations() {
    let f = fixture();
    let lists = &f.services.lists;

    let scoped = lists
        .bookings
        .list(&front_desk_at(&[LOC_2]), &ListQueryParams::new())
        .await
        .unwrap();
    let ids: Vec<_> = scoped.data.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![uuid(BOOKING_THEIRS)]);

    let unrestricted = lists
        .bookings
        .list(&front_desk_at(&[]), &ListQueryParams::new())
        .await
        .unwrap();
    assert_eq!(unrestricted.pagination.total_count, 2);
}

#[tokio::test]
async fn listing_without_grant_is_denied() {
    let f = fixture();
    let err = f
        .services
        .lists
        .members
        .list(
            &principal(RoleId::InterpretingDoctor, DOC, ORG_A),
            &ListQueryParams::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::InsufficientRolePermissions);
    assert_eq!(
        err.user_message(),
        "you do not have permission to perform this action"
    );
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_metadata() {
    let f = fixture();
    let page = f
        .services
        .lists
        .patients
        .list(&client_admin(), &ListQueryParams::new().page(5).page_size(10))
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.page, 5);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(!page.pagination.has_next_page);
    assert!(page.pagination.has_previous_page);
}

#[tokio::test]
async fn get_checks_the_stored_row() {
    let f = fixture();
    let patients = &f.services.lists.patients;

    let own = patients.get(&client_admin(), uuid(PATIENT_A1)).await.unwrap();
    assert_eq!(own.last_name, "Avery");

    let hidden = patients
        .get(&client_admin(), uuid(PATIENT_B1))
        .await
        .unwrap_err();
    let absent = patients
        .get(&client_admin(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(hidden, DomainError::NotFound { .. }));
    assert!(matches!(absent, DomainError::NotFound { .. }));
    assert_eq!(hidden.user_message(), absent.user_message());

    let err = patients
        .get(&client_admin(), uuid(PATIENT_A_DELETED))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

// ── Bookings ────────────────────────────────────────────────────────

#[tokio::test]
#[traced_test]
async fn assigned_technician_runs_the_procedure_day() {
    let f = fixture();
    let tech = principal(RoleId::Technician, TECH, ORG_A);
    let id = uuid(BOOKING_MINE);
    let bookings = &f.services.bookings;

    let b = bookings.check_in_patient(&tech, id).await.unwrap();
    assert_eq!(b.status, BookingStatus::CheckedIn);
    let b = bookings.start_procedure(&tech, id).await.unwrap();
    assert_eq!(b.status, BookingStatus::InProgress);
    let b = bookings.complete_procedure(&tech, id).await.unwrap();
    assert_eq!(b.status, BookingStatus::Completed);
    assert_eq!(b.audit.updated_by, Some(uuid(TECH)));

    let stored = f.bookings.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Completed);
    assert!(logs_contain("booking status changed"));
}

#[tokio::test]
async fn technician_cannot_touch_unassigned_booking() {
    let f = fixture();
    let tech = principal(RoleId::Technician, TECH, ORG_A);
    let err = f
        .services
        .bookings
        .check_in_patient(&tech, uuid(BOOKING_THEIRS))
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::NotAssigned);

    let err = f
        .services
        .bookings
        .check_in_patient(&tech, uuid(BOOKING_ORG_B))
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::OrganizationAccessDenied);
}

#[tokio::test]
async fn front_desk_checks_in_at_assigned_locations_only() {
    let f = fixture();
    let desk = front_desk_at(&[LOC_2]);
    let bookings = &f.services.bookings;

    let err = bookings
        .check_in_patient(&desk, uuid(BOOKING_MINE))
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::LocationAccessDenied);

    let b = bookings
        .check_in_patient(&desk, uuid(BOOKING_THEIRS))
        .await
        .unwrap();
    assert_eq!(b.status, BookingStatus::CheckedIn);

    let err = bookings
        .start_procedure(&desk, uuid(BOOKING_THEIRS))
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::InsufficientRolePermissions);
}

#[tokio::test]
async fn illegal_booking_move_is_rejected_and_not_saved() {
    let f = fixture();
    let tech = principal(RoleId::Technician, TECH, ORG_A);
    let err = f
        .services
        .bookings
        .start_procedure(&tech, uuid(BOOKING_MINE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::InvalidTransition {
            from: "scheduled",
            to: "in_progress",
            ..
        }
    ));
    let stored = f.bookings.get(uuid(BOOKING_MINE)).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Scheduled);
}

// ── Organizations ───────────────────────────────────────────────────

#[tokio::test]
async fn absent_is_active_preserves_current_value() {
    let f = fixture();
    let patch = OrganizationPatch {
        name: Some("  Clinic A North ".to_owned()),
        is_active: None,
    };
    let org = f
        .services
        .organizations
        .update_organization(&client_admin(), uuid(ORG_A), patch)
        .await
        .unwrap();
    assert_eq!(org.name, "Clinic A North");
    assert!(org.is_active);
    assert_eq!(org.audit.updated_by, Some(uuid(STAFF)));
}

#[tokio::test]
async fn client_organization_can_be_deactivated() {
    let f = fixture();
    let patch = OrganizationPatch {
        name: None,
        is_active: Some(false),
    };
    let org = f
        .services
        .organizations
        .update_organization(&platform(RoleId::FiveAmAdmin), uuid(ORG_A), patch)
        .await
        .unwrap();
    assert!(!org.is_active);
    assert_eq!(org.name, "Clinic A");
}

#[tokio::test]
async fn platform_organization_cannot_be_deactivated() {
    let f = fixture();
    let patch = OrganizationPatch {
        name: None,
        is_active: Some(false),
    };
    let err = f
        .services
        .organizations
        .update_organization(&platform(RoleId::SystemAdmin), uuid(ADMIN_ORG), patch)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "is_active"));
}

#[tokio::test]
async fn organization_edit_is_gated() {
    let f = fixture();
    let orgs = &f.services.organizations;

    let err = orgs
        .update_organization(&client_admin(), uuid(ORG_B), OrganizationPatch::default())
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::OrganizationAccessDenied);

    let err = orgs
        .update_organization(&front_desk_at(&[]), uuid(ORG_A), OrganizationPatch::default())
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::InsufficientRolePermissions);

    let blank = OrganizationPatch {
        name: Some("   ".to_owned()),
        is_active: None,
    };
    let err = orgs
        .update_organization(&client_admin(), uuid(ORG_A), blank)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
}

// ── Interpretations ─────────────────────────────────────────────────

#[tokio::test]
async fn agent_assigns_an_active_doctor_of_the_same_organization() {
    let f = fixture();
    let agent = agent_for(&[ORG_A]);
    let interpretations = &f.services.interpretations;

    let i = interpretations
        .assign_interpretation(&agent, uuid(READING_PENDING), uuid(DOC))
        .await
        .unwrap();
    assert_eq!(i.status, InterpretationStatus::Assigned);
    assert_eq!(i.assigned_interpreting_doctor_id, Some(uuid(DOC)));

    for doctor in [DOC_B, DOC_OTHER, TECH] {
        let err = interpretations
            .assign_interpretation(&agent, uuid(READING_PENDING), uuid(doctor))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }), "{doctor}");
    }
}

#[tokio::test]
async fn client_admin_cannot_assign_interpretations() {
    let f = fixture();
    let err = f
        .services
        .interpretations
        .assign_interpretation(&client_admin(), uuid(READING_PENDING), uuid(DOC))
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::InsufficientRolePermissions);
}

#[tokio::test]
async fn assigned_doctor_completes_with_findings() {
    let f = fixture();
    let interpretations = &f.services.interpretations;

    let err = interpretations
        .complete_interpretation(
            &principal(RoleId::InterpretingDoctor, DOC_OTHER, ORG_A),
            uuid(READING_ASSIGNED),
            "sinus rhythm".to_owned(),
        )
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::NotAssigned);

    let doc = principal(RoleId::InterpretingDoctor, DOC, ORG_A);
    let err = interpretations
        .complete_interpretation(&doc, uuid(READING_ASSIGNED), " ".to_owned())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let i = interpretations
        .complete_interpretation(&doc, uuid(READING_ASSIGNED), "sinus rhythm".to_owned())
        .await
        .unwrap();
    assert_eq!(i.status, InterpretationStatus::Completed);
    assert_eq!(i.findings.as_deref(), Some("sinus rhythm"));
}

#[tokio::test]
async fn assigned_doctor_starts_then_completes_reading() {
    let f = fixture();
    let interpretations = &f.services.interpretations;

    let err = interpretations
        .start_interpretation(
            &principal(RoleId::InterpretingDoctor, DOC_OTHER, ORG_A),
            uuid(READING_ASSIGNED),
        )
        .await
        .unwrap_err();
    assert_eq!(denied_with(&err), DenyReason::NotAssigned);

    let doc = principal(RoleId::InterpretingDoctor, DOC, ORG_A);
    let started = interpretations
        .start_interpretation(&doc, uuid(READING_ASSIGNED))
        .await
        .unwrap();
    assert_eq!(started.status, InterpretationStatus::InProgress);
    assert_eq!(started.audit.updated_by, Some(uuid(DOC)));

    let err = interpretations
        .start_interpretation(&doc, uuid(READING_ASSIGNED))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));

    let done = interpretations
        .complete_interpretation(&doc, uuid(READING_ASSIGNED), "normal".to_owned())
        .await
        .unwrap();
    assert_eq!(done.status, InterpretationStatus::Completed);
}

#[tokio::test]
async fn pending_interpretation_cannot_be_started() {
    let f = fixture();
    let err = f
        .services
        .interpretations
        .start_interpretation(&platform(RoleId::FiveAmAdmin), uuid(READING_PENDING))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
}

#[tokio::test]
async fn pending_interpretation_cannot_be_completed() {
    let f = fixture();
    let err = f
        .services
        .interpretations
        .complete_interpretation(
            &platform(RoleId::FiveAmAdmin),
            uuid(READING_PENDING),
            "n/a".to_owned(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
}

// ── Patient export ──────────────────────────────────────────────────

#[tokio::test]
async fn export_requires_export_phi() {
    let f = fixture();
    let patients = &f.services.patients;

    for p in [
        principal(RoleId::Technician, TECH, ORG_A),
        front_desk_at(&[]),
    ] {
        let err = patients
            .export_patients(&p, &ListQueryParams::new())
            .await
            .unwrap_err();
        assert_eq!(denied_with(&err), DenyReason::InsufficientRolePermissions);
    }

    let rows = patients
        .export_patients(&client_admin(), &ListQueryParams::new().page(9).page_size(1))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|p| p.organization_id == uuid(ORG_A)));
}
