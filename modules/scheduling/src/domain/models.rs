//! Domain entities.
//!
//! Every entity carries an [`AuditStamp`] (creation / update actors and a
//! soft-delete timestamp) and exposes its fields by list-spec name through
//! [`Record`], so plans built by `carepath_listing` can be evaluated against it.

use access_control_sdk::{Resource, ResourceTarget};
use carepath_listing::eval::{FieldValue, Record};
use carepath_security::{OrganizationType, RoleId};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// The nine entity kinds that expose admin lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organizations,
    Members,
    Users,
    Technicians,
    InterpretingDoctors,
    Patients,
    Appointments,
    Bookings,
    Interpretations,
}

impl EntityKind {
    pub const ALL: [Self; 9] = [
        Self::Organizations,
        Self::Members,
        Self::Users,
        Self::Technicians,
        Self::InterpretingDoctors,
        Self::Patients,
        Self::Appointments,
        Self::Bookings,
        Self::Interpretations,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizations => "organizations",
            Self::Members => "members",
            Self::Users => "users",
            Self::Technicians => "technicians",
            Self::InterpretingDoctors => "interpreting_doctors",
            Self::Patients => "patients",
            Self::Appointments => "appointments",
            Self::Bookings => "bookings",
            Self::Interpretations => "interpretations",
        }
    }

    /// The access-control resource guarding this entity.
    #[must_use]
    pub const fn resource(self) -> Resource {
        match self {
            Self::Organizations => Resource::Organization,
            Self::Members => Resource::Member,
            Self::Users => Resource::User,
            Self::Technicians => Resource::Technician,
            Self::InterpretingDoctors => Resource::InterpretingDoctor,
            Self::Patients => Resource::Patient,
            Self::Appointments => Resource::Appointment,
            Self::Bookings => Resource::Booking,
            Self::Interpretations => Resource::Interpretation,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behaviour of stored entities.
pub trait Entity: Record + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    fn audit(&self) -> &AuditStamp;

    /// Scope attributes for single-instance access checks. `None` for
    /// platform-wide entities, which are checked at type level only.
    fn target(&self) -> Option<ResourceTarget>;
}

/// Creation, update and soft-delete bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

impl AuditStamp {
    #[must_use]
    pub fn new(actor: Option<Uuid>, at: OffsetDateTime) -> Self {
        Self {
            created_at: at,
            updated_at: at,
            created_by: actor,
            updated_by: actor,
            deleted_at: None,
        }
    }

    /// Record an update by `actor`.
    pub fn touch(&mut self, actor: Uuid, at: OffsetDateTime) {
        self.updated_at = at;
        self.updated_by = Some(actor);
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn field(&self, field: &str) -> FieldValue {
        match field {
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            "createdBy" => self.created_by.into(),
            "updatedBy" => self.updated_by.into(),
            "deletedAt" => self.deleted_at.into(),
            _ => FieldValue::Null,
        }
    }
}

// ── Organizations and people ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub organization_type: OrganizationType,
    pub is_active: bool,
    pub audit: AuditStamp,
}

/// Partial update for an organization. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Membership of a user in an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: RoleId,
    pub audit: AuditStamp,
}

/// Platform login account. Not owned by any organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub banned: bool,
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretingDoctor {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub is_active: bool,
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub medical_record_number: String,
    pub email: Option<String>,
    pub audit: AuditStamp,
}

// ── Workflow ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    NoShow,
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [Self; 5] = [
        Self::Scheduled,
        Self::Confirmed,
        Self::Cancelled,
        Self::NoShow,
        Self::Completed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Scheduled,
                Self::Confirmed | Self::Cancelled | Self::NoShow
            ) | (
                Self::Confirmed,
                Self::Completed | Self::Cancelled | Self::NoShow
            )
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [Self; 5] = [
        Self::Scheduled,
        Self::CheckedIn,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::CheckedIn => "checked_in",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Legal lifecycle moves: `scheduled -> checked_in -> in_progress ->
    /// completed`, with cancellation allowed until the procedure starts.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::CheckedIn | Self::Cancelled)
                | (Self::CheckedIn, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Completed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
}

impl InterpretationStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Legal lifecycle moves. Reassignment keeps the status at `assigned`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending | Self::Assigned, Self::Assigned)
                | (Self::Assigned, Self::InProgress | Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub patient_id: Uuid,
    pub procedure_location_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub status: AppointmentStatus,
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub procedure_location_id: Uuid,
    pub assigned_technician_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub status: BookingStatus,
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub booking_id: Uuid,
    pub patient_id: Uuid,
    pub assigned_interpreting_doctor_id: Option<Uuid>,
    pub status: InterpretationStatus,
    pub findings: Option<String>,
    pub audit: AuditStamp,
}

// ── Record / Entity impls ───────────────────────────────────────────

macro_rules! impl_entity {
    ($ty:ty, $kind:expr, |$this:ident| $target:expr) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> Uuid {
                self.id
            }

            fn audit(&self) -> &AuditStamp {
                &self.audit
            }

            fn target(&self) -> Option<ResourceTarget> {
                let $this = self;
                $target
            }
        }
    };
}

impl_entity!(Organization, EntityKind::Organizations, |o| Some(
    ResourceTarget::in_organization(o.id)
));
impl_entity!(Member, EntityKind::Members, |m| Some(
    ResourceTarget::in_organization(m.organization_id)
));
impl_entity!(User, EntityKind::Users, |_u| None);
impl_entity!(Technician, EntityKind::Technicians, |t| Some(
    ResourceTarget::in_organization(t.organization_id)
));
impl_entity!(InterpretingDoctor, EntityKind::InterpretingDoctors, |d| Some(
    ResourceTarget::in_organization(d.organization_id)
));
impl_entity!(Patient, EntityKind::Patients, |p| Some(
    ResourceTarget::in_organization(p.organization_id)
));
impl_entity!(Appointment, EntityKind::Appointments, |a| Some(
    ResourceTarget::in_organization(a.organization_id).at_location(Some(a.procedure_location_id))
));
impl_entity!(Booking, EntityKind::Bookings, |b| Some(
    ResourceTarget::in_organization(b.organization_id)
        .at_location(Some(b.procedure_location_id))
        .assigned_technician(b.assigned_technician_id)
));
impl_entity!(Interpretation, EntityKind::Interpretations, |i| Some(
    ResourceTarget::in_organization(i.organization_id)
        .assigned_interpreting_doctor(i.assigned_interpreting_doctor_id)
));

impl Record for Organization {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "type" => self.organization_type.as_str().into(),
            "isActive" => self.is_active.into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for Member {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "userId" => self.user_id.into(),
            "displayName" => self.display_name.as_str().into(),
            "email" => self.email.as_str().into(),
            "role" => self.role.as_str().into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for User {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "banned" => self.banned.into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for Technician {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "firstName" => self.first_name.as_str().into(),
            "lastName" => self.last_name.as_str().into(),
            "email" => self.email.as_str().into(),
            "isActive" => self.is_active.into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for InterpretingDoctor {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "firstName" => self.first_name.as_str().into(),
            "lastName" => self.last_name.as_str().into(),
            "email" => self.email.as_str().into(),
            "specialty" => self.specialty.as_deref().into(),
            "isActive" => self.is_active.into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for Patient {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "firstName" => self.first_name.as_str().into(),
            "lastName" => self.last_name.as_str().into(),
            "dateOfBirth" => FieldValue::Date(self.date_of_birth),
            "medicalRecordNumber" => self.medical_record_number.as_str().into(),
            "email" => self.email.as_deref().into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for Appointment {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "patientId" => self.patient_id.into(),
            "procedureLocationId" => self.procedure_location_id.into(),
            "scheduledAt" => self.scheduled_at.into(),
            "status" => self.status.as_str().into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for Booking {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "appointmentId" => self.appointment_id.into(),
            "patientId" => self.patient_id.into(),
            "procedureLocationId" => self.procedure_location_id.into(),
            "assignedTechnicianId" => self.assigned_technician_id.into(),
            "scheduledAt" => self.scheduled_at.into(),
            "status" => self.status.as_str().into(),
            other => self.audit.field(other),
        }
    }
}

impl Record for Interpretation {
    fn field(&self, field: &str) -> FieldValue {
        match field {
            "id" => self.id.into(),
            "organizationId" => self.organization_id.into(),
            "bookingId" => self.booking_id.into(),
            "patientId" => self.patient_id.into(),
            "assignedInterpretingDoctorId" => self.assigned_interpreting_doctor_id.into(),
            "status" => self.status.as_str().into(),
            "findings" => self.findings.as_deref().into(),
            other => self.audit.field(other),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn booking_lifecycle() {
        use BookingStatus::{Cancelled, CheckedIn, Completed, InProgress, Scheduled};

        assert!(Scheduled.can_transition_to(CheckedIn));
        assert!(CheckedIn.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Cancelled));

        assert!(!Scheduled.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Scheduled));
        for next in BookingStatus::ALL {
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn interpretation_lifecycle() {
        use InterpretationStatus::{Assigned, Completed, InProgress, Pending};

        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Assigned));
        for next in InterpretationStatus::ALL {
            assert!(!Completed.can_transition_to(next));
        }
    }

    #[test]
    fn appointment_terminal_states_are_final() {
        for terminal in [
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
            AppointmentStatus::Completed,
        ] {
            for next in AppointmentStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Confirmed));
    }

    #[test]
    fn every_kind_maps_to_a_distinct_resource() {
        let mut resources: Vec<Resource> =
            EntityKind::ALL.into_iter().map(EntityKind::resource).collect();
        resources.sort();
        resources.dedup();
        assert_eq!(resources.len(), EntityKind::ALL.len());
    }

    #[test]
    fn booking_target_carries_location_and_technician() {
        let org = Uuid::new_v4();
        let location = Uuid::new_v4();
        let tech = Uuid::new_v4();
        let at = datetime!(2025-03-01 09:00 UTC);
        let booking = Booking {
            id: Uuid::new_v4(),
            organization_id: org,
            appointment_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            procedure_location_id: location,
            assigned_technician_id: Some(tech),
            scheduled_at: at,
            status: BookingStatus::Scheduled,
            audit: AuditStamp::new(None, at),
        };

        let target = booking.target().unwrap();
        assert_eq!(target.organization_id, Some(org));
        assert_eq!(target.procedure_location_id, Some(location));
        assert_eq!(target.assigned_technician_id, Some(tech));
        assert_eq!(booking.field("status"), FieldValue::Text("scheduled".to_owned()));
        assert_eq!(booking.field("deletedAt"), FieldValue::Null);
    }

    #[test]
    fn patient_fields_by_name() {
        let at = datetime!(2025-01-10 12:00 UTC);
        let patient = Patient {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            date_of_birth: date!(1990 - 12 - 10),
            medical_record_number: "MRN-1".to_owned(),
            email: None,
            audit: AuditStamp::new(None, at),
        };
        assert_eq!(patient.field("lastName"), FieldValue::Text("Lovelace".to_owned()));
        assert_eq!(patient.field("dateOfBirth"), FieldValue::Date(date!(1990 - 12 - 10)));
        assert_eq!(patient.field("email"), FieldValue::Null);
        assert_eq!(patient.field("createdAt"), FieldValue::DateTime(at));
        assert_eq!(patient.field("nope"), FieldValue::Null);
    }

    #[test]
    fn users_are_checked_at_type_level() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ops".to_owned(),
            email: "ops@example.com".to_owned(),
            banned: false,
            audit: AuditStamp::new(None, OffsetDateTime::UNIX_EPOCH),
        };
        assert!(user.target().is_none());
    }
}
