//! Resources, actions and decisions for the `access_control` module.
//!
//! [`Resource`] and [`Action`] are closed sets: code that names them directly is
//! checked at compile time. Raw names (route tables, configuration files) are
//! parsed through [`FromStr`] and rejected with [`UnknownName`].

use std::fmt;
use std::str::FromStr;

use carepath_security::{RoleId, properties};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw resource or action name that is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{name}`")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

// ── Resource ────────────────────────────────────────────────────────

/// Category of manageable entity subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Patient,
    Appointment,
    Booking,
    Interpretation,
    HolterAssignment,
    HolterDevice,
    InterpretingDoctor,
    ReferringDoctor,
    ReferringEntity,
    ProcedureLocation,
    Technician,
    AuditLogs,
    Organization,
    Member,
    Invitation,
    User,
    Session,
}

const CRUD: &[Action] = &[Action::View, Action::Create, Action::Edit, Action::Delete];

impl Resource {
    pub const ALL: [Self; 17] = [
        Self::Patient,
        Self::Appointment,
        Self::Booking,
        Self::Interpretation,
        Self::HolterAssignment,
        Self::HolterDevice,
        Self::InterpretingDoctor,
        Self::ReferringDoctor,
        Self::ReferringEntity,
        Self::ProcedureLocation,
        Self::Technician,
        Self::AuditLogs,
        Self::Organization,
        Self::Member,
        Self::Invitation,
        Self::User,
        Self::Session,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Appointment => "appointment",
            Self::Booking => "booking",
            Self::Interpretation => "interpretation",
            Self::HolterAssignment => "holter_assignment",
            Self::HolterDevice => "holter_device",
            Self::InterpretingDoctor => "interpreting_doctor",
            Self::ReferringDoctor => "referring_doctor",
            Self::ReferringEntity => "referring_entity",
            Self::ProcedureLocation => "procedure_location",
            Self::Technician => "technician",
            Self::AuditLogs => "audit_logs",
            Self::Organization => "organization",
            Self::Member => "member",
            Self::Invitation => "invitation",
            Self::User => "user",
            Self::Session => "session",
        }
    }

    /// Actions that are meaningful for this resource.
    ///
    /// A permission matrix may only grant actions from this set.
    #[must_use]
    pub const fn supported_actions(self) -> &'static [Action] {
        match self {
            Self::Patient => &[
                Action::View,
                Action::Create,
                Action::Edit,
                Action::Delete,
                Action::ViewPhi,
                Action::EditPhi,
                Action::ExportPhi,
            ],
            Self::Appointment => &[
                Action::View,
                Action::Create,
                Action::Edit,
                Action::Delete,
                Action::Cancel,
                Action::ScheduleAppointment,
            ],
            Self::Booking => &[
                Action::View,
                Action::Create,
                Action::Edit,
                Action::Delete,
                Action::Cancel,
                Action::CheckInPatient,
                Action::StartProcedure,
                Action::CompleteProcedure,
            ],
            Self::Interpretation => &[
                Action::View,
                Action::Create,
                Action::Edit,
                Action::Delete,
                Action::AssignInterpretation,
                Action::CompleteInterpretation,
            ],
            Self::HolterDevice => &[
                Action::View,
                Action::Create,
                Action::Edit,
                Action::Delete,
                Action::AssignDevice,
                Action::TrackDevice,
                Action::MaintainDevice,
            ],
            Self::HolterAssignment
            | Self::InterpretingDoctor
            | Self::ReferringDoctor
            | Self::ReferringEntity
            | Self::ProcedureLocation
            | Self::Technician
            | Self::Organization => CRUD,
            Self::AuditLogs => &[Action::ViewAuditLogs, Action::ExportAuditLogs],
            Self::Member => &[Action::View, Action::Create, Action::Update, Action::Delete],
            Self::Invitation => &[Action::View, Action::Create, Action::Cancel],
            Self::User => &[
                Action::View,
                Action::List,
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::SetRole,
                Action::SetPassword,
                Action::Ban,
                Action::Impersonate,
            ],
            Self::Session => &[Action::List, Action::Revoke, Action::Delete],
        }
    }

    #[must_use]
    pub fn supports(self, action: Action) -> bool {
        self.supported_actions().contains(&action)
    }

    /// The action that gates listing rows of this resource.
    #[must_use]
    pub const fn list_action(self) -> Action {
        match self {
            Self::AuditLogs => Action::ViewAuditLogs,
            Self::User | Self::Session => Action::List,
            _ => Action::View,
        }
    }

    /// Rows belong to a single organization. Users and sessions are
    /// platform-wide.
    #[must_use]
    pub const fn is_organization_scoped(self) -> bool {
        !matches!(self, Self::User | Self::Session)
    }

    /// Rows are tied to a procedure location.
    #[must_use]
    pub const fn is_location_bound(self) -> bool {
        matches!(
            self,
            Self::Appointment | Self::Booking | Self::ProcedureLocation
        )
    }

    /// Rows carry a per-user assignee: the role limited to its own
    /// assignments, and the scope property naming the assignee.
    #[must_use]
    pub const fn assignee(self) -> Option<(RoleId, &'static str)> {
        match self {
            Self::Booking => Some((RoleId::Technician, properties::ASSIGNED_TECHNICIAN_ID)),
            Self::Interpretation => Some((
                RoleId::InterpretingDoctor,
                properties::ASSIGNED_INTERPRETING_DOCTOR_ID,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "resource",
                name: s.to_owned(),
            })
    }
}

// ── Action ──────────────────────────────────────────────────────────

/// Operation checked against a role's grants for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    List,
    Create,
    Edit,
    Update,
    Delete,
    Cancel,
    Revoke,
    SetPassword,
    #[serde(rename = "set-role")]
    SetRole,
    Ban,
    Impersonate,
    ViewPhi,
    EditPhi,
    ExportPhi,
    ScheduleAppointment,
    CheckInPatient,
    StartProcedure,
    CompleteProcedure,
    AssignDevice,
    TrackDevice,
    MaintainDevice,
    AssignInterpretation,
    CompleteInterpretation,
    ViewAuditLogs,
    ExportAuditLogs,
}

impl Action {
    pub const ALL: [Self; 26] = [
        Self::View,
        Self::List,
        Self::Create,
        Self::Edit,
        Self::Update,
        Self::Delete,
        Self::Cancel,
        Self::Revoke,
        Self::SetPassword,
        Self::SetRole,
        Self::Ban,
        Self::Impersonate,
        Self::ViewPhi,
        Self::EditPhi,
        Self::ExportPhi,
        Self::ScheduleAppointment,
        Self::CheckInPatient,
        Self::StartProcedure,
        Self::CompleteProcedure,
        Self::AssignDevice,
        Self::TrackDevice,
        Self::MaintainDevice,
        Self::AssignInterpretation,
        Self::CompleteInterpretation,
        Self::ViewAuditLogs,
        Self::ExportAuditLogs,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::List => "list",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Cancel => "cancel",
            Self::Revoke => "revoke",
            Self::SetPassword => "set_password",
            Self::SetRole => "set-role",
            Self::Ban => "ban",
            Self::Impersonate => "impersonate",
            Self::ViewPhi => "view_phi",
            Self::EditPhi => "edit_phi",
            Self::ExportPhi => "export_phi",
            Self::ScheduleAppointment => "schedule_appointment",
            Self::CheckInPatient => "check_in_patient",
            Self::StartProcedure => "start_procedure",
            Self::CompleteProcedure => "complete_procedure",
            Self::AssignDevice => "assign_device",
            Self::TrackDevice => "track_device",
            Self::MaintainDevice => "maintain_device",
            Self::AssignInterpretation => "assign_interpretation",
            Self::CompleteInterpretation => "complete_interpretation",
            Self::ViewAuditLogs => "view_audit_logs",
            Self::ExportAuditLogs => "export_audit_logs",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "action",
                name: s.to_owned(),
            })
    }
}

// ── Target ──────────────────────────────────────────────────────────

/// Scope attributes of the resource instance being accessed.
///
/// Callers fill whatever the resource type carries: `organization_id` for
/// organization-scoped resources, `procedure_location_id` for location-bound
/// ones, and the assignee for bookings and interpretations. An attribute a
/// scope rule needs but the target lacks fails that rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTarget {
    pub organization_id: Option<Uuid>,
    pub procedure_location_id: Option<Uuid>,
    pub assigned_technician_id: Option<Uuid>,
    pub assigned_interpreting_doctor_id: Option<Uuid>,
}

impl ResourceTarget {
    #[must_use]
    pub fn in_organization(organization_id: Uuid) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at_location(mut self, procedure_location_id: Option<Uuid>) -> Self {
        self.procedure_location_id = procedure_location_id;
        self
    }

    #[must_use]
    pub fn assigned_technician(mut self, technician_id: Option<Uuid>) -> Self {
        self.assigned_technician_id = technician_id;
        self
    }

    #[must_use]
    pub fn assigned_interpreting_doctor(mut self, doctor_id: Option<Uuid>) -> Self {
        self.assigned_interpreting_doctor_id = doctor_id;
        self
    }

    /// The target's value for a well-known scope property.
    #[must_use]
    pub fn value_of(&self, property: &str) -> Option<Uuid> {
        match property {
            properties::ORGANIZATION_ID => self.organization_id,
            properties::PROCEDURE_LOCATION_ID => self.procedure_location_id,
            properties::ASSIGNED_TECHNICIAN_ID => self.assigned_technician_id,
            properties::ASSIGNED_INTERPRETING_DOCTOR_ID => self.assigned_interpreting_doctor_id,
            _ => None,
        }
    }
}

// ── Decision ────────────────────────────────────────────────────────

/// Why a check was denied.
///
/// Kept for logs and audits. The user-facing message never distinguishes
/// between reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UnknownRole,
    UnknownResourceOrAction,
    InsufficientRolePermissions,
    OrganizationAccessDenied,
    LocationAccessDenied,
    NotAssigned,
}

impl DenyReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownRole => "unknown role",
            Self::UnknownResourceOrAction => "unknown resource/action",
            Self::InsufficientRolePermissions => "insufficient role permissions",
            Self::OrganizationAccessDenied => "organization access denied",
            Self::LocationAccessDenied => "location access denied",
            Self::NotAssigned => "not assigned to this item",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    #[must_use]
    pub const fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}
