//! The static `role -> resource -> actions` table.

use std::collections::{BTreeSet, HashMap};

use access_control_sdk::{AccessControlError, Action, Resource};
use carepath_security::RoleId;

use crate::config::PermissionMatrixConfig;

use Action as A;
use Resource as R;

static NO_ACTIONS: BTreeSet<Action> = BTreeSet::new();

type Grants<'a> = &'a [(Resource, &'a [Action])];

const CRUD: &[Action] = &[A::View, A::Create, A::Edit, A::Delete];
const PATIENT_ALL: &[Action] = &[
    A::View,
    A::Create,
    A::Edit,
    A::Delete,
    A::ViewPhi,
    A::EditPhi,
    A::ExportPhi,
];
const PATIENT_CARE: &[Action] = &[A::View, A::Create, A::Edit, A::ViewPhi, A::EditPhi];
const APPOINTMENT_ALL: &[Action] = &[
    A::View,
    A::Create,
    A::Edit,
    A::Delete,
    A::Cancel,
    A::ScheduleAppointment,
];
const APPOINTMENT_DESK: &[Action] = &[
    A::View,
    A::Create,
    A::Edit,
    A::Cancel,
    A::ScheduleAppointment,
];
const BOOKING_DESK: &[Action] = &[A::View, A::Create, A::Edit, A::Cancel, A::CheckInPatient];
const DEVICE_ALL: &[Action] = &[
    A::View,
    A::Create,
    A::Edit,
    A::Delete,
    A::AssignDevice,
    A::TrackDevice,
    A::MaintainDevice,
];
const DEVICE_DESK: &[Action] = &[A::View, A::AssignDevice, A::TrackDevice];
const MEMBER_ALL: &[Action] = &[A::View, A::Create, A::Update, A::Delete];
const INVITATION_ALL: &[Action] = &[A::View, A::Create, A::Cancel];

const FIVE_AM_ADMIN: Grants<'static> = &[
    (R::Patient, PATIENT_ALL),
    (R::Appointment, APPOINTMENT_ALL),
    (
        R::Booking,
        &[
            A::View,
            A::Create,
            A::Edit,
            A::Delete,
            A::Cancel,
            A::CheckInPatient,
            A::StartProcedure,
            A::CompleteProcedure,
        ],
    ),
    (
        R::Interpretation,
        &[
            A::View,
            A::Create,
            A::Edit,
            A::Delete,
            A::AssignInterpretation,
            A::CompleteInterpretation,
        ],
    ),
    (R::HolterAssignment, CRUD),
    (R::HolterDevice, DEVICE_ALL),
    (R::InterpretingDoctor, CRUD),
    (R::ReferringDoctor, CRUD),
    (R::ReferringEntity, CRUD),
    (R::ProcedureLocation, CRUD),
    (R::Technician, CRUD),
    (R::AuditLogs, &[A::ViewAuditLogs, A::ExportAuditLogs]),
    (R::Organization, CRUD),
    (R::Member, MEMBER_ALL),
    (R::Invitation, INVITATION_ALL),
    (
        R::User,
        &[A::View, A::List, A::Create, A::Update, A::SetPassword, A::Ban],
    ),
    (R::Session, &[A::List, A::Revoke]),
];

const FIVE_AM_AGENT: Grants<'static> = &[
    (R::Patient, PATIENT_CARE),
    (R::Appointment, APPOINTMENT_DESK),
    (R::Booking, BOOKING_DESK),
    (R::Interpretation, &[A::View, A::AssignInterpretation]),
    (R::HolterAssignment, &[A::View, A::Create, A::Edit]),
    (R::HolterDevice, DEVICE_DESK),
    (R::InterpretingDoctor, &[A::View]),
    (R::ReferringDoctor, &[A::View, A::Create, A::Edit]),
    (R::ReferringEntity, &[A::View, A::Create, A::Edit]),
    (R::ProcedureLocation, &[A::View]),
    (R::Technician, &[A::View]),
    (R::Organization, &[A::View]),
    (R::Member, &[A::View]),
];

const CLIENT_ADMIN: Grants<'static> = &[
    (R::Patient, PATIENT_ALL),
    (R::Appointment, APPOINTMENT_ALL),
    (
        R::Booking,
        &[A::View, A::Create, A::Edit, A::Delete, A::Cancel, A::CheckInPatient],
    ),
    (R::Interpretation, &[A::View]),
    (R::HolterAssignment, CRUD),
    (R::HolterDevice, DEVICE_ALL),
    (R::InterpretingDoctor, &[A::View]),
    (R::ReferringDoctor, CRUD),
    (R::ReferringEntity, CRUD),
    (R::ProcedureLocation, CRUD),
    (R::Technician, CRUD),
    (R::AuditLogs, &[A::ViewAuditLogs]),
    (R::Organization, &[A::View, A::Edit]),
    (R::Member, MEMBER_ALL),
    (R::Invitation, INVITATION_ALL),
];

const FRONT_DESK: Grants<'static> = &[
    (R::Patient, PATIENT_CARE),
    (R::Appointment, APPOINTMENT_DESK),
    (R::Booking, BOOKING_DESK),
    (R::HolterAssignment, &[A::View, A::Create]),
    (R::HolterDevice, DEVICE_DESK),
    (R::ReferringDoctor, &[A::View]),
    (R::ReferringEntity, &[A::View]),
    (R::ProcedureLocation, &[A::View]),
    (R::Technician, &[A::View]),
    (R::Organization, &[A::View]),
];

const TECHNICIAN: Grants<'static> = &[
    (R::Patient, &[A::View, A::ViewPhi]),
    (R::Appointment, &[A::View]),
    (
        R::Booking,
        &[A::View, A::CheckInPatient, A::StartProcedure, A::CompleteProcedure],
    ),
    (R::HolterAssignment, &[A::View, A::Create, A::Edit]),
    (
        R::HolterDevice,
        &[A::View, A::AssignDevice, A::TrackDevice, A::MaintainDevice],
    ),
    (R::ProcedureLocation, &[A::View]),
    (R::Organization, &[A::View]),
];

const INTERPRETING_DOCTOR: Grants<'static> = &[
    (R::Patient, &[A::View, A::ViewPhi]),
    (R::Interpretation, &[A::View, A::CompleteInterpretation]),
    (R::Organization, &[A::View]),
];

/// Immutable `role -> resource -> actions` table.
///
/// Complete by construction: every role has an entry for every resource,
/// possibly empty. Anything not listed is denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    grants: HashMap<RoleId, HashMap<Resource, BTreeSet<Action>>>,
}

impl PermissionMatrix {
    /// The platform's default role table.
    ///
    /// `system_admin` holds every action each resource supports.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::Configuration`] if the table grants an
    /// action a resource does not support.
    pub fn builtin() -> Result<Self, AccessControlError> {
        let mut matrix = Self::empty();
        for resource in Resource::ALL {
            matrix.grant(RoleId::SystemAdmin, resource, resource.supported_actions())?;
        }
        for (role, grants) in [
            (RoleId::FiveAmAdmin, FIVE_AM_ADMIN),
            (RoleId::FiveAmAgent, FIVE_AM_AGENT),
            (RoleId::ClientAdmin, CLIENT_ADMIN),
            (RoleId::FrontDesk, FRONT_DESK),
            (RoleId::Technician, TECHNICIAN),
            (RoleId::InterpretingDoctor, INTERPRETING_DOCTOR),
        ] {
            for (resource, actions) in grants {
                matrix.grant(role, *resource, actions)?;
            }
        }
        Ok(matrix)
    }

    /// Build a matrix from names, as found in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AccessControlError::Configuration`] for an unknown role,
    /// resource or action name, or for an action the resource does not support.
    pub fn from_config(config: &PermissionMatrixConfig) -> Result<Self, AccessControlError> {
        let mut matrix = Self::empty();
        for (role_name, resources) in config {
            let role = role_name.parse::<RoleId>().map_err(|e| {
                AccessControlError::Configuration(format!("permission matrix: {e}"))
            })?;
            for (resource_name, action_names) in resources {
                let resource = resource_name.parse::<Resource>().map_err(|e| {
                    AccessControlError::Configuration(format!("permission matrix, {role}: {e}"))
                })?;
                let actions = action_names
                    .iter()
                    .map(|name| {
                        name.parse::<Action>().map_err(|e| {
                            AccessControlError::Configuration(format!(
                                "permission matrix, {role}/{resource}: {e}"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                matrix.grant(role, resource, &actions)?;
            }
        }
        Ok(matrix)
    }

    fn empty() -> Self {
        let grants = RoleId::ALL
            .into_iter()
            .map(|role| {
                let per_resource = Resource::ALL
                    .into_iter()
                    .map(|resource| (resource, BTreeSet::new()))
                    .collect();
                (role, per_resource)
            })
            .collect();
        Self { grants }
    }

    fn grant(
        &mut self,
        role: RoleId,
        resource: Resource,
        actions: &[Action],
    ) -> Result<(), AccessControlError> {
        if let Some(action) = actions.iter().find(|a| !resource.supports(**a)) {
            return Err(AccessControlError::Configuration(format!(
                "permission matrix grants {role} unsupported `{action}` on {resource}"
            )));
        }
        self.grants
            .entry(role)
            .or_default()
            .entry(resource)
            .or_default()
            .extend(actions.iter().copied());
        Ok(())
    }

    /// Actions `role` holds on `resource`. Empty when none.
    #[must_use]
    pub fn actions(&self, role: RoleId, resource: Resource) -> &BTreeSet<Action> {
        self.grants
            .get(&role)
            .and_then(|per_resource| per_resource.get(&resource))
            .unwrap_or(&NO_ACTIONS)
    }

    #[must_use]
    pub fn grants(&self, role: RoleId, resource: Resource, action: Action) -> bool {
        self.actions(role, resource).contains(&action)
    }

    /// Roles holding `action` on `resource`, in [`RoleId::ALL`] order.
    #[must_use]
    pub fn roles_granting(&self, resource: Resource, action: Action) -> Vec<RoleId> {
        RoleId::ALL
            .into_iter()
            .filter(|role| self.grants(*role, resource, action))
            .collect()
    }
}
