//! Named yes/no questions asked without a resource instance.
//!
//! Call sites use these to decide whether to offer an operation at all. Each
//! one reads the same matrix as [`AccessControlEngine::check`], so the two can
//! never disagree.

use access_control_sdk::{Action, Resource};
use carepath_security::Principal;

use crate::domain::engine::AccessControlEngine;

impl AccessControlEngine {
    fn role_grants(&self, principal: &Principal, resource: Resource, action: Action) -> bool {
        principal
            .role()
            .is_some_and(|role| self.matrix().grants(role, resource, action))
    }

    /// May invite, update and remove organization members.
    #[must_use]
    pub fn can_manage_members(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::Member, Action::Create)
            && self.role_grants(principal, Resource::Member, Action::Delete)
    }

    #[must_use]
    pub fn can_view_phi(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::Patient, Action::ViewPhi)
    }

    #[must_use]
    pub fn can_export_phi(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::Patient, Action::ExportPhi)
    }

    #[must_use]
    pub fn can_schedule_appointments(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::Appointment, Action::ScheduleAppointment)
    }

    /// May service Holter devices (maintenance, not just assignment).
    #[must_use]
    pub fn can_manage_devices(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::HolterDevice, Action::MaintainDevice)
    }

    #[must_use]
    pub fn can_assign_interpretations(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::Interpretation, Action::AssignInterpretation)
    }

    #[must_use]
    pub fn can_view_audit_logs(&self, principal: &Principal) -> bool {
        self.role_grants(principal, Resource::AuditLogs, Action::ViewAuditLogs)
    }
}
