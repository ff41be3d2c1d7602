//! The acting identity for a request.
//!
//! A [`Principal`] is reconstructed per request by the authentication
//! collaborator (session + membership lookup) and passed explicitly into every
//! access check. Nothing in this crate reads ambient request state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    SystemAdmin,
    FiveAmAdmin,
    FiveAmAgent,
    ClientAdmin,
    FrontDesk,
    Technician,
    InterpretingDoctor,
}

impl RoleId {
    /// Every role, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::SystemAdmin,
        Self::FiveAmAdmin,
        Self::FiveAmAgent,
        Self::ClientAdmin,
        Self::FrontDesk,
        Self::Technician,
        Self::InterpretingDoctor,
    ];

    /// Wire name of the role, as stored in sessions and membership rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::FiveAmAdmin => "five_am_admin",
            Self::FiveAmAgent => "five_am_agent",
            Self::ClientAdmin => "client_admin",
            Self::FrontDesk => "front_desk",
            Self::Technician => "technician",
            Self::InterpretingDoctor => "interpreting_doctor",
        }
    }

    /// Roles that see every organization without restriction.
    #[must_use]
    pub const fn is_unrestricted(self) -> bool {
        matches!(self, Self::SystemAdmin | Self::FiveAmAdmin)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleId {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| PrincipalError::UnknownRole(s.to_owned()))
    }
}

/// Kind of organization the principal acts within.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    /// The platform operator's own organization.
    Admin,
    /// A customer clinic.
    #[default]
    Client,
}

impl OrganizationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }
}

/// Errors raised while assembling a [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    #[error("principal requires a user id")]
    MissingUserId,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Authenticated identity plus role and scoping attributes for one request.
///
/// `role` is `None` when the session carried a role name outside the closed
/// [`RoleId`] set; such a principal is denied every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: Uuid,
    role: Option<RoleId>,
    organization_id: Option<Uuid>,
    organization_type: OrganizationType,
    #[serde(default)]
    agent_assigned_org_ids: Vec<Uuid>,
    #[serde(default)]
    assigned_location_ids: Vec<Uuid>,
}

impl Principal {
    #[must_use]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    #[inline]
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    #[inline]
    #[must_use]
    pub fn role(&self) -> Option<RoleId> {
        self.role
    }

    /// The organization the principal is currently acting within.
    #[inline]
    #[must_use]
    pub fn organization_id(&self) -> Option<Uuid> {
        self.organization_id
    }

    #[inline]
    #[must_use]
    pub fn organization_type(&self) -> OrganizationType {
        self.organization_type
    }

    /// Client organizations a `five_am_agent` has been assigned to.
    #[inline]
    #[must_use]
    pub fn agent_assigned_org_ids(&self) -> &[Uuid] {
        &self.agent_assigned_org_ids
    }

    /// Procedure locations a front-desk member is limited to. Empty means all.
    #[inline]
    #[must_use]
    pub fn assigned_location_ids(&self) -> &[Uuid] {
        &self.assigned_location_ids
    }

    /// `true` when the principal belongs to the platform operator's organization.
    #[must_use]
    pub fn is_platform_staff(&self) -> bool {
        self.organization_type == OrganizationType::Admin
    }
}

/// Builder for [`Principal`].
#[derive(Debug, Clone, Default)]
pub struct PrincipalBuilder {
    user_id: Option<Uuid>,
    role: Option<RoleId>,
    organization_id: Option<Uuid>,
    organization_type: OrganizationType,
    agent_assigned_org_ids: Vec<Uuid>,
    assigned_location_ids: Vec<Uuid>,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn user_id(mut self, id: Uuid) -> Self {
        self.user_id = Some(id);
        self
    }

    #[must_use]
    pub fn role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the role from its raw session name.
    ///
    /// Unknown names leave the role unset so every check on the resulting
    /// principal is denied.
    #[must_use]
    pub fn role_name(mut self, name: &str) -> Self {
        self.role = match name.parse::<RoleId>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(role = name, error = %e, "principal carries an unknown role");
                None
            }
        };
        self
    }

    #[must_use]
    pub fn organization_id(mut self, id: Uuid) -> Self {
        self.organization_id = Some(id);
        self
    }

    #[must_use]
    pub fn organization_type(mut self, kind: OrganizationType) -> Self {
        self.organization_type = kind;
        self
    }

    #[must_use]
    pub fn agent_assigned_org_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.agent_assigned_org_ids = ids;
        self
    }

    #[must_use]
    pub fn assigned_location_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.assigned_location_ids = ids;
        self
    }

    /// Finish the principal.
    ///
    /// # Errors
    ///
    /// Returns [`PrincipalError::MissingUserId`] when no user id was set.
    pub fn build(self) -> Result<Principal, PrincipalError> {
        let user_id = self.user_id.ok_or(PrincipalError::MissingUserId)?;
        Ok(Principal {
            user_id,
            role: self.role,
            organization_id: self.organization_id,
            organization_type: self.organization_type,
            agent_assigned_org_ids: self.agent_assigned_org_ids,
            assigned_location_ids: self.assigned_location_ids,
        })
    }
}
