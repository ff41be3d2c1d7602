use std::sync::Arc;

use access_control_sdk::pep::PolicyEnforcer;
use access_control_sdk::{Action, Resource};
use carepath_security::Principal;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::load_live;
use crate::domain::error::DomainError;
use crate::domain::models::{Entity, Interpretation, InterpretationStatus, InterpretingDoctor};
use crate::domain::repos::EntityRepository;

/// Reading workflow: assign an interpreting doctor, then record findings.
///
/// Interpreting doctors are identified by their user id, which is what the
/// assignment rule compares against the acting principal.
pub struct InterpretationsService {
    repo: Arc<dyn EntityRepository<Interpretation>>,
    doctors: Arc<dyn EntityRepository<InterpretingDoctor>>,
    enforcer: PolicyEnforcer,
}

impl InterpretationsService {
    #[must_use]
    pub fn new(
        repo: Arc<dyn EntityRepository<Interpretation>>,
        doctors: Arc<dyn EntityRepository<InterpretingDoctor>>,
        enforcer: PolicyEnforcer,
    ) -> Self {
        Self {
            repo,
            doctors,
            enforcer,
        }
    }

    /// Assign (or reassign) `doctor_id` to read the interpretation.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotFound`] if the interpretation does not exist
    /// - [`DomainError::AccessDenied`] without `interpretation:assign_interpretation`
    /// - [`DomainError::Validation`] if the doctor is unknown, inactive or
    ///   belongs to another organization
    /// - [`DomainError::InvalidTransition`] once reading has started
    #[instrument(skip(self, principal), fields(interpretation_id = %id, doctor_id = %doctor_id))]
    pub async fn assign_interpretation(
        &self,
        principal: &Principal,
        id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Interpretation, DomainError> {
        tracing::info!("Assigning interpretation");

        let mut interpretation = load_live(self.repo.as_ref(), id).await?;
        self.enforcer
            .authorize(
                principal,
                Resource::Interpretation,
                Action::AssignInterpretation,
                interpretation.target().as_ref(),
            )
            .await?;

        let doctor = self
            .doctors
            .get(doctor_id)
            .await?
            .filter(|d| !d.audit.is_deleted());
        match doctor {
            Some(d) if d.is_active && d.organization_id == interpretation.organization_id => {}
            Some(_) => {
                return Err(DomainError::validation(
                    "interpreting_doctor_id",
                    "doctor is inactive or outside the interpretation's organization",
                ));
            }
            None => {
                return Err(DomainError::validation(
                    "interpreting_doctor_id",
                    "unknown interpreting doctor",
                ));
            }
        }

        transition(&mut interpretation, InterpretationStatus::Assigned)?;
        interpretation.assigned_interpreting_doctor_id = Some(doctor_id);
        interpretation
            .audit
            .touch(principal.user_id(), OffsetDateTime::now_utc());

        let saved = self.repo.save(interpretation).await?;
        tracing::info!("Successfully assigned interpretation");
        Ok(saved)
    }

    /// Mark an assigned interpretation as being read.
    ///
    /// Gated like completion: only principals who may record findings, and
    /// for doctors only the assignee, can open the reading.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotFound`] if the interpretation does not exist
    /// - [`DomainError::AccessDenied`] without `interpretation:complete_interpretation`
    ///   or, for doctors, when not the assignee
    /// - [`DomainError::InvalidTransition`] unless assigned
    #[instrument(skip(self, principal), fields(interpretation_id = %id))]
    pub async fn start_interpretation(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Interpretation, DomainError> {
        tracing::info!("Starting interpretation");

        let mut interpretation = load_live(self.repo.as_ref(), id).await?;
        self.enforcer
            .authorize(
                principal,
                Resource::Interpretation,
                Action::CompleteInterpretation,
                interpretation.target().as_ref(),
            )
            .await?;

        transition(&mut interpretation, InterpretationStatus::InProgress)?;
        interpretation
            .audit
            .touch(principal.user_id(), OffsetDateTime::now_utc());

        let saved = self.repo.save(interpretation).await?;
        tracing::info!("Successfully started interpretation");
        Ok(saved)
    }

    /// Record `findings` and close the interpretation.
    ///
    /// Interpreting doctors may only complete interpretations assigned to them.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotFound`] if the interpretation does not exist
    /// - [`DomainError::AccessDenied`] without `interpretation:complete_interpretation`
    ///   or, for doctors, when not the assignee
    /// - [`DomainError::Validation`] for blank findings
    /// - [`DomainError::InvalidTransition`] unless assigned or in progress
    #[instrument(skip(self, principal, findings), fields(interpretation_id = %id))]
    pub async fn complete_interpretation(
        &self,
        principal: &Principal,
        id: Uuid,
        findings: String,
    ) -> Result<Interpretation, DomainError> {
        tracing::info!("Completing interpretation");

        if findings.trim().is_empty() {
            return Err(DomainError::validation("findings", "must not be blank"));
        }

        let mut interpretation = load_live(self.repo.as_ref(), id).await?;
        self.enforcer
            .authorize(
                principal,
                Resource::Interpretation,
                Action::CompleteInterpretation,
                interpretation.target().as_ref(),
            )
            .await?;

        transition(&mut interpretation, InterpretationStatus::Completed)?;
        interpretation.findings = Some(findings);
        interpretation
            .audit
            .touch(principal.user_id(), OffsetDateTime::now_utc());

        let saved = self.repo.save(interpretation).await?;
        tracing::info!("Successfully completed interpretation");
        Ok(saved)
    }
}

fn transition(
    interpretation: &mut Interpretation,
    next: InterpretationStatus,
) -> Result<(), DomainError> {
    if !interpretation.status.can_transition_to(next) {
        return Err(DomainError::invalid_transition(
            Interpretation::KIND,
            interpretation.status.as_str(),
            next.as_str(),
        ));
    }
    interpretation.status = next;
    Ok(())
}

impl std::fmt::Debug for InterpretationsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpretationsService").finish_non_exhaustive()
    }
}
