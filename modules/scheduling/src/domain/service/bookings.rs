use std::sync::Arc;

use access_control_sdk::pep::PolicyEnforcer;
use access_control_sdk::{Action, Resource};
use carepath_security::Principal;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::load_live;
use crate::domain::error::DomainError;
use crate::domain::models::{Booking, BookingStatus, Entity};
use crate::domain::repos::EntityRepository;

/// Procedure-day workflow on bookings.
///
/// Each step is gated on its own action against the stored booking, so the
/// front-desk location rule and the technician assignment rule both apply.
pub struct BookingsService {
    repo: Arc<dyn EntityRepository<Booking>>,
    enforcer: PolicyEnforcer,
}

impl BookingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository<Booking>>, enforcer: PolicyEnforcer) -> Self {
        Self { repo, enforcer }
    }

    /// `scheduled -> checked_in`.
    ///
    /// # Errors
    ///
    /// See [`BookingsService::complete_procedure`].
    #[instrument(skip(self, principal), fields(booking_id = %id))]
    pub async fn check_in_patient(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Booking, DomainError> {
        self.advance(principal, id, Action::CheckInPatient, BookingStatus::CheckedIn)
            .await
    }

    /// `checked_in -> in_progress`.
    ///
    /// # Errors
    ///
    /// See [`BookingsService::complete_procedure`].
    #[instrument(skip(self, principal), fields(booking_id = %id))]
    pub async fn start_procedure(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Booking, DomainError> {
        self.advance(principal, id, Action::StartProcedure, BookingStatus::InProgress)
            .await
    }

    /// `in_progress -> completed`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotFound`] if the booking does not exist
    /// - [`DomainError::AccessDenied`] if the action or a scope rule denies it
    /// - [`DomainError::InvalidTransition`] if the booking is in the wrong state
    #[instrument(skip(self, principal), fields(booking_id = %id))]
    pub async fn complete_procedure(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Booking, DomainError> {
        self.advance(principal, id, Action::CompleteProcedure, BookingStatus::Completed)
            .await
    }

    async fn advance(
        &self,
        principal: &Principal,
        id: Uuid,
        action: Action,
        next: BookingStatus,
    ) -> Result<Booking, DomainError> {
        let mut booking = load_live(self.repo.as_ref(), id).await?;
        self.enforcer
            .authorize(principal, Resource::Booking, action, booking.target().as_ref())
            .await?;

        if !booking.status.can_transition_to(next) {
            return Err(DomainError::invalid_transition(
                Booking::KIND,
                booking.status.as_str(),
                next.as_str(),
            ));
        }
        let from = booking.status;
        booking.status = next;
        booking
            .audit
            .touch(principal.user_id(), OffsetDateTime::now_utc());

        let saved = self.repo.save(booking).await?;
        tracing::info!(
            from = from.as_str(),
            to = next.as_str(),
            "booking status changed"
        );
        Ok(saved)
    }
}

impl std::fmt::Debug for BookingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingsService").finish_non_exhaustive()
    }
}
