//! # Quote Request Aggregate
//!
//! Tracks quote collection for one damaged part across the selected
//! provider channels.
//!
//! # State Machine
//!
//! See [`RequestState`]. Every provider starts [`ProviderResolution::Awaiting`]
//! and resolves to `Responded` or `Unreachable`. The request becomes
//! `Received` once every selected provider is resolved, or `Expired` when a
//! [`RequestTransition::ClockTick`] at or after the deadline finds providers
//! still open.
//!
//! # Examples
//!
//! ```
//! use repair_quote::domain::entities::quote_request::{QuoteRequest, RequestTransition};
//! use repair_quote::domain::value_objects::{
//!     AssessmentId, DamagedPartId, ProviderSelection, ProviderType, RequestState, Timestamp,
//!     VehicleContext,
//! };
//!
//! let now = Timestamp::now();
//! let mut request = QuoteRequest::new(
//!     DamagedPartId::new_v4(),
//!     AssessmentId::new_v4(),
//!     ProviderSelection::new([ProviderType::Assessor, ProviderType::Dealer]).unwrap(),
//!     VehicleContext::new("Toyota", "Corolla", 2019).unwrap(),
//!     chrono::Duration::days(7),
//!     now,
//! )
//! .unwrap();
//!
//! request.apply(RequestTransition::ProviderResponded(ProviderType::Assessor), now).unwrap();
//! assert_eq!(request.state(), RequestState::Collecting);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::{
    ProviderResponded, ProviderUnreachable, RequestCancelled, RequestCreated, RequestEvent,
    RequestExpired, RequestReceived, RequestSent,
};
use crate::domain::value_objects::{
    AssessmentId, DamagedPartId, ProviderSelection, ProviderType, QuoteRequestId, RequestState,
    Timestamp, VehicleContext,
};
use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Longest allowed expiry window in days.
pub const MAX_EXPIRY_DAYS: i64 = 30;

/// Per-provider outcome within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderResolution {
    /// No answer yet.
    Awaiting,
    /// A valid quote was recorded.
    Responded,
    /// The provider failed, timed out or sent an invalid quote.
    Unreachable {
        /// Failure description.
        reason: String,
    },
}

impl ProviderResolution {
    /// Returns true unless still awaiting.
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Awaiting)
    }
}

/// Event fed into [`QuoteRequest::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTransition {
    /// A validated quote from the provider was stored.
    ProviderResponded(ProviderType),
    /// The provider failed with the given reason.
    ProviderUnreachable(ProviderType, String),
    /// Time moved on; expires the request if the deadline passed.
    ClockTick(Timestamp),
}

/// A quote request for one damaged part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    id: QuoteRequestId,
    part_id: DamagedPartId,
    assessment_id: AssessmentId,
    providers: ProviderSelection,
    vehicle: VehicleContext,
    state: RequestState,
    resolutions: BTreeMap<ProviderType, ProviderResolution>,
    version: u64,
    created_at: Timestamp,
    expires_at: Timestamp,
    updated_at: Timestamp,
    #[serde(skip)]
    events: Vec<RequestEvent>,
}

impl QuoteRequest {
    /// Creates a pending request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if the expiry window is not
    /// positive or longer than [`MAX_EXPIRY_DAYS`].
    pub fn new(
        part_id: DamagedPartId,
        assessment_id: AssessmentId,
        providers: ProviderSelection,
        vehicle: VehicleContext,
        expiry_window: Duration,
        now: Timestamp,
    ) -> DomainResult<Self> {
        Self::validate_window(expiry_window)?;
        let id = QuoteRequestId::new_v4();
        let expires_at = now.add_duration(expiry_window);
        let resolutions = providers
            .iter()
            .map(|p| (p, ProviderResolution::Awaiting))
            .collect();
        Ok(Self {
            id,
            part_id,
            assessment_id,
            providers,
            vehicle,
            state: RequestState::Pending,
            resolutions,
            version: 1,
            created_at: now,
            expires_at,
            updated_at: now,
            events: vec![RequestEvent::Created(RequestCreated::new(
                id, part_id, providers, expires_at, now,
            ))],
        })
    }

    fn validate_window(window: Duration) -> DomainResult<()> {
        if window <= Duration::zero() {
            return Err(DomainError::validation("expiry window must be positive"));
        }
        if window > Duration::days(MAX_EXPIRY_DAYS) {
            return Err(DomainError::validation(format!(
                "expiry window must be at most {MAX_EXPIRY_DAYS} days"
            )));
        }
        Ok(())
    }

    fn transition_to(&mut self, target: RequestState, now: Timestamp) -> DomainResult<()> {
        if !self.state.can_transition_to(target) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version = self.version.saturating_add(1);
    }

    /// Returns true if the deadline is reached at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    // ========== State Transitions ==========

    /// Marks the request as dispatched.
    ///
    /// Transitions: Pending → Sent
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if not pending.
    pub fn mark_sent(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(RequestState::Sent, now)?;
        self.events
            .push(RequestEvent::Sent(RequestSent::new(self.id, now)));
        Ok(())
    }

    /// Applies a lifecycle event.
    ///
    /// # Errors
    ///
    /// - `DomainError::ProviderNotSelected` for a provider outside the selection
    /// - `DomainError::InvalidStateTransition` if the request no longer
    ///   accepts provider outcomes (terminal, or deadline reached)
    pub fn apply(&mut self, transition: RequestTransition, now: Timestamp) -> DomainResult<()> {
        match transition {
            RequestTransition::ClockTick(at) => {
                self.tick(at)?;
                Ok(())
            }
            RequestTransition::ProviderResponded(provider) => {
                self.resolve(provider, ProviderResolution::Responded, now)
            }
            RequestTransition::ProviderUnreachable(provider, reason) => {
                self.resolve(provider, ProviderResolution::Unreachable { reason }, now)
            }
        }
    }

    /// Expires the request if the deadline is reached with providers open.
    ///
    /// Returns true if the request moved to `Expired`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` only if the state machine
    /// is inconsistent.
    pub fn tick(&mut self, now: Timestamp) -> DomainResult<bool> {
        let open = matches!(
            self.state,
            RequestState::Pending | RequestState::Sent | RequestState::Collecting
        );
        if !open || !self.is_due(now) || self.is_fully_resolved() {
            return Ok(false);
        }
        self.transition_to(RequestState::Expired, now)?;
        self.events.push(RequestEvent::Expired(RequestExpired::new(
            self.id,
            self.open_providers(),
            now,
        )));
        Ok(true)
    }

    fn resolve(
        &mut self,
        provider: ProviderType,
        outcome: ProviderResolution,
        now: Timestamp,
    ) -> DomainResult<()> {
        if !self.providers.contains(provider) {
            return Err(DomainError::ProviderNotSelected(provider));
        }
        let current = self
            .resolutions
            .get(&provider)
            .cloned()
            .unwrap_or(ProviderResolution::Awaiting);

        if self.tick(now)? {
            return Err(DomainError::InvalidStateTransition {
                from: self.state,
                to: RequestState::Collecting,
            });
        }

        // A repeated response is an update even after the request is received.
        if current == ProviderResolution::Responded {
            if outcome == ProviderResolution::Responded && !self.state.is_terminal() {
                self.touch(now);
                self.events
                    .push(RequestEvent::ProviderResponded(ProviderResponded::new(
                        self.id, provider, true, now,
                    )));
            }
            return Ok(());
        }

        let open = self.state == RequestState::Pending || self.state.accepts_responses();
        if !open {
            return Err(DomainError::InvalidStateTransition {
                from: self.state,
                to: RequestState::Collecting,
            });
        }
        if matches!(current, ProviderResolution::Unreachable { .. })
            && matches!(outcome, ProviderResolution::Unreachable { .. })
        {
            return Ok(());
        }
        if self.state == RequestState::Pending {
            self.mark_sent(now)?;
        }

        let event = match &outcome {
            ProviderResolution::Unreachable { reason } => RequestEvent::ProviderUnreachable(
                ProviderUnreachable::new(self.id, provider, reason.clone(), now),
            ),
            _ => RequestEvent::ProviderResponded(ProviderResponded::new(
                self.id, provider, false, now,
            )),
        };
        self.resolutions.insert(provider, outcome);
        self.events.push(event);

        if self.is_fully_resolved() {
            self.transition_to(RequestState::Received, now)?;
            self.events.push(RequestEvent::Received(RequestReceived::new(
                self.id,
                self.responded_count(),
                self.unreachable_count(),
                now,
            )));
        } else if self.state == RequestState::Sent {
            self.transition_to(RequestState::Collecting, now)?;
        } else {
            self.touch(now);
        }
        Ok(())
    }

    /// Cancels the request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if already terminal.
    pub fn cancel(&mut self, now: Timestamp) -> DomainResult<()> {
        let previous = self.state;
        self.transition_to(RequestState::Cancelled, now)?;
        self.events
            .push(RequestEvent::Cancelled(RequestCancelled::new(self.id, previous, now)));
        Ok(())
    }

    /// Drains the pending domain events.
    pub fn take_events(&mut self) -> Vec<RequestEvent> {
        std::mem::take(&mut self.events)
    }

    // ========== Queries ==========

    /// Returns true if every selected provider is resolved.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.resolutions.values().all(ProviderResolution::is_resolved)
    }

    /// Providers still awaited, canonical order.
    #[must_use]
    pub fn open_providers(&self) -> Vec<ProviderType> {
        self.resolutions
            .iter()
            .filter(|(_, r)| !r.is_resolved())
            .map(|(p, _)| *p)
            .collect()
    }

    /// Number of providers that responded.
    #[must_use]
    pub fn responded_count(&self) -> usize {
        self.resolutions
            .values()
            .filter(|r| **r == ProviderResolution::Responded)
            .count()
    }

    /// Number of providers marked unreachable.
    #[must_use]
    pub fn unreachable_count(&self) -> usize {
        self.resolutions
            .values()
            .filter(|r| matches!(r, ProviderResolution::Unreachable { .. }))
            .count()
    }

    /// Returns true if the request is active (not expired or cancelled) at `now`.
    ///
    /// An open request whose deadline has passed counts as inactive even
    /// before a clock tick records the expiry.
    #[must_use]
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        match self.state {
            RequestState::Expired | RequestState::Cancelled => false,
            RequestState::Received => true,
            _ => !self.is_due(now) || self.is_fully_resolved(),
        }
    }

    // ========== Accessors ==========

    /// Returns the request ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> QuoteRequestId {
        self.id
    }

    /// Returns the damaged part.
    #[inline]
    #[must_use]
    pub fn part_id(&self) -> DamagedPartId {
        self.part_id
    }

    /// Returns the owning assessment.
    #[inline]
    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.assessment_id
    }

    /// Returns the provider selection.
    #[inline]
    #[must_use]
    pub fn providers(&self) -> ProviderSelection {
        self.providers
    }

    /// Returns the vehicle context.
    #[inline]
    #[must_use]
    pub fn vehicle(&self) -> &VehicleContext {
        &self.vehicle
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Returns a provider's resolution, `None` if not selected.
    #[must_use]
    pub fn resolution(&self, provider: ProviderType) -> Option<&ProviderResolution> {
        self.resolutions.get(&provider)
    }

    /// Returns the version for optimistic locking.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns when the request was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the expiry deadline.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Returns when the request last changed.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

impl fmt::Display for QuoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QuoteRequest({} part={} state={} providers={})",
            self.id, self.part_id, self.state, self.providers
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::events::DomainEvent;

    fn t0() -> Timestamp {
        Timestamp::from_secs(1_700_000_000).unwrap()
    }

    fn request(providers: &[ProviderType]) -> QuoteRequest {
        QuoteRequest::new(
            DamagedPartId::new_v4(),
            AssessmentId::new_v4(),
            ProviderSelection::new(providers.iter().copied()).unwrap(),
            VehicleContext::new("Toyota", "Corolla", 2019).unwrap(),
            Duration::days(7),
            t0(),
        )
        .unwrap()
    }

    fn responded(p: ProviderType) -> RequestTransition {
        RequestTransition::ProviderResponded(p)
    }

    mod construction {
        use super::*;

        #[test]
        fn starts_pending_with_all_awaiting() {
            let r = request(&[ProviderType::Dealer, ProviderType::Network]);
            assert_eq!(r.state(), RequestState::Pending);
            assert_eq!(r.open_providers(), vec![ProviderType::Dealer, ProviderType::Network]);
            assert_eq!(r.expires_at(), t0().add_days(7));
            assert_eq!(r.version(), 1);
        }

        #[test]
        fn window_bounds() {
            let make = |window| {
                QuoteRequest::new(
                    DamagedPartId::new_v4(),
                    AssessmentId::new_v4(),
                    ProviderSelection::all(),
                    VehicleContext::new("VW", "Golf", 2020).unwrap(),
                    window,
                    t0(),
                )
            };
            assert!(make(Duration::days(30)).is_ok());
            assert!(make(Duration::days(31)).is_err());
            assert!(make(Duration::zero()).is_err());
            assert!(make(Duration::seconds(2)).is_ok());
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn first_response_moves_to_collecting() {
            let mut r = request(&[ProviderType::Assessor, ProviderType::Dealer]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            assert_eq!(r.state(), RequestState::Collecting);
        }

        #[test]
        fn all_resolved_moves_to_received() {
            let mut r = request(&[ProviderType::Assessor, ProviderType::Dealer]);
            r.mark_sent(t0()).unwrap();
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            r.apply(
                RequestTransition::ProviderUnreachable(ProviderType::Dealer, "timeout".into()),
                t0(),
            )
            .unwrap();
            assert_eq!(r.state(), RequestState::Received);
            assert_eq!(r.responded_count(), 1);
            assert_eq!(r.unreachable_count(), 1);
        }

        #[test]
        fn single_provider_goes_straight_to_received() {
            let mut r = request(&[ProviderType::Assessor]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            assert_eq!(r.state(), RequestState::Received);
        }

        #[test]
        fn unselected_provider_is_rejected() {
            let mut r = request(&[ProviderType::Assessor]);
            let err = r.apply(responded(ProviderType::Dealer), t0()).unwrap_err();
            assert_eq!(err, DomainError::ProviderNotSelected(ProviderType::Dealer));
        }

        #[test]
        fn repeated_response_is_update() {
            let mut r = request(&[ProviderType::Assessor, ProviderType::Dealer]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            let version = r.version();
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            assert_eq!(r.state(), RequestState::Collecting);
            assert_eq!(r.version(), version + 1);
            assert_eq!(r.responded_count(), 1);
        }

        #[test]
        fn late_failure_does_not_override_response() {
            let mut r = request(&[ProviderType::Assessor, ProviderType::Dealer]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            r.apply(
                RequestTransition::ProviderUnreachable(ProviderType::Assessor, "x".into()),
                t0(),
            )
            .unwrap();
            assert_eq!(
                r.resolution(ProviderType::Assessor),
                Some(&ProviderResolution::Responded)
            );
        }

        #[test]
        fn cancel_from_received() {
            let mut r = request(&[ProviderType::Assessor]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            r.cancel(t0()).unwrap();
            assert_eq!(r.state(), RequestState::Cancelled);
            assert!(r.cancel(t0()).is_err());
        }
    }

    mod expiry {
        use super::*;

        #[test]
        fn two_of_three_then_deadline_expires() {
            let mut r = request(&[
                ProviderType::Assessor,
                ProviderType::Dealer,
                ProviderType::Network,
            ]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            r.apply(responded(ProviderType::Dealer), t0().add_secs(60))
                .unwrap();
            r.apply(RequestTransition::ClockTick(t0().add_days(7)), t0().add_days(7))
                .unwrap();
            assert_eq!(r.state(), RequestState::Expired);
            assert_eq!(r.open_providers(), vec![ProviderType::Network]);
        }

        #[test]
        fn tick_before_deadline_is_noop() {
            let mut r = request(&[ProviderType::Dealer]);
            assert!(!r.tick(t0().add_days(6)).unwrap());
            assert_eq!(r.state(), RequestState::Pending);
        }

        #[test]
        fn tick_after_received_is_noop() {
            let mut r = request(&[ProviderType::Assessor]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            assert!(!r.tick(t0().add_days(8)).unwrap());
            assert_eq!(r.state(), RequestState::Received);
        }

        #[test]
        fn response_after_deadline_expires_and_fails() {
            let mut r = request(&[ProviderType::Assessor, ProviderType::Dealer]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            let late = t0().add_days(8);
            assert!(r.apply(responded(ProviderType::Dealer), late).is_err());
            assert_eq!(r.state(), RequestState::Expired);
        }

        #[test]
        fn active_check_is_lazy() {
            let r = request(&[ProviderType::Dealer]);
            assert!(r.is_active_at(t0().add_days(6)));
            assert!(!r.is_active_at(t0().add_days(7)));
        }
    }

    mod events {
        use super::*;

        #[test]
        fn lifecycle_is_recorded() {
            let mut r = request(&[ProviderType::Assessor]);
            r.apply(responded(ProviderType::Assessor), t0()).unwrap();
            let names: Vec<_> = r.take_events().iter().map(|e| e.event_name()).collect();
            assert_eq!(
                names,
                vec![
                    "RequestCreated",
                    "RequestSent",
                    "ProviderResponded",
                    "RequestReceived"
                ]
            );
            assert!(r.take_events().is_empty());
        }
    }
}
