//! # Quote Request Manager
//!
//! Owns the lifecycle of quote requests.
//!
//! - at most one active (non-expired, non-cancelled) request per damaged part
//! - transitions are serialized per request
//! - every lifecycle change is drained into the [`EventStore`] and logged
//!
//! Expiry is lazy: a request whose deadline passed is expired the next time
//! it is touched (creation of a successor, a transition or a sweep).

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{DamagedPart, QuoteRequest, RequestTransition};
use crate::domain::events::{DomainEvent, RequestEvent};
use crate::domain::value_objects::{
    AssessmentId, DamagedPartId, ProviderSelection, QuoteRequestId, Timestamp, VehicleContext,
};
use crate::infrastructure::persistence::{EventStore, QuoteRequestRepository};
use chrono::Duration;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default request expiry window in days.
pub const DEFAULT_EXPIRY_DAYS: u32 = 7;

/// Quote request lifecycle service.
#[derive(Debug)]
pub struct QuoteRequestManager {
    requests: Arc<dyn QuoteRequestRepository>,
    events: Arc<dyn EventStore>,
    default_expiry: Duration,
    part_locks: DashMap<DamagedPartId, Arc<Mutex<()>>>,
    request_locks: DashMap<QuoteRequestId, Arc<Mutex<()>>>,
}

impl QuoteRequestManager {
    /// Creates a manager with the given default expiry window in days.
    #[must_use]
    pub fn new(
        requests: Arc<dyn QuoteRequestRepository>,
        events: Arc<dyn EventStore>,
        default_expiry_days: u32,
    ) -> Self {
        Self {
            requests,
            events,
            default_expiry: Duration::days(i64::from(default_expiry_days)),
            part_locks: DashMap::new(),
            request_locks: DashMap::new(),
        }
    }

    /// Default expiry window.
    #[inline]
    #[must_use]
    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    fn part_lock(&self, part_id: DamagedPartId) -> Arc<Mutex<()>> {
        self.part_locks.entry(part_id).or_default().clone()
    }

    fn request_lock(&self, request_id: QuoteRequestId) -> Arc<Mutex<()>> {
        self.request_locks.entry(request_id).or_default().clone()
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.part_locks.len() + self.request_locks.len()
    }

    /// Saves the request and appends its pending events.
    async fn persist(&self, request: &mut QuoteRequest) -> ApplicationResult<()> {
        let events = request.take_events();
        self.requests.save(request).await?;
        if events.is_empty() {
            return Ok(());
        }
        for event in &events {
            log_event(request, event);
        }
        self.events.append(&events).await?;
        Ok(())
    }

    async fn load(&self, request_id: QuoteRequestId) -> ApplicationResult<QuoteRequest> {
        self.requests
            .get(request_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("QuoteRequest", request_id.to_string()))
    }

    /// Creates a request for a part.
    ///
    /// `expiry_window` defaults to the configured window.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Conflict` if the part already has an active request
    /// - `ApplicationError::Validation` for an invalid expiry window
    pub async fn create_request(
        &self,
        part: &DamagedPart,
        vehicle: VehicleContext,
        providers: ProviderSelection,
        expiry_window: Option<Duration>,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        let lock = self.part_lock(part.id());
        let created = {
            let _guard = lock.lock().await;
            self.create_locked(part, vehicle, providers, expiry_window, now)
                .await
        };
        release(&self.part_locks, part.id(), lock);
        created
    }

    async fn create_locked(
        &self,
        part: &DamagedPart,
        vehicle: VehicleContext,
        providers: ProviderSelection,
        expiry_window: Option<Duration>,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        for existing in self.requests.find_by_part(part.id()).await? {
            if existing.state().is_terminal() {
                continue;
            }
            let current = self.sweep_one(existing.id(), now).await?;
            if !current.state().is_terminal() {
                return Err(ApplicationError::conflict(format!(
                    "part {} already has active request {} ({})",
                    part.id(),
                    current.id(),
                    current.state()
                )));
            }
        }

        let mut request = QuoteRequest::new(
            part.id(),
            part.assessment_id(),
            providers,
            vehicle,
            expiry_window.unwrap_or(self.default_expiry),
            now,
        )?;
        self.persist(&mut request).await?;
        Ok(request)
    }

    /// Gets a request.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` for an unknown id.
    pub async fn get(&self, request_id: QuoteRequestId) -> ApplicationResult<QuoteRequest> {
        self.load(request_id).await
    }

    /// Applies a lifecycle event.
    ///
    /// Changes made before a failure (a deadline expiry triggered by a late
    /// response) are still persisted.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::NotFound` for an unknown id
    /// - `ApplicationError::Domain` for a provider outside the selection or
    ///   a request that no longer accepts outcomes
    pub async fn transition(
        &self,
        request_id: QuoteRequestId,
        transition: RequestTransition,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        self.mutate(request_id, |request| request.apply(transition, now))
            .await
    }

    /// Marks a pending request as sent.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` if the request is not pending.
    pub async fn mark_sent(
        &self,
        request_id: QuoteRequestId,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        self.mutate(request_id, |request| request.mark_sent(now)).await
    }

    /// Cancels a request.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` if the request is already expired
    /// or cancelled.
    pub async fn cancel(
        &self,
        request_id: QuoteRequestId,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        self.mutate(request_id, |request| request.cancel(now)).await
    }

    async fn mutate(
        &self,
        request_id: QuoteRequestId,
        change: impl FnOnce(&mut QuoteRequest) -> crate::domain::errors::DomainResult<()>,
    ) -> ApplicationResult<QuoteRequest> {
        let lock = self.request_lock(request_id);
        let mutated = async {
            let _guard = lock.lock().await;
            let mut request = self.load(request_id).await?;
            let version = request.version();
            let outcome = change(&mut request);
            if request.version() != version {
                self.persist(&mut request).await?;
            }
            outcome?;
            Ok::<_, ApplicationError>(request)
        }
        .await;
        release(&self.request_locks, request_id, lock);
        mutated
    }

    /// The active request of a part, expiring it first if due.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Repository` if the backend fails.
    pub async fn active_request_for(
        &self,
        part_id: DamagedPartId,
        now: Timestamp,
    ) -> ApplicationResult<Option<QuoteRequest>> {
        for request in self.requests.find_by_part(part_id).await? {
            let current = self.sweep_one(request.id(), now).await?;
            if !current.state().is_terminal() {
                return Ok(Some(current));
            }
        }
        Ok(None)
    }

    /// The most recently created request of a part, in any state.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Repository` if the backend fails.
    pub async fn latest_request(
        &self,
        part_id: DamagedPartId,
    ) -> ApplicationResult<Option<QuoteRequest>> {
        Ok(self
            .requests
            .find_by_part(part_id)
            .await?
            .into_iter()
            .max_by_key(|r| (r.created_at(), r.version())))
    }

    /// Expires every due request of an assessment; returns how many expired.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Repository` if the backend fails.
    pub async fn sweep_expired(
        &self,
        assessment_id: AssessmentId,
        now: Timestamp,
    ) -> ApplicationResult<usize> {
        let mut expired = 0;
        for request in self.requests.find_by_assessment(assessment_id).await? {
            if request.state().is_terminal() || !request.is_due(now) {
                continue;
            }
            let before = request.state();
            let after = self.sweep_one(request.id(), now).await?;
            if after.state() != before && after.state().is_terminal() {
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn sweep_one(
        &self,
        request_id: QuoteRequestId,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        self.mutate(request_id, |request| request.tick(now).map(|_| ()))
            .await
    }
}

/// Drops the map entry of a lock nobody else holds or waits on.
fn release<K: Eq + Hash>(locks: &DashMap<K, Arc<Mutex<()>>>, key: K, lock: Arc<Mutex<()>>) {
    drop(lock);
    locks.remove_if(&key, |_, held| Arc::strong_count(held) == 1);
}

fn log_event(request: &QuoteRequest, event: &RequestEvent) {
    match event {
        RequestEvent::ProviderUnreachable(e) => tracing::warn!(
            request_id = %request.id(),
            part_id = %request.part_id(),
            provider = %e.provider,
            reason = %e.reason,
            "provider unreachable"
        ),
        RequestEvent::Expired(_) => tracing::warn!(
            request_id = %request.id(),
            part_id = %request.part_id(),
            open = ?request.open_providers(),
            "quote request expired"
        ),
        other => tracing::info!(
            request_id = %request.id(),
            part_id = %request.part_id(),
            state = %request.state(),
            event = other.event_name(),
            "quote request event"
        ),
    }
}
