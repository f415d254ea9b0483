//! # Provider Dispatch
//!
//! Fans a quote request out to the selected provider channels and feeds every
//! outcome back into the request lifecycle.
//!
//! The local assessor adapter runs inline first, so its quote is available
//! before any remote provider answers. Remote adapters run concurrently, each
//! bounded by its own timeout; the whole collection is bounded by
//! [`DispatchConfig::max_wait_ms`] and by the request's expiry deadline.
//!
//! Outcomes are ingested by the single collecting task in arrival order:
//!
//! 1. validate the submission (or the update of an earlier quote)
//! 2. record the provider outcome on the request
//! 3. upsert the quote
//!
//! An invalid quote marks its provider unreachable and is never stored.
//! Outcomes for a request that stopped accepting responses (cancelled or
//! expired) are discarded.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::quote_request_manager::QuoteRequestManager;
use crate::domain::entities::{Quote, QuoteRequest, QuoteSubmission, RequestTransition};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{
    DamagedPartId, Money, ProviderType, QuoteId, QuoteRequestId, RequestState, Timestamp,
};
use crate::infrastructure::persistence::{DamagedPartRepository, QuoteRepository};
use crate::infrastructure::providers::{
    ProviderAdapter, ProviderError, ProviderRegistry, ProviderRequest, ProviderResult,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until, timeout};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, debug, info, info_span, warn};

/// Reason recorded for a selected provider without an adapter.
pub const NO_ADAPTER_REASON: &str = "no adapter registered";

const UPDATE_BUFFER: usize = ProviderType::ALL.len() * 2;

/// Configuration for provider dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound on one collection round in milliseconds.
    pub max_wait_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: 30_000,
        }
    }
}

impl DispatchConfig {
    /// Creates a configuration with the given collection bound.
    #[must_use]
    pub fn with_max_wait(max_wait_ms: u64) -> Self {
        Self { max_wait_ms }
    }

    /// Collection bound as a duration.
    #[inline]
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// What happened to one provider's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A valid quote was stored.
    Quoted {
        /// Stored quote.
        quote_id: QuoteId,
        /// Its total.
        total: Money,
    },
    /// The submission failed validation; the provider is unreachable.
    Rejected {
        /// Validation failure.
        reason: String,
    },
    /// The provider failed, timed out or has no adapter.
    Unreachable {
        /// Failure description.
        reason: String,
    },
    /// The request no longer accepted outcomes when the answer arrived.
    Discarded,
}

/// One provider outcome, as streamed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchUpdate {
    /// Request dispatched.
    pub request_id: QuoteRequestId,
    /// Provider that answered.
    pub provider: ProviderType,
    /// Outcome.
    pub outcome: DispatchOutcome,
    /// Request state after ingestion.
    pub state: RequestState,
}

/// Result of one collection round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Request dispatched.
    pub request_id: QuoteRequestId,
    /// Request state once the round ended.
    pub state: RequestState,
    /// Outcomes in arrival order.
    pub updates: Vec<DispatchUpdate>,
    /// Providers still open when the round ended.
    pub open_providers: Vec<ProviderType>,
    /// The round stopped at the wait bound.
    pub timed_out: bool,
    /// The round stopped because the request was cancelled.
    pub cancelled: bool,
}

impl DispatchSummary {
    /// Number of stored quotes.
    #[must_use]
    pub fn quoted_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| matches!(u.outcome, DispatchOutcome::Quoted { .. }))
            .count()
    }

    /// Outcome recorded for a provider, if it answered this round.
    #[must_use]
    pub fn outcome_for(&self, provider: ProviderType) -> Option<&DispatchOutcome> {
        self.updates
            .iter()
            .find(|u| u.provider == provider)
            .map(|u| &u.outcome)
    }
}

/// State of one collection round.
struct Round {
    request_id: QuoteRequestId,
    part_id: DamagedPartId,
    request: ProviderRequest,
    issued_at: Timestamp,
    started: Instant,
    deadline: Instant,
    remote: Vec<(ProviderType, Arc<dyn ProviderAdapter>)>,
    updates: Vec<DispatchUpdate>,
    sink: Option<mpsc::Sender<DispatchUpdate>>,
}

impl Round {
    /// Arrival instant on the request clock.
    fn at(&self) -> Timestamp {
        let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap_or_default();
        self.issued_at.add_duration(elapsed)
    }

    async fn emit(&mut self, provider: ProviderType, outcome: DispatchOutcome, state: RequestState) {
        let update = DispatchUpdate {
            request_id: self.request_id,
            provider,
            outcome,
            state,
        };
        if let Some(sink) = &self.sink
            && sink.send(update.clone()).await.is_err()
        {
            debug!(request_id = %self.request_id, "dispatch update receiver dropped");
        }
        self.updates.push(update);
    }
}

/// Dispatches quote requests to provider adapters.
#[derive(Debug)]
pub struct ProviderDispatcher {
    registry: ProviderRegistry,
    manager: Arc<QuoteRequestManager>,
    parts: Arc<dyn DamagedPartRepository>,
    quotes: Arc<dyn QuoteRepository>,
    config: DispatchConfig,
    in_flight: DashMap<QuoteRequestId, watch::Sender<bool>>,
}

impl ProviderDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        registry: ProviderRegistry,
        manager: Arc<QuoteRequestManager>,
        parts: Arc<dyn DamagedPartRepository>,
        quotes: Arc<dyn QuoteRepository>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            manager,
            parts,
            quotes,
            config,
            in_flight: DashMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns the adapter registry.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Returns true if a collection round is running for the request.
    #[must_use]
    pub fn is_in_flight(&self, request_id: QuoteRequestId) -> bool {
        self.in_flight.contains_key(&request_id)
    }

    /// Runs one collection round to completion.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::NotFound` for an unknown request or part
    /// - `ApplicationError::Conflict` if a round is already running for the
    ///   request, or the request is expired or cancelled
    /// - `ApplicationError::Repository` if storage fails
    pub async fn dispatch(
        &self,
        request_id: QuoteRequestId,
        now: Timestamp,
    ) -> ApplicationResult<DispatchSummary> {
        let cancel_rx = self.register(request_id)?;
        let span = info_span!("dispatch", request_id = %request_id);
        let result = async {
            let round = self.start(request_id, now, None).await?;
            self.collect(round, cancel_rx).await
        }
        .instrument(span)
        .await;
        self.in_flight.remove(&request_id);
        result
    }

    /// Starts a collection round and streams its outcomes.
    ///
    /// Local outcomes are already in the stream when this returns; remote
    /// outcomes follow as they arrive. The stream ends with the round.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch) for the part of the round that
    /// runs before returning.
    pub async fn dispatch_stream(
        self: &Arc<Self>,
        request_id: QuoteRequestId,
        now: Timestamp,
    ) -> ApplicationResult<ReceiverStream<DispatchUpdate>> {
        let cancel_rx = self.register(request_id)?;
        let span = info_span!("dispatch", request_id = %request_id);
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);

        let round = match self
            .start(request_id, now, Some(tx))
            .instrument(span.clone())
            .await
        {
            Ok(round) => round,
            Err(e) => {
                self.in_flight.remove(&request_id);
                return Err(e);
            }
        };

        let this = Arc::clone(self);
        tokio::spawn(
            async move {
                if let Err(error) = this.collect(round, cancel_rx).await {
                    warn!(%error, "dispatch round failed");
                }
                this.in_flight.remove(&request_id);
            }
            .instrument(span),
        );
        Ok(ReceiverStream::new(rx))
    }

    /// Cancels a request, stopping its collection round if one is running.
    ///
    /// # Errors
    ///
    /// See [`QuoteRequestManager::cancel`].
    pub async fn cancel(
        &self,
        request_id: QuoteRequestId,
        now: Timestamp,
    ) -> ApplicationResult<QuoteRequest> {
        if let Some(signal) = self.in_flight.get(&request_id) {
            signal.send_replace(true);
        }
        self.manager.cancel(request_id, now).await
    }

    fn register(&self, request_id: QuoteRequestId) -> ApplicationResult<watch::Receiver<bool>> {
        match self.in_flight.entry(request_id) {
            Entry::Occupied(_) => Err(ApplicationError::conflict(format!(
                "request {request_id} is already being dispatched"
            ))),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(false);
                slot.insert(tx);
                Ok(rx)
            }
        }
    }

    /// Loads the request, marks it sent and runs the local adapters.
    async fn start(
        &self,
        request_id: QuoteRequestId,
        now: Timestamp,
        sink: Option<mpsc::Sender<DispatchUpdate>>,
    ) -> ApplicationResult<Round> {
        let mut request = self
            .manager
            .transition(request_id, RequestTransition::ClockTick(now), now)
            .await?;
        if request.state().is_terminal() {
            return Err(ApplicationError::conflict(format!(
                "request {request_id} is {} and cannot be dispatched",
                request.state()
            )));
        }
        if request.state() == RequestState::Pending {
            request = self.manager.mark_sent(request_id, now).await?;
        }

        let part = self
            .parts
            .get(request.part_id())
            .await?
            .ok_or_else(|| {
                ApplicationError::not_found("DamagedPart", request.part_id().to_string())
            })?;

        let wait = self.config.max_wait().min(now.duration_until(&request.expires_at()));
        let started = Instant::now();
        let mut round = Round {
            request_id,
            part_id: part.id(),
            request: ProviderRequest::new(&request, &part, now),
            issued_at: now,
            started,
            deadline: started + wait,
            remote: Vec::new(),
            updates: Vec::new(),
            sink,
        };

        let open = request.open_providers();
        info!(
            part = %part.part_name(),
            providers = ?open,
            wait_ms = wait.as_millis(),
            "dispatching quote request"
        );

        for provider in open {
            match self.registry.get(provider) {
                Some(adapter) if adapter.is_local() => {
                    let result = call(&adapter, &round.request).await;
                    self.ingest(&mut round, provider, result).await?;
                }
                Some(adapter) => round.remote.push((provider, adapter)),
                None => {
                    warn!(%provider, "no adapter registered for selected provider");
                    let at = round.at();
                    let state = self
                        .record(
                            request_id,
                            RequestTransition::ProviderUnreachable(provider, NO_ADAPTER_REASON.into()),
                            at,
                        )
                        .await?;
                    let outcome = match state {
                        Some(_) => DispatchOutcome::Unreachable {
                            reason: NO_ADAPTER_REASON.into(),
                        },
                        None => DispatchOutcome::Discarded,
                    };
                    let state = self.current_state(request_id, state).await?;
                    round.emit(provider, outcome, state).await;
                }
            }
        }
        Ok(round)
    }

    /// Collects the remote outcomes of a started round.
    async fn collect(
        &self,
        mut round: Round,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> ApplicationResult<DispatchSummary> {
        let mut cancelled = *cancel_rx.borrow_and_update();
        let mut timed_out = false;
        let mut pending: BTreeSet<ProviderType> = BTreeSet::new();
        let mut join_set = JoinSet::new();

        for (provider, adapter) in std::mem::take(&mut round.remote) {
            pending.insert(provider);
            if cancelled {
                continue;
            }
            let request = round.request.clone();
            join_set.spawn(async move {
                let result = call(&adapter, &request).await;
                (provider, result)
            });
        }

        let sleep = sleep_until(round.deadline);
        tokio::pin!(sleep);
        let mut signal_open = true;

        while !cancelled && !pending.is_empty() {
            tokio::select! {
                biased;
                changed = cancel_rx.changed(), if signal_open => {
                    match changed {
                        Ok(()) => cancelled = *cancel_rx.borrow_and_update(),
                        Err(_) => signal_open = false,
                    }
                }
                () = &mut sleep => {
                    timed_out = true;
                    break;
                }
                joined = join_set.join_next() => {
                    match joined {
                        Some(Ok((provider, result))) => {
                            pending.remove(&provider);
                            self.ingest(&mut round, provider, result).await?;
                        }
                        Some(Err(e)) => warn!("provider task join error: {}", e),
                        None => break,
                    }
                }
            }
        }
        join_set.abort_all();

        if cancelled {
            info!(open = ?pending, "dispatch cancelled");
            for provider in std::mem::take(&mut pending) {
                let state = self.current_state(round.request_id, None).await?;
                round.emit(provider, DispatchOutcome::Discarded, state).await;
            }
        } else if timed_out {
            warn!(open = ?pending, "dispatch wait bound reached");
            let at = round.at();
            self.manager
                .transition(round.request_id, RequestTransition::ClockTick(at), at)
                .await?;
        } else if !pending.is_empty() {
            // Tasks lost to join errors never resolved their provider.
            for provider in std::mem::take(&mut pending) {
                let reason = "provider task failed".to_string();
                let at = round.at();
                let recorded = self
                    .record(
                        round.request_id,
                        RequestTransition::ProviderUnreachable(provider, reason.clone()),
                        at,
                    )
                    .await?;
                let state = self.current_state(round.request_id, recorded).await?;
                round.emit(provider, DispatchOutcome::Unreachable { reason }, state).await;
            }
        }

        let request = self.manager.get(round.request_id).await?;
        info!(
            state = %request.state(),
            responded = request.responded_count(),
            unreachable = request.unreachable_count(),
            "dispatch round finished"
        );
        Ok(DispatchSummary {
            request_id: round.request_id,
            state: request.state(),
            updates: round.updates,
            open_providers: request.open_providers(),
            timed_out,
            cancelled,
        })
    }

    /// Ingests one provider outcome.
    async fn ingest(
        &self,
        round: &mut Round,
        provider: ProviderType,
        result: ProviderResult<QuoteSubmission>,
    ) -> ApplicationResult<()> {
        let request_id = round.request_id;
        let at = round.at();

        let submission = match result {
            Ok(submission) => submission,
            Err(error) => {
                warn!(%provider, %error, retryable = error.is_retryable(), "provider failed");
                let reason = error.to_string();
                let recorded = self
                    .record(
                        request_id,
                        RequestTransition::ProviderUnreachable(provider, reason.clone()),
                        at,
                    )
                    .await?;
                let outcome = if recorded.is_some() {
                    DispatchOutcome::Unreachable { reason }
                } else {
                    DispatchOutcome::Discarded
                };
                let state = self.current_state(request_id, recorded).await?;
                round.emit(provider, outcome, state).await;
                return Ok(());
            }
        };

        let quote = match self
            .quotes
            .find_by_request_and_provider(request_id, provider)
            .await?
        {
            Some(mut existing) => existing.resubmit(&submission, at).map(|()| existing),
            None => Quote::from_submission(&submission, request_id, round.part_id, provider, at),
        };

        let quote = match quote {
            Ok(quote) => quote,
            Err(error) => {
                let reason = error.to_string();
                warn!(%provider, %reason, "quote rejected");
                let recorded = match error {
                    DomainError::InvalidQuote(_) => {
                        self.record(
                            request_id,
                            RequestTransition::ProviderUnreachable(provider, reason.clone()),
                            at,
                        )
                        .await?
                    }
                    _ => None,
                };
                let state = self.current_state(request_id, recorded).await?;
                round.emit(provider, DispatchOutcome::Rejected { reason }, state).await;
                return Ok(());
            }
        };

        let Some(state) = self
            .record(request_id, RequestTransition::ProviderResponded(provider), at)
            .await?
        else {
            let state = self.current_state(request_id, None).await?;
            round.emit(provider, DispatchOutcome::Discarded, state).await;
            return Ok(());
        };

        let inserted = self.quotes.upsert(&quote).await?;
        info!(
            %provider,
            quote_id = %quote.id(),
            total = %quote.total_cost(),
            update = !inserted,
            "quote stored"
        );
        round
            .emit(
                provider,
                DispatchOutcome::Quoted {
                    quote_id: quote.id(),
                    total: quote.total_cost(),
                },
                state,
            )
            .await;
        Ok(())
    }

    /// Records a provider outcome; `None` if the request no longer accepts it.
    async fn record(
        &self,
        request_id: QuoteRequestId,
        transition: RequestTransition,
        at: Timestamp,
    ) -> ApplicationResult<Option<RequestState>> {
        match self.manager.transition(request_id, transition, at).await {
            Ok(request) => Ok(Some(request.state())),
            Err(ApplicationError::Domain(DomainError::InvalidStateTransition { from, .. })) => {
                debug!(%request_id, state = %from, "outcome discarded");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn current_state(
        &self,
        request_id: QuoteRequestId,
        known: Option<RequestState>,
    ) -> ApplicationResult<RequestState> {
        match known {
            Some(state) => Ok(state),
            None => Ok(self.manager.get(request_id).await?.state()),
        }
    }
}

/// Calls an adapter under its own timeout.
async fn call(
    adapter: &Arc<dyn ProviderAdapter>,
    request: &ProviderRequest,
) -> ProviderResult<QuoteSubmission> {
    let limit = adapter.timeout();
    match timeout(limit, adapter.submit(request)).await {
        Ok(result) => result,
        Err(_) => {
            let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            Err(ProviderError::timeout_with_duration(
                format!("{} did not answer in time", adapter.provider_type()),
                ms,
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::entities::DamagedPart;
    use crate::domain::value_objects::{
        AssessmentId, DamageSeverity, PartCategory, ProviderSelection, QualityTier,
        VehicleContext,
    };
    use crate::infrastructure::persistence::in_memory::{
        InMemoryDamagedPartRepository, InMemoryEventStore, InMemoryQuoteRepository,
        InMemoryQuoteRequestRepository,
    };
    use crate::infrastructure::pricing::PricingCatalog;
    use crate::infrastructure::providers::{AssessorAdapter, AssessorTerms};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use tokio_stream::StreamExt;

    #[derive(Debug, Clone)]
    enum Behavior {
        Quote { total: i64, declared: i64 },
        Fail(ProviderError),
    }

    #[derive(Debug)]
    struct MockAdapter {
        provider: ProviderType,
        behavior: Behavior,
        delay: Duration,
        timeout: Duration,
    }

    impl MockAdapter {
        fn quoting(provider: ProviderType, total: i64) -> Self {
            Self {
                provider,
                behavior: Behavior::Quote {
                    total,
                    declared: total,
                },
                delay: Duration::ZERO,
                timeout: Duration::from_secs(5),
            }
        }

        fn failing(provider: ProviderType, error: ProviderError) -> Self {
            Self {
                behavior: Behavior::Fail(error),
                ..Self::quoting(provider, 0)
            }
        }

        fn misdeclared(provider: ProviderType, total: i64, declared: i64) -> Self {
            Self {
                behavior: Behavior::Quote { total, declared },
                ..Self::quoting(provider, total)
            }
        }

        fn delayed(mut self, delay_ms: u64, timeout_ms: u64) -> Self {
            self.delay = Duration::from_millis(delay_ms);
            self.timeout = Duration::from_millis(timeout_ms);
            self
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        fn provider_type(&self) -> ProviderType {
            self.provider
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn submit(&self, request: &ProviderRequest) -> ProviderResult<QuoteSubmission> {
            tokio::time::sleep(self.delay).await;
            match &self.behavior {
                Behavior::Fail(error) => Err(error.clone()),
                Behavior::Quote { total, declared } => Ok(QuoteSubmission {
                    request_id: request.request_id,
                    provider_name: format!("{} garage", self.provider),
                    part_cost: Decimal::new(*total, 0),
                    labor_cost: Decimal::ZERO,
                    paint_cost: Decimal::ZERO,
                    additional_cost: Decimal::ZERO,
                    total_cost: Decimal::new(*declared, 0),
                    quality_tier: QualityTier::Oem,
                    warranty_months: 12,
                    delivery_days: 2,
                    completion_days: 4,
                    confidence: 90,
                    valid_until: request.issued_at.add_days(30),
                }),
            }
        }
    }

    struct Fixture {
        dispatcher: Arc<ProviderDispatcher>,
        manager: Arc<QuoteRequestManager>,
        quotes: InMemoryQuoteRepository,
        request_id: QuoteRequestId,
    }

    async fn fixture(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        selection: &[ProviderType],
        config: DispatchConfig,
    ) -> Fixture {
        let parts = InMemoryDamagedPartRepository::new();
        let quotes = InMemoryQuoteRepository::new();
        let manager = Arc::new(QuoteRequestManager::new(
            Arc::new(InMemoryQuoteRequestRepository::new()),
            Arc::new(InMemoryEventStore::new()),
            7,
        ));
        let mut registry = ProviderRegistry::new();
        for adapter in adapters {
            registry.register(adapter);
        }

        let part = DamagedPart::new(
            AssessmentId::new_v4(),
            vec!["front".into()],
            "Front Bumper",
            PartCategory::Body,
            DamageSeverity::Severe,
            "cracked",
            false,
            Decimal::new(3, 0),
        )
        .unwrap();
        parts.save(&part).await.unwrap();
        let request = manager
            .create_request(
                &part,
                VehicleContext::new("Toyota", "Corolla", 2020).unwrap(),
                ProviderSelection::new(selection.iter().copied()).unwrap(),
                None,
                Timestamp::now(),
            )
            .await
            .unwrap();

        let dispatcher = Arc::new(ProviderDispatcher::new(
            registry,
            Arc::clone(&manager),
            Arc::new(parts),
            Arc::new(quotes.clone()),
            config,
        ));
        Fixture {
            dispatcher,
            manager,
            quotes,
            request_id: request.id(),
        }
    }

    fn assessor() -> Arc<dyn ProviderAdapter> {
        Arc::new(AssessorAdapter::new(
            Arc::new(PricingCatalog::default()),
            AssessorTerms::default(),
        ))
    }

    mod collection {
        use super::*;

        #[tokio::test]
        async fn every_provider_quotes_and_request_is_received() {
            let f = fixture(
                vec![
                    assessor(),
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100)),
                    Arc::new(MockAdapter::quoting(ProviderType::Network, 700)),
                ],
                &[ProviderType::Assessor, ProviderType::Dealer, ProviderType::Network],
                DispatchConfig::default(),
            )
            .await;

            let summary = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert_eq!(summary.state, RequestState::Received);
            assert_eq!(summary.quoted_count(), 3);
            assert_eq!(summary.updates[0].provider, ProviderType::Assessor);
            assert!(summary.open_providers.is_empty());
            assert_eq!(f.quotes.len().await, 3);
            assert!(!f.dispatcher.is_in_flight(f.request_id));
        }

        #[tokio::test]
        async fn failing_provider_is_unreachable() {
            let f = fixture(
                vec![
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100)),
                    Arc::new(MockAdapter::failing(
                        ProviderType::Network,
                        ProviderError::connection("refused"),
                    )),
                ],
                &[ProviderType::Dealer, ProviderType::Network],
                DispatchConfig::default(),
            )
            .await;

            let summary = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert_eq!(summary.state, RequestState::Received);
            assert!(matches!(
                summary.outcome_for(ProviderType::Network),
                Some(DispatchOutcome::Unreachable { reason }) if reason.contains("refused")
            ));
        }

        #[tokio::test]
        async fn mismatched_total_is_rejected_and_not_stored() {
            let f = fixture(
                vec![
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100)),
                    Arc::new(MockAdapter::misdeclared(ProviderType::Independent, 500, 450)),
                ],
                &[ProviderType::Dealer, ProviderType::Independent],
                DispatchConfig::default(),
            )
            .await;

            let summary = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert_eq!(summary.state, RequestState::Received);
            assert!(matches!(
                summary.outcome_for(ProviderType::Independent),
                Some(DispatchOutcome::Rejected { .. })
            ));
            assert_eq!(f.quotes.len().await, 1);
            let request = f.manager.get(f.request_id).await.unwrap();
            assert_eq!(request.unreachable_count(), 1);
        }

        #[tokio::test]
        async fn slow_adapter_times_out_individually() {
            let f = fixture(
                vec![
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100)),
                    Arc::new(MockAdapter::quoting(ProviderType::Network, 700).delayed(500, 20)),
                ],
                &[ProviderType::Dealer, ProviderType::Network],
                DispatchConfig::default(),
            )
            .await;

            let summary = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert!(!summary.timed_out);
            assert!(matches!(
                summary.outcome_for(ProviderType::Network),
                Some(DispatchOutcome::Unreachable { reason }) if reason.contains("timeout")
            ));
            assert_eq!(summary.state, RequestState::Received);
        }

        #[tokio::test]
        async fn wait_bound_leaves_slow_provider_open() {
            let f = fixture(
                vec![
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100)),
                    Arc::new(MockAdapter::quoting(ProviderType::Network, 700).delayed(2_000, 5_000)),
                ],
                &[ProviderType::Dealer, ProviderType::Network],
                DispatchConfig::with_max_wait(100),
            )
            .await;

            let summary = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert!(summary.timed_out);
            assert_eq!(summary.state, RequestState::Collecting);
            assert_eq!(summary.open_providers, vec![ProviderType::Network]);
        }

        #[tokio::test]
        async fn provider_without_adapter_is_unreachable() {
            let f = fixture(
                vec![Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100))],
                &[ProviderType::Dealer, ProviderType::Independent],
                DispatchConfig::default(),
            )
            .await;

            let summary = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert_eq!(
                summary.outcome_for(ProviderType::Independent),
                Some(&DispatchOutcome::Unreachable {
                    reason: NO_ADAPTER_REASON.into()
                })
            );
            assert_eq!(summary.state, RequestState::Received);
        }

        #[tokio::test]
        async fn redispatch_updates_existing_quote() {
            let f = fixture(
                vec![
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100)),
                    Arc::new(MockAdapter::quoting(ProviderType::Network, 700).delayed(2_000, 5_000)),
                ],
                &[ProviderType::Dealer, ProviderType::Network],
                DispatchConfig::with_max_wait(50),
            )
            .await;

            let first = f.dispatcher.dispatch(f.request_id, Timestamp::now()).await.unwrap();
            let second = f.dispatcher.dispatch(f.request_id, Timestamp::now()).await.unwrap();
            assert!(first.timed_out && second.timed_out);
            // Only the open provider is asked again.
            assert!(second.outcome_for(ProviderType::Dealer).is_none());
            assert_eq!(f.quotes.len().await, 1);
        }
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn stream_yields_local_outcome_first() {
            let f = fixture(
                vec![
                    assessor(),
                    Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100).delayed(30, 1_000)),
                ],
                &[ProviderType::Assessor, ProviderType::Dealer],
                DispatchConfig::default(),
            )
            .await;

            let stream = f
                .dispatcher
                .dispatch_stream(f.request_id, Timestamp::now())
                .await
                .unwrap();
            let updates: Vec<DispatchUpdate> = stream.collect().await;
            assert_eq!(updates.len(), 2);
            assert_eq!(updates[0].provider, ProviderType::Assessor);
            assert_eq!(updates[1].provider, ProviderType::Dealer);
            assert_eq!(updates[1].state, RequestState::Received);
        }

        #[tokio::test]
        async fn concurrent_dispatch_of_same_request_conflicts() {
            let f = fixture(
                vec![Arc::new(
                    MockAdapter::quoting(ProviderType::Dealer, 1100).delayed(200, 1_000),
                )],
                &[ProviderType::Dealer],
                DispatchConfig::default(),
            )
            .await;

            let stream = f
                .dispatcher
                .dispatch_stream(f.request_id, Timestamp::now())
                .await
                .unwrap();
            let err = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap_err();
            assert!(err.is_conflict());
            let _: Vec<DispatchUpdate> = stream.collect().await;
        }

        #[tokio::test]
        async fn cancel_discards_pending_outcomes() {
            let f = fixture(
                vec![Arc::new(
                    MockAdapter::quoting(ProviderType::Dealer, 1100).delayed(300, 1_000),
                )],
                &[ProviderType::Dealer],
                DispatchConfig::default(),
            )
            .await;

            let stream = f
                .dispatcher
                .dispatch_stream(f.request_id, Timestamp::now())
                .await
                .unwrap();
            let cancelled = f
                .dispatcher
                .cancel(f.request_id, Timestamp::now())
                .await
                .unwrap();
            assert_eq!(cancelled.state(), RequestState::Cancelled);

            let updates: Vec<DispatchUpdate> = stream.collect().await;
            assert_eq!(updates.len(), 1);
            assert_eq!(updates[0].outcome, DispatchOutcome::Discarded);
            assert!(f.quotes.is_empty().await);
        }

        #[tokio::test]
        async fn cancelled_request_cannot_be_dispatched() {
            let f = fixture(
                vec![Arc::new(MockAdapter::quoting(ProviderType::Dealer, 1100))],
                &[ProviderType::Dealer],
                DispatchConfig::default(),
            )
            .await;
            f.manager.cancel(f.request_id, Timestamp::now()).await.unwrap();
            let err = f
                .dispatcher
                .dispatch(f.request_id, Timestamp::now())
                .await
                .unwrap_err();
            assert!(err.is_conflict());
            assert!(!f.dispatcher.is_in_flight(f.request_id));
        }
    }
}
