//! # Assessment Workflow
//!
//! End-to-end use case: raw observations in, [`AssessmentReport`] out.
//!
//! 1. aggregate observations into damaged parts and store them
//! 2. open one quote request per part
//! 3. dispatch every part concurrently
//! 4. lock the parts and build the report from one snapshot of the quote store
//!
//! Re-running an assessment with the same observations reuses the stored
//! parts and their active requests. A failed statistic for one part is a
//! status in the report and never hides the other parts.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::{
    DEFAULT_EXPIRY_DAYS, DispatchConfig, ProviderDispatcher, QuoteRequestManager,
    RecommendationEngine, RecommendationError,
};
use crate::domain::entities::{
    AssessmentRecommendation, DamagedPart, PartMarketAverage, ProviderCoverage, Quote,
    QuoteRequest, RankedQuote, RawObservation,
};
use crate::domain::errors::DomainError;
use crate::domain::services::{MarketAverageCalculator, MarketAverageError, PartAggregator};
use crate::domain::value_objects::{
    AssessmentId, DamagedPartId, ProviderSelection, ProviderType, QuoteRequestId, RequestState,
    ScoringWeights, Timestamp, VehicleContext,
};
use crate::infrastructure::persistence::in_memory::{
    InMemoryDamagedPartRepository, InMemoryEventStore, InMemoryQuoteRepository,
    InMemoryQuoteRequestRepository,
};
use crate::infrastructure::persistence::{DamagedPartRepository, QuoteRepository};
use crate::infrastructure::providers::ProviderRegistry;
use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn all_providers() -> Vec<ProviderType> {
    ProviderType::ALL.to_vec()
}

/// Input of one assessment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentInput {
    /// Assessment the observations belong to.
    pub assessment_id: AssessmentId,
    /// Vehicle under assessment.
    pub vehicle: VehicleContext,
    /// Raw per-section observations.
    pub observations: Vec<RawObservation>,
    /// Channels to ask; all four by default.
    #[serde(default = "all_providers")]
    pub providers: Vec<ProviderType>,
    /// Request expiry window in days; the configured default when absent.
    #[serde(default)]
    pub expiry_days: Option<u32>,
}

/// Lifecycle view of a part's latest quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestSummary {
    /// Request id.
    pub request_id: QuoteRequestId,
    /// Current state.
    pub state: RequestState,
    /// Providers that have not resolved.
    pub open_providers: Vec<ProviderType>,
    /// Expiry deadline.
    pub expires_at: Timestamp,
}

impl From<&QuoteRequest> for RequestSummary {
    fn from(request: &QuoteRequest) -> Self {
        Self {
            request_id: request.id(),
            state: request.state(),
            open_providers: request.open_providers(),
            expires_at: request.expires_at(),
        }
    }
}

/// Market statistics of a part, or why there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarketAverageStatus {
    /// Enough valid quotes.
    Computed(PartMarketAverage),
    /// Too few valid quotes.
    InsufficientData {
        /// Valid quotes found.
        found: usize,
        /// Minimum required.
        required: usize,
    },
}

/// Quotes and statistics of one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartQuoteListing {
    /// The damaged part.
    pub part: DamagedPart,
    /// Latest quote request of the part.
    pub request: Option<RequestSummary>,
    /// Current valid quotes, best first.
    pub quotes: Vec<RankedQuote>,
    /// Market statistics.
    pub market_average: MarketAverageStatus,
}

/// Recommendation outcome of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationStatus {
    /// A provider covers every part.
    Recommended(AssessmentRecommendation),
    /// No provider covers every part.
    PartialCoverage {
        /// Parts in the assessment.
        total_parts: usize,
        /// Covered part count per channel.
        coverage: Vec<ProviderCoverage>,
    },
    /// Some requests are still open; no recommendation yet.
    AwaitingQuotes {
        /// Requests not yet received or expired.
        open: Vec<RequestSummary>,
    },
}

impl RecommendationStatus {
    /// The recommendation, if one was made.
    #[must_use]
    pub fn recommendation(&self) -> Option<&AssessmentRecommendation> {
        match self {
            Self::Recommended(rec) => Some(rec),
            Self::PartialCoverage { .. } | Self::AwaitingQuotes { .. } => None,
        }
    }
}

/// Assessment report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentReport {
    /// Assessment reported on.
    pub assessment_id: AssessmentId,
    /// Per-part listings in aggregation order.
    pub parts: Vec<PartQuoteListing>,
    /// Assessment-level outcome.
    pub recommendation: RecommendationStatus,
    /// Instant the report is valid for.
    pub generated_at: Timestamp,
}

impl AssessmentReport {
    /// Listing of a part.
    #[must_use]
    pub fn part(&self, part_id: DamagedPartId) -> Option<&PartQuoteListing> {
        self.parts.iter().find(|l| l.part.id() == part_id)
    }
}

/// Tunables of the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// Request expiry window in days.
    pub default_expiry_days: u32,
    /// Minimum valid quotes for market statistics.
    pub min_quotes: usize,
    /// Recommendation weights.
    pub weights: ScoringWeights,
    /// Dispatch bounds.
    pub dispatch: DispatchConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: DEFAULT_EXPIRY_DAYS,
            min_quotes: 2,
            weights: ScoringWeights::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

/// The assessment use case.
#[derive(Debug)]
pub struct AssessmentWorkflow {
    parts: Arc<dyn DamagedPartRepository>,
    quotes: Arc<dyn QuoteRepository>,
    manager: Arc<QuoteRequestManager>,
    dispatcher: Arc<ProviderDispatcher>,
    calculator: MarketAverageCalculator,
    engine: RecommendationEngine,
}

impl AssessmentWorkflow {
    /// Creates a workflow over existing services.
    #[must_use]
    pub fn new(
        parts: Arc<dyn DamagedPartRepository>,
        quotes: Arc<dyn QuoteRepository>,
        manager: Arc<QuoteRequestManager>,
        dispatcher: Arc<ProviderDispatcher>,
        calculator: MarketAverageCalculator,
        engine: RecommendationEngine,
    ) -> Self {
        Self {
            parts,
            quotes,
            manager,
            dispatcher,
            calculator,
            engine,
        }
    }

    /// Wires a workflow over in-memory storage.
    #[must_use]
    pub fn in_memory(registry: ProviderRegistry, config: &WorkflowConfig) -> Self {
        let parts: Arc<dyn DamagedPartRepository> = Arc::new(InMemoryDamagedPartRepository::new());
        let quotes: Arc<dyn QuoteRepository> = Arc::new(InMemoryQuoteRepository::new());
        let manager = Arc::new(QuoteRequestManager::new(
            Arc::new(InMemoryQuoteRequestRepository::new()),
            Arc::new(InMemoryEventStore::new()),
            config.default_expiry_days,
        ));
        let dispatcher = Arc::new(ProviderDispatcher::new(
            registry,
            Arc::clone(&manager),
            Arc::clone(&parts),
            Arc::clone(&quotes),
            config.dispatch,
        ));
        Self::new(
            parts,
            quotes,
            manager,
            dispatcher,
            MarketAverageCalculator::new(config.min_quotes),
            RecommendationEngine::new(config.weights),
        )
    }

    /// Request manager in use.
    #[must_use]
    pub fn manager(&self) -> &Arc<QuoteRequestManager> {
        &self.manager
    }

    /// Dispatcher in use.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<ProviderDispatcher> {
        &self.dispatcher
    }

    /// Runs an assessment and reports on it at `now`.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::Validation` for invalid observations, an empty
    ///   provider list or no parts at all
    /// - `ApplicationError::Conflict` if a locked part would change
    /// - `ApplicationError::Repository` if storage fails
    pub async fn run(
        &self,
        input: &AssessmentInput,
        now: Timestamp,
    ) -> ApplicationResult<AssessmentReport> {
        let assessment_id = input.assessment_id;
        let selection = ProviderSelection::new(input.providers.iter().copied())?;
        let window = input
            .expiry_days
            .map(|days| chrono::Duration::days(i64::from(days)));

        let parts = PartAggregator::aggregate(assessment_id, &input.observations)?;
        if parts.is_empty() {
            return Err(ApplicationError::validation(
                "assessment has no damaged parts",
            ));
        }
        info!(
            %assessment_id,
            observations = input.observations.len(),
            parts = parts.len(),
            "running assessment"
        );

        let mut opened = Vec::with_capacity(parts.len());
        for part in &parts {
            let part = self.store_part(part).await?;
            let request = match self.manager.active_request_for(part.id(), now).await? {
                Some(request) => request,
                None => {
                    self.manager
                        .create_request(&part, input.vehicle.clone(), selection, window, now)
                        .await?
                }
            };
            opened.push((part, request.id()));
        }

        let rounds = join_all(
            opened
                .iter()
                .map(|(_, request_id)| self.dispatcher.dispatch(*request_id, now)),
        )
        .await;

        for ((part, request_id), round) in opened.into_iter().zip(rounds) {
            match round {
                Ok(summary) => debug!(
                    %request_id,
                    part_id = %part.id(),
                    state = %summary.state,
                    quoted = summary.quoted_count(),
                    "part dispatched"
                ),
                Err(e) if e.is_conflict() => {
                    warn!(%request_id, part_id = %part.id(), error = %e, "part not dispatched");
                }
                Err(e) => return Err(e),
            }
            self.lock_part(part).await?;
        }

        self.report(assessment_id, now).await
    }

    /// Builds the report of an assessment at `as_of`.
    ///
    /// Due requests and quotes past their validity are expired and stored
    /// first; quotes are read once. The recommendation waits until every
    /// part's latest request is received or expired.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::NotFound` for an unknown assessment
    /// - `ApplicationError::Repository` if storage fails
    pub async fn report(
        &self,
        assessment_id: AssessmentId,
        as_of: Timestamp,
    ) -> ApplicationResult<AssessmentReport> {
        let parts = self.parts.find_by_assessment(assessment_id).await?;
        if parts.is_empty() {
            return Err(ApplicationError::not_found(
                "Assessment",
                assessment_id.to_string(),
            ));
        }
        let expired = self.manager.sweep_expired(assessment_id, as_of).await?;
        if expired > 0 {
            info!(%assessment_id, expired, "expired due quote requests");
        }

        let part_ids: Vec<DamagedPartId> = parts.iter().map(DamagedPart::id).collect();
        let snapshot = self.quotes.expire_and_snapshot(&part_ids, as_of).await?;

        let mut listings = Vec::with_capacity(parts.len());
        for part in &parts {
            let current = current_quotes(&snapshot, part.id(), as_of);
            let market_average = match self.calculator.calculate(part.id(), &current, as_of) {
                Ok(average) => MarketAverageStatus::Computed(average),
                Err(MarketAverageError::InsufficientData { found, required }) => {
                    debug!(part_id = %part.id(), found, required, "insufficient quotes for statistics");
                    MarketAverageStatus::InsufficientData { found, required }
                }
                Err(e) => return Err(e.into()),
            };
            let request = self
                .manager
                .latest_request(part.id())
                .await?
                .as_ref()
                .map(RequestSummary::from);
            listings.push(PartQuoteListing {
                part: part.clone(),
                request,
                quotes: self.engine.rank_part_quotes(&current),
                market_average,
            });
        }

        let open: Vec<RequestSummary> = listings
            .iter()
            .filter_map(|l| l.request.clone())
            .filter(|r| !matches!(r.state, RequestState::Received | RequestState::Expired))
            .collect();
        if !open.is_empty() {
            info!(%assessment_id, open = open.len(), "awaiting quotes");
            return Ok(AssessmentReport {
                assessment_id,
                parts: listings,
                recommendation: RecommendationStatus::AwaitingQuotes { open },
                generated_at: as_of,
            });
        }

        let recommendation = match self.engine.recommend(&parts, &snapshot, as_of) {
            Ok(recommendation) => {
                info!(
                    %assessment_id,
                    provider = %recommendation.recommended_provider,
                    total = %recommendation.recommended_total,
                    "provider recommended"
                );
                RecommendationStatus::Recommended(recommendation)
            }
            Err(RecommendationError::PartialCoverage {
                total_parts,
                coverage,
            }) => {
                warn!(%assessment_id, total_parts, "no provider covers every part");
                RecommendationStatus::PartialCoverage {
                    total_parts,
                    coverage,
                }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(AssessmentReport {
            assessment_id,
            parts: listings,
            recommendation,
            generated_at: as_of,
        })
    }

    async fn store_part(&self, part: &DamagedPart) -> ApplicationResult<DamagedPart> {
        match self.parts.get(part.id()).await? {
            Some(existing) if existing.is_locked() => {
                if existing.content_differs(part) {
                    return Err(DomainError::PartLocked(format!(
                        "{} changed while its quotes are outstanding",
                        part.part_name()
                    ))
                    .into());
                }
                Ok(existing)
            }
            _ => {
                self.parts.save(part).await?;
                Ok(part.clone())
            }
        }
    }

    async fn lock_part(&self, mut part: DamagedPart) -> ApplicationResult<()> {
        if !part.is_locked() {
            part.lock();
            self.parts.save(&part).await?;
        }
        Ok(())
    }
}

/// Valid quotes of a part, the latest per provider, in provider order.
fn current_quotes(snapshot: &[Quote], part_id: DamagedPartId, as_of: Timestamp) -> Vec<Quote> {
    let mut latest: BTreeMap<ProviderType, &Quote> = BTreeMap::new();
    for quote in snapshot
        .iter()
        .filter(|q| q.part_id() == part_id && q.is_valid_at(as_of))
    {
        let newer = latest
            .get(&quote.provider_type())
            .is_none_or(|held| (quote.updated_at(), quote.id()) > (held.updated_at(), held.id()));
        if newer {
            latest.insert(quote.provider_type(), quote);
        }
    }
    latest.into_values().cloned().collect()
}
