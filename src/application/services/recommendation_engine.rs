//! # Recommendation Engine
//!
//! Multi-criteria scoring of provider quotes.
//!
//! Five 0-100 sub-scores are combined with the configured
//! [`ScoringWeights`]:
//!
//! | Criterion   | Rule                                                    |
//! |-------------|---------------------------------------------------------|
//! | price       | linear inverse-normalized between min and max total     |
//! | quality     | mean tier value (oem 100, equivalent 85, after 70, used 50) |
//! | timeline    | mean completion days: <=3 100, <=7 80, <=14 60, else 40 |
//! | warranty    | mean months: >=24 100, >=12 70, >=6 50, else 30         |
//! | reliability | channel baseline (dealer 95, network 90, assessor 85, independent 75) |
//!
//! At assessment level only providers with a valid quote for every part are
//! scored. When none qualifies the engine reports partial coverage instead
//! of recommending anything.

use crate::domain::entities::{
    AssessmentRecommendation, DamagedPart, ProviderCoverage, ProviderScore, Quote, RankedQuote,
    SubScores, TimelineStats,
};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::arithmetic::checked_mean;
use crate::domain::value_objects::{
    ArithmeticError, CheckedArithmetic, DamagedPartId, Money, ProviderType, ScoringWeights,
    Timestamp,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Composite scores closer than this are considered tied.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Price score at or above which the price is called out.
pub const PRICE_HIGHLIGHT: f64 = 70.0;
/// Quality score at or above which quality is called out.
pub const QUALITY_HIGHLIGHT: f64 = 85.0;
/// Timeline score at or above which speed is called out.
pub const TIMELINE_HIGHLIGHT: f64 = 80.0;
/// Warranty score at or above which the warranty is called out.
pub const WARRANTY_HIGHLIGHT: f64 = 70.0;
/// Reliability score at or above which reliability is called out.
pub const RELIABILITY_HIGHLIGHT: f64 = 90.0;

/// Fallback justification when no criterion stands out.
pub const BALANCED_JUSTIFICATION: &str = "best overall balance of price, quality and timeline";

/// Error type for assessment-level recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendationError {
    /// The assessment has no damaged parts.
    #[error("assessment has no damaged parts")]
    NoParts,

    /// No provider quoted every part.
    #[error("no provider covers all {total_parts} parts")]
    PartialCoverage {
        /// Parts in the assessment.
        total_parts: usize,
        /// Covered part count for every channel.
        coverage: Vec<ProviderCoverage>,
    },

    /// Invariant violation while aggregating totals.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<ArithmeticError> for RecommendationError {
    fn from(err: ArithmeticError) -> Self {
        Self::Domain(DomainError::Arithmetic(err))
    }
}

/// Result type for recommendation.
pub type RecommendationResult<T> = Result<T, RecommendationError>;

/// Price score of `value` within `[min, max]`; lower is better.
#[must_use]
pub fn price_score(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 {
        return 100.0;
    }
    (100.0 * (max - value) / range).clamp(0.0, 100.0)
}

/// Timeline band for a mean completion time in days.
#[must_use]
pub fn timeline_score(average_days: f64) -> f64 {
    match average_days {
        d if d <= 3.0 => 100.0,
        d if d <= 7.0 => 80.0,
        d if d <= 14.0 => 60.0,
        _ => 40.0,
    }
}

/// Warranty band for a mean warranty length in months.
#[must_use]
pub fn warranty_score(average_months: f64) -> f64 {
    match average_months {
        m if m >= 24.0 => 100.0,
        m if m >= 12.0 => 70.0,
        m if m >= 6.0 => 50.0,
        _ => 30.0,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_u32), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}

/// A scored option, a single quote or a provider's quote set.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    provider: ProviderType,
    total: Money,
    sub_scores: SubScores,
    composite: f64,
}

/// Highest composite first; ties go to the lowest total, then the most
/// reliable channel.
fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    let by_score = if (a.composite - b.composite).abs() <= SCORE_EPSILON {
        Ordering::Equal
    } else {
        b.composite.total_cmp(&a.composite)
    };
    by_score
        .then_with(|| a.total.cmp(&b.total))
        .then_with(|| {
            b.provider
                .reliability_score()
                .total_cmp(&a.provider.reliability_score())
        })
        .then_with(|| a.provider.cmp(&b.provider))
}

/// Weighted quote and provider scoring.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    weights: ScoringWeights,
}

impl RecommendationEngine {
    /// Creates an engine with validated weights.
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Weights in use.
    #[inline]
    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    fn sub_scores<'a>(
        &self,
        provider: ProviderType,
        total: f64,
        (min, max): (f64, f64),
        quotes: impl Iterator<Item = &'a Quote> + Clone,
    ) -> SubScores {
        SubScores {
            price: price_score(total, min, max),
            quality: mean(quotes.clone().map(|q| q.quality_tier().score())),
            timeline: timeline_score(mean(quotes.clone().map(|q| f64::from(q.completion_days())))),
            warranty: warranty_score(mean(quotes.map(|q| f64::from(q.warranty_months())))),
            reliability: provider.reliability_score(),
        }
    }

    /// Ranks the quotes of one part at quote level.
    ///
    /// Callers pass only quotes that are valid for the part; the price
    /// sub-score is normalized across exactly these quotes.
    #[must_use]
    pub fn rank_part_quotes(&self, quotes: &[Quote]) -> Vec<RankedQuote> {
        let totals: Vec<f64> = quotes.iter().map(|q| q.total_cost().to_f64()).collect();
        let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut scored: Vec<(Candidate, &Quote)> = quotes
            .iter()
            .map(|quote| {
                let sub_scores = self.sub_scores(
                    quote.provider_type(),
                    quote.total_cost().to_f64(),
                    (min, max),
                    std::iter::once(quote),
                );
                let candidate = Candidate {
                    provider: quote.provider_type(),
                    total: quote.total_cost(),
                    sub_scores,
                    composite: sub_scores.composite(&self.weights),
                };
                (candidate, quote)
            })
            .collect();
        scored.sort_by(|(a, qa), (b, qb)| {
            compare_candidates(a, b).then_with(|| qa.id().cmp(&qb.id()))
        });

        scored
            .into_iter()
            .enumerate()
            .map(|(index, (candidate, quote))| RankedQuote {
                quote: quote.clone(),
                rank: index + 1,
                score: candidate.composite,
                sub_scores: candidate.sub_scores,
            })
            .collect()
    }

    /// Produces the assessment-level recommendation.
    ///
    /// Only quotes valid at `as_of` for one of `parts` count. If a provider
    /// holds several valid quotes for one part (for example across an
    /// expired and a newer request) the most recently updated one is used.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError::NoParts` for an empty part list and
    /// `RecommendationError::PartialCoverage` if no provider quoted every
    /// part.
    pub fn recommend(
        &self,
        parts: &[DamagedPart],
        quotes: &[Quote],
        as_of: Timestamp,
    ) -> RecommendationResult<AssessmentRecommendation> {
        if parts.is_empty() {
            return Err(RecommendationError::NoParts);
        }
        let total_parts = parts.len();
        let part_ids: Vec<DamagedPartId> = parts.iter().map(DamagedPart::id).collect();
        let valid: Vec<&Quote> = quotes
            .iter()
            .filter(|q| q.is_valid_at(as_of) && part_ids.contains(&q.part_id()))
            .collect();
        let by_provider = latest_per_provider_and_part(&valid);

        let mut provider_totals = BTreeMap::new();
        let mut coverage = Vec::with_capacity(ProviderType::ALL.len());
        let mut covering: Vec<(ProviderType, Vec<&Quote>, Money)> = Vec::new();
        for provider in ProviderType::ALL {
            let chosen: Vec<&Quote> = by_provider
                .get(&provider)
                .map(|per_part| per_part.values().copied().collect())
                .unwrap_or_default();
            let total = Money::sum(chosen.iter().map(|q| q.total_cost()))?;
            provider_totals.insert(provider, total);
            let entry = ProviderCoverage {
                provider,
                covered_parts: chosen.len(),
                total_parts,
            };
            coverage.push(entry);
            if entry.is_full() {
                covering.push((provider, chosen, total));
            }
        }

        if covering.is_empty() {
            tracing::warn!(total_parts, "no provider covers every part");
            return Err(RecommendationError::PartialCoverage {
                total_parts,
                coverage,
            });
        }

        let partial_providers: Vec<ProviderCoverage> = coverage
            .iter()
            .filter(|c| c.covered_parts > 0 && !c.is_full())
            .copied()
            .collect();
        let market_average_total = market_average_total(&part_ids, &valid)?;

        let min = covering
            .iter()
            .map(|(_, _, total)| total.to_f64())
            .fold(f64::INFINITY, f64::min);
        let max = covering
            .iter()
            .map(|(_, _, total)| total.to_f64())
            .fold(f64::NEG_INFINITY, f64::max);

        let mut candidates: Vec<(Candidate, &[&Quote])> = covering
            .iter()
            .map(|(provider, chosen, total)| {
                let sub_scores =
                    self.sub_scores(*provider, total.to_f64(), (min, max), chosen.iter().copied());
                let candidate = Candidate {
                    provider: *provider,
                    total: *total,
                    sub_scores,
                    composite: sub_scores.composite(&self.weights),
                };
                (candidate, chosen.as_slice())
            })
            .collect();
        candidates.sort_by(|(a, _), (b, _)| compare_candidates(a, b));

        let scores: Vec<ProviderScore> = candidates
            .iter()
            .enumerate()
            .map(|(index, (candidate, chosen))| ProviderScore {
                provider: candidate.provider,
                aggregate_total: candidate.total,
                sub_scores: candidate.sub_scores,
                composite: candidate.composite,
                rank: index + 1,
                average_completion_days: mean(chosen.iter().map(|q| f64::from(q.completion_days()))),
                average_warranty_months: mean(chosen.iter().map(|q| f64::from(q.warranty_months()))),
            })
            .collect();

        let highest_total = covering
            .iter()
            .map(|(_, _, total)| *total)
            .max()
            .unwrap_or_default();
        let Some((best, best_quotes)) = candidates.first() else {
            return Err(RecommendationError::PartialCoverage {
                total_parts,
                coverage,
            });
        };
        let best_score = scores.first();
        let timeline = TimelineStats {
            average_days: best_score.map_or(0.0, |s| s.average_completion_days),
            min_days: best_quotes.iter().map(|q| q.completion_days()).min().unwrap_or(0),
            max_days: best_quotes.iter().map(|q| q.completion_days()).max().unwrap_or(0),
        };
        let justification = justify(
            &best.sub_scores,
            best.total,
            market_average_total,
            timeline.average_days,
            best_score.map_or(0.0, |s| s.average_warranty_months),
        );

        tracing::info!(
            provider = %best.provider,
            total = %best.total,
            composite = best.composite,
            covering = covering.len(),
            "provider recommended"
        );

        Ok(AssessmentRecommendation {
            provider_totals,
            market_average_total,
            recommended_provider: best.provider,
            recommended_total: best.total,
            justification,
            potential_savings: highest_total.saturating_sub(best.total),
            scores,
            partial_providers,
            timeline,
            calculated_at: as_of,
        })
    }
}

fn latest_per_provider_and_part<'a>(
    quotes: &[&'a Quote],
) -> BTreeMap<ProviderType, BTreeMap<DamagedPartId, &'a Quote>> {
    let mut map: BTreeMap<ProviderType, BTreeMap<DamagedPartId, &Quote>> = BTreeMap::new();
    for &quote in quotes {
        let slot = map
            .entry(quote.provider_type())
            .or_default()
            .entry(quote.part_id())
            .or_insert(quote);
        if (quote.updated_at(), quote.id()) > (slot.updated_at(), slot.id()) {
            *slot = quote;
        }
    }
    map
}

/// Sum over parts of the per-part mean total, each mean rounded to cents.
fn market_average_total(part_ids: &[DamagedPartId], quotes: &[&Quote]) -> RecommendationResult<Money> {
    let mut total = Decimal::ZERO;
    for part_id in part_ids {
        let totals: Vec<Decimal> = quotes
            .iter()
            .filter(|q| q.part_id() == *part_id)
            .map(|q| q.total_cost().get())
            .collect();
        if totals.is_empty() {
            continue;
        }
        total = total.safe_add(checked_mean(totals)?.round_dp(2))?;
    }
    Ok(Money::new(total)?)
}

fn justify(
    scores: &SubScores,
    total: Money,
    market_average: Money,
    average_days: f64,
    average_warranty: f64,
) -> String {
    let mut reasons = Vec::new();
    if scores.price >= PRICE_HIGHLIGHT {
        let market = market_average.to_f64();
        if market > 0.0 && total < market_average {
            let below = (market - total.to_f64()) / market * 100.0;
            reasons.push(format!("below market average by {below:.1}%"));
        } else {
            reasons.push("competitive pricing".to_string());
        }
    }
    if scores.quality >= QUALITY_HIGHLIGHT {
        reasons.push("high quality parts".to_string());
    }
    if scores.timeline >= TIMELINE_HIGHLIGHT {
        reasons.push(format!("fast completion ({average_days:.1} days average)"));
    }
    if scores.warranty >= WARRANTY_HIGHLIGHT {
        reasons.push(format!("{average_warranty:.0}-month average warranty"));
    }
    if scores.reliability >= RELIABILITY_HIGHLIGHT {
        reasons.push("highly reliable provider".to_string());
    }
    if reasons.is_empty() {
        BALANCED_JUSTIFICATION.to_string()
    } else {
        reasons.join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::entities::CostBreakdown;
    use crate::domain::value_objects::{
        AssessmentId, DamageSeverity, PartCategory, QualityTier, QuoteRequestId,
    };
    use proptest::prelude::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs).unwrap()
    }

    fn as_of() -> Timestamp {
        ts(1_700_000_000)
    }

    fn part(assessment: AssessmentId, name: &str) -> DamagedPart {
        DamagedPart::new(
            assessment,
            vec!["front".into()],
            name,
            PartCategory::Body,
            DamageSeverity::Moderate,
            String::new(),
            false,
            Decimal::ONE,
        )
        .unwrap()
    }

    fn quote(
        part: &DamagedPart,
        provider: ProviderType,
        total: u32,
        tier: QualityTier,
        warranty: u32,
        completion: u32,
    ) -> Quote {
        let costs = CostBreakdown::new(Money::from(total), Money::zero(), Money::zero(), Money::zero());
        Quote::builder(QuoteRequestId::new_v4(), part.id(), provider, costs, ts(1_800_000_000))
            .quality_tier(tier)
            .warranty_months(warranty)
            .completion_days(completion)
            .created_at(as_of())
            .build()
            .unwrap()
    }

    struct Fixture {
        parts: Vec<DamagedPart>,
        quotes: Vec<Quote>,
    }

    fn fixture() -> Fixture {
        let assessment = AssessmentId::new_v4();
        let hood = part(assessment, "Hood");
        let door = part(assessment, "Door");
        let quotes = vec![
            quote(&hood, ProviderType::Dealer, 500, QualityTier::Oem, 24, 5),
            quote(&door, ProviderType::Dealer, 700, QualityTier::Oem, 24, 5),
            quote(&hood, ProviderType::Independent, 300, QualityTier::Aftermarket, 6, 4),
            quote(&door, ProviderType::Independent, 400, QualityTier::Aftermarket, 6, 4),
            quote(&hood, ProviderType::Assessor, 400, QualityTier::OemEquivalent, 12, 3),
            quote(&door, ProviderType::Assessor, 500, QualityTier::OemEquivalent, 12, 3),
            quote(&hood, ProviderType::Network, 350, QualityTier::Oem, 12, 6),
        ];
        Fixture {
            parts: vec![hood, door],
            quotes,
        }
    }

    mod scoring_rules {
        use super::*;

        #[test]
        fn price_score_is_inverse_linear() {
            assert_eq!(price_score(700.0, 700.0, 1200.0), 100.0);
            assert_eq!(price_score(1200.0, 700.0, 1200.0), 0.0);
            assert_eq!(price_score(900.0, 700.0, 1200.0), 60.0);
            assert_eq!(price_score(5.0, 5.0, 5.0), 100.0);
        }

        #[test]
        fn timeline_bands() {
            assert_eq!(timeline_score(3.0), 100.0);
            assert_eq!(timeline_score(3.5), 80.0);
            assert_eq!(timeline_score(7.0), 80.0);
            assert_eq!(timeline_score(14.0), 60.0);
            assert_eq!(timeline_score(15.0), 40.0);
        }

        #[test]
        fn warranty_bands() {
            assert_eq!(warranty_score(24.0), 100.0);
            assert_eq!(warranty_score(12.0), 70.0);
            assert_eq!(warranty_score(6.0), 50.0);
            assert_eq!(warranty_score(5.9), 30.0);
        }

        #[test]
        fn ties_break_on_total_then_reliability() {
            let scores = SubScores::default();
            let cheap = Candidate {
                provider: ProviderType::Independent,
                total: Money::from(100),
                sub_scores: scores,
                composite: 80.0,
            };
            let pricey = Candidate {
                provider: ProviderType::Dealer,
                total: Money::from(200),
                ..cheap
            };
            assert_eq!(compare_candidates(&cheap, &pricey), Ordering::Less);

            let dealer = Candidate {
                provider: ProviderType::Dealer,
                ..cheap
            };
            assert_eq!(compare_candidates(&dealer, &cheap), Ordering::Less);
        }
    }

    mod assessment {
        use super::*;

        #[test]
        fn recommends_best_composite_among_covering_providers() {
            let f = fixture();
            let engine = RecommendationEngine::default();
            let rec = engine.recommend(&f.parts, &f.quotes, as_of()).unwrap();

            assert_eq!(rec.recommended_provider, ProviderType::Independent);
            assert_eq!(rec.recommended_total, Money::from(700));
            assert_eq!(rec.potential_savings, Money::from(500));
            assert_eq!(rec.scores.len(), 3);
            assert_eq!(rec.scores[0].provider, ProviderType::Independent);
            assert!((rec.scores[0].composite - 82.0).abs() < 1e-9);
            assert_eq!(rec.scores[1].provider, ProviderType::Assessor);
            assert!((rec.scores[1].composite - 75.75).abs() < 1e-9);
            assert_eq!(rec.scores[2].provider, ProviderType::Dealer);
            assert!((rec.scores[2].composite - 56.5).abs() < 1e-9);
        }

        #[test]
        fn totals_include_every_channel() {
            let f = fixture();
            let rec = RecommendationEngine::default()
                .recommend(&f.parts, &f.quotes, as_of())
                .unwrap();
            assert_eq!(rec.provider_totals.len(), 4);
            assert_eq!(rec.provider_totals[&ProviderType::Network], Money::from(350));
            assert_eq!(rec.provider_totals[&ProviderType::Dealer], Money::from(1200));
            assert_eq!(
                rec.market_average_total,
                Money::new(Decimal::new(92083, 2)).unwrap()
            );
        }

        #[test]
        fn partial_providers_are_listed() {
            let f = fixture();
            let rec = RecommendationEngine::default()
                .recommend(&f.parts, &f.quotes, as_of())
                .unwrap();
            assert_eq!(rec.partial_providers.len(), 1);
            assert_eq!(rec.partial_providers[0].provider, ProviderType::Network);
            assert_eq!(rec.partial_providers[0].covered_parts, 1);
        }

        #[test]
        fn justification_names_standout_criteria() {
            let f = fixture();
            let rec = RecommendationEngine::default()
                .recommend(&f.parts, &f.quotes, as_of())
                .unwrap();
            assert_eq!(
                rec.justification,
                "below market average by 24.0%, fast completion (4.0 days average)"
            );
            assert_eq!(rec.timeline.min_days, 4);
            assert_eq!(rec.timeline.max_days, 4);
        }

        #[test]
        fn no_full_coverage_is_reported() {
            let f = fixture();
            let only_network: Vec<Quote> = f
                .quotes
                .iter()
                .filter(|q| q.provider_type() == ProviderType::Network)
                .cloned()
                .collect();
            let err = RecommendationEngine::default()
                .recommend(&f.parts, &only_network, as_of())
                .unwrap_err();
            match err {
                RecommendationError::PartialCoverage {
                    total_parts,
                    coverage,
                } => {
                    assert_eq!(total_parts, 2);
                    assert_eq!(coverage.len(), 4);
                    assert!(coverage.iter().all(|c| !c.is_full()));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn no_parts_is_an_error() {
            let err = RecommendationEngine::default()
                .recommend(&[], &[], as_of())
                .unwrap_err();
            assert_eq!(err, RecommendationError::NoParts);
        }

        #[test]
        fn expired_quotes_do_not_count() {
            let f = fixture();
            let late = ts(1_900_000_000);
            let err = RecommendationEngine::default()
                .recommend(&f.parts, &f.quotes, late)
                .unwrap_err();
            assert!(matches!(err, RecommendationError::PartialCoverage { .. }));
        }

        #[test]
        fn single_covering_provider_gets_full_price_score() {
            let f = fixture();
            let dealer: Vec<Quote> = f
                .quotes
                .iter()
                .filter(|q| q.provider_type() == ProviderType::Dealer)
                .cloned()
                .collect();
            let rec = RecommendationEngine::default()
                .recommend(&f.parts, &dealer, as_of())
                .unwrap();
            assert_eq!(rec.scores[0].sub_scores.price, 100.0);
            assert_eq!(rec.potential_savings, Money::zero());
            assert!(rec.justification.contains("highly reliable provider"));
            assert!(rec.justification.contains("24-month average warranty"));
            assert!(rec.justification.contains("high quality parts"));
        }
    }

    mod part_ranking {
        use super::*;

        #[test]
        fn ranks_quotes_of_one_part() {
            let f = fixture();
            let hood_quotes: Vec<Quote> = f
                .quotes
                .iter()
                .filter(|q| q.part_id() == f.parts[0].id())
                .cloned()
                .collect();
            let ranked = RecommendationEngine::default().rank_part_quotes(&hood_quotes);
            assert_eq!(ranked.len(), 4);
            assert_eq!(ranked[0].rank, 1);
            assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score - SCORE_EPSILON));
            // network: 30 + 25 + 12 + 7 + 9 beats the cheapest quote
            assert_eq!(ranked[0].quote.provider_type(), ProviderType::Network);
            assert!((ranked[0].score - 83.0).abs() < 1e-9);
            assert_eq!(ranked[1].quote.total_cost(), Money::from(300));
            assert_eq!(ranked[1].sub_scores.price, 100.0);
            assert_eq!(ranked[3].quote.provider_type(), ProviderType::Dealer);
        }

        #[test]
        fn empty_input_yields_nothing() {
            assert!(RecommendationEngine::default().rank_part_quotes(&[]).is_empty());
        }
    }

    proptest! {
        #[test]
        fn composite_is_monotonic_in_price(
            low in 0.0f64..=100.0,
            bump in 0.0f64..=100.0,
            quality in 0.0f64..=100.0,
            timeline in 0.0f64..=100.0,
            warranty in 0.0f64..=100.0,
            reliability in 0.0f64..=100.0,
        ) {
            let high = (low + bump).min(100.0);
            let weights = ScoringWeights::default();
            let base = SubScores { price: low, quality, timeline, warranty, reliability };
            let better = SubScores { price: high, ..base };
            prop_assert!(better.composite(&weights) >= base.composite(&weights));
        }

        #[test]
        fn cheaper_never_scores_lower_on_price(
            min in 0.0f64..10_000.0,
            span in 0.0f64..10_000.0,
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let max = min + span;
            let (cheap, dear) = if a <= b { (a, b) } else { (b, a) };
            let cheap = min + cheap * span;
            let dear = min + dear * span;
            prop_assert!(price_score(cheap, min, max) >= price_score(dear, min, max));
        }
    }
}
