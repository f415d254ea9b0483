//! Property tests for aggregation and pricing invariants.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, missing_docs)]

use proptest::prelude::*;
use repair_quote::application::services::recommendation_engine::price_score;
use repair_quote::domain::entities::{CostBreakdown, DamagedPart, Quote, QuoteSubmission, RawObservation};
use repair_quote::domain::services::{MarketAverageCalculator, PartAggregator};
use repair_quote::domain::value_objects::{
    AssessmentId, DamageSeverity, Money, PartCategory, ProviderType, QualityTier, QuoteRequestId,
    Timestamp,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

const NAMES: [&str; 4] = ["Front Bumper", "front  bumper", "Hood", "Left Door"];
const CATEGORIES: [&str; 2] = ["body", "mechanical"];

fn severity() -> impl Strategy<Value = DamageSeverity> {
    prop_oneof![
        Just(DamageSeverity::Minor),
        Just(DamageSeverity::Moderate),
        Just(DamageSeverity::Severe),
        Just(DamageSeverity::Replace),
    ]
}

fn observation() -> impl Strategy<Value = RawObservation> {
    (0..NAMES.len(), 0..CATEGORIES.len(), severity(), 0u32..40, "[a-z]{1,6}").prop_map(
        |(name, category, severity, tenths, section)| {
            RawObservation::new(
                section,
                NAMES[name],
                CATEGORIES[category],
                severity,
                Decimal::new(i64::from(tenths), 1),
            )
        },
    )
}

fn cents(value: u32) -> Decimal {
    Decimal::new(i64::from(value), 2)
}

fn base_time() -> Timestamp {
    Timestamp::from_secs(1_750_000_000).unwrap()
}

fn quote(part: &DamagedPart, provider: ProviderType, total_cents: u32) -> Quote {
    let costs = CostBreakdown::new(
        Money::new(cents(total_cents)).unwrap(),
        Money::zero(),
        Money::zero(),
        Money::zero(),
    );
    Quote::builder(QuoteRequestId::new_v4(), part.id(), provider, costs, base_time().add_days(10))
        .created_at(base_time())
        .build()
        .unwrap()
}

fn part() -> DamagedPart {
    DamagedPart::new(
        AssessmentId::new_v4(),
        vec!["front".into()],
        "Front Bumper",
        PartCategory::Body,
        DamageSeverity::Moderate,
        "",
        false,
        Decimal::ONE,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn aggregation_keeps_one_part_per_key_with_max_severity(
        observations in prop::collection::vec(observation(), 1..24)
    ) {
        let parts = PartAggregator::aggregate(AssessmentId::new_v4(), &observations).unwrap();

        let keys: HashSet<String> = parts.iter().map(DamagedPart::key).collect();
        prop_assert_eq!(keys.len(), parts.len());

        let mut expected: HashMap<String, (DamageSeverity, Decimal)> = HashMap::new();
        for obs in &observations {
            let category: PartCategory = obs.category.as_deref().unwrap().parse().unwrap();
            let key = DamagedPart::key_for(obs.part_name.as_deref().unwrap(), category);
            let entry = expected.entry(key).or_insert((obs.severity, obs.labor_hours));
            entry.0 = entry.0.max(obs.severity);
            entry.1 = entry.1.max(obs.labor_hours);
        }
        prop_assert_eq!(expected.len(), parts.len());
        for part in &parts {
            let (severity, hours) = expected[&part.key()];
            prop_assert_eq!(part.severity(), severity);
            prop_assert_eq!(part.labor_hours(), hours);
        }
    }

    #[test]
    fn itemized_submission_total_matches_costs(
        part_cost in 0u32..500_000,
        labor_cost in 0u32..200_000,
        paint_cost in 0u32..100_000,
        additional_cost in 0u32..50_000,
    ) {
        let part = part();
        let total = cents(part_cost) + cents(labor_cost) + cents(paint_cost) + cents(additional_cost);
        let submission = QuoteSubmission {
            request_id: QuoteRequestId::new_v4(),
            provider_name: "Shop".into(),
            part_cost: cents(part_cost),
            labor_cost: cents(labor_cost),
            paint_cost: cents(paint_cost),
            additional_cost: cents(additional_cost),
            total_cost: total,
            quality_tier: QualityTier::Aftermarket,
            warranty_months: 6,
            delivery_days: 2,
            completion_days: 4,
            confidence: 70,
            valid_until: base_time().add_days(7),
        };
        let quote = Quote::from_submission(
            &submission,
            submission.request_id,
            part.id(),
            ProviderType::Independent,
            base_time(),
        )
        .unwrap();
        prop_assert_eq!(quote.total_cost().get(), total);
        prop_assert_eq!(quote.costs().total().unwrap(), quote.total_cost());
    }

    #[test]
    fn market_average_is_idempotent_and_bounded(
        totals in prop::collection::vec(1u32..1_000_000, 2..=4)
    ) {
        let part = part();
        let quotes: Vec<Quote> = totals
            .iter()
            .zip(ProviderType::ALL)
            .map(|(total, provider)| quote(&part, provider, *total))
            .collect();
        let calculator = MarketAverageCalculator::default();
        let first = calculator.calculate(part.id(), &quotes, base_time()).unwrap();
        let second = calculator.calculate(part.id(), &quotes, base_time()).unwrap();

        prop_assert_eq!(first.average_total, second.average_total);
        prop_assert_eq!(first.variance, second.variance);
        prop_assert_eq!(first.confidence, second.confidence);
        prop_assert!(first.min_total <= first.average_total);
        prop_assert!(first.average_total <= first.max_total);
        prop_assert_eq!(first.quote_count, quotes.len());
    }

    #[test]
    fn cheaper_never_scores_lower_on_price(
        min in 1u32..10_000,
        spread in 1u32..10_000,
        a in 0u32..=100,
        b in 0u32..=100,
    ) {
        let max = f64::from(min + spread);
        let min = f64::from(min);
        let at = |pct: u32| min + (max - min) * f64::from(pct) / 100.0;
        let (cheap, dear) = if a <= b { (at(a), at(b)) } else { (at(b), at(a)) };

        let cheap_score = price_score(cheap, min, max);
        let dear_score = price_score(dear, min, max);
        prop_assert!(cheap_score >= dear_score);
        prop_assert!((0.0..=100.0).contains(&cheap_score));
    }
}
