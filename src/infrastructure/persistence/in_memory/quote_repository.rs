//! # In-Memory Quote Repository
//!
//! In-memory implementation of [`QuoteRepository`], keyed by
//! (request, provider).

use crate::domain::entities::Quote;
use crate::domain::value_objects::{
    DamagedPartId, ProviderType, QuoteId, QuoteRequestId, Timestamp,
};
use crate::infrastructure::persistence::traits::{QuoteRepository, RepositoryResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type QuoteKey = (QuoteRequestId, ProviderType);

/// Thread-safe quote storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteRepository {
    storage: Arc<RwLock<BTreeMap<QuoteKey, Quote>>>,
}

impl InMemoryQuoteRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored quotes.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn upsert(&self, quote: &Quote) -> RepositoryResult<bool> {
        let mut storage = self.storage.write().await;
        let previous = storage.insert((quote.request_id(), quote.provider_type()), quote.clone());
        Ok(previous.is_none())
    }

    async fn get(&self, id: QuoteId) -> RepositoryResult<Option<Quote>> {
        let storage = self.storage.read().await;
        Ok(storage.values().find(|q| q.id() == id).cloned())
    }

    async fn find_by_request_and_provider(
        &self,
        request_id: QuoteRequestId,
        provider: ProviderType,
    ) -> RepositoryResult<Option<Quote>> {
        let storage = self.storage.read().await;
        Ok(storage.get(&(request_id, provider)).cloned())
    }

    async fn find_by_request(&self, request_id: QuoteRequestId) -> RepositoryResult<Vec<Quote>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .filter(|q| q.request_id() == request_id)
            .cloned()
            .collect())
    }

    async fn snapshot(&self, part_ids: &[DamagedPartId]) -> RepositoryResult<Vec<Quote>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .filter(|q| part_ids.contains(&q.part_id()))
            .cloned()
            .collect())
    }

    async fn expire_and_snapshot(
        &self,
        part_ids: &[DamagedPartId],
        as_of: Timestamp,
    ) -> RepositoryResult<Vec<Quote>> {
        let mut storage = self.storage.write().await;
        let mut quotes = Vec::new();
        for quote in storage
            .values_mut()
            .filter(|q| part_ids.contains(&q.part_id()))
        {
            quote.expire_if_due(as_of);
            quotes.push(quote.clone());
        }
        Ok(quotes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::entities::CostBreakdown;
    use crate::domain::value_objects::{Money, QuoteStatus};

    fn quote(request_id: QuoteRequestId, part_id: DamagedPartId, provider: ProviderType, total: u32) -> Quote {
        let costs = CostBreakdown::new(Money::from(total), Money::zero(), Money::zero(), Money::zero());
        Quote::builder(
            request_id,
            part_id,
            provider,
            costs,
            Timestamp::from_secs(1_800_000_000).unwrap(),
        )
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn upsert_replaces_same_request_and_provider() {
        let repo = InMemoryQuoteRepository::new();
        let request = QuoteRequestId::new_v4();
        let part = DamagedPartId::new_v4();
        assert!(repo.upsert(&quote(request, part, ProviderType::Dealer, 100)).await.unwrap());
        assert!(!repo.upsert(&quote(request, part, ProviderType::Dealer, 120)).await.unwrap());
        assert!(repo.upsert(&quote(request, part, ProviderType::Network, 90)).await.unwrap());

        assert_eq!(repo.len().await, 2);
        let dealer = repo
            .find_by_request_and_provider(request, ProviderType::Dealer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dealer.total_cost(), Money::from(120));
        assert_eq!(repo.get(dealer.id()).await.unwrap(), Some(dealer));
    }

    #[tokio::test]
    async fn snapshot_filters_by_part() {
        let repo = InMemoryQuoteRepository::new();
        let request = QuoteRequestId::new_v4();
        let hood = DamagedPartId::new_v4();
        let door = DamagedPartId::new_v4();
        repo.upsert(&quote(request, hood, ProviderType::Dealer, 100)).await.unwrap();
        repo.upsert(&quote(QuoteRequestId::new_v4(), door, ProviderType::Dealer, 100))
            .await
            .unwrap();

        assert_eq!(repo.snapshot(&[hood]).await.unwrap().len(), 1);
        assert_eq!(repo.snapshot(&[hood, door]).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_request(request).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expiry_is_stored() {
        let repo = InMemoryQuoteRepository::new();
        let request = QuoteRequestId::new_v4();
        let hood = DamagedPartId::new_v4();
        let stored = quote(request, hood, ProviderType::Dealer, 100);
        repo.upsert(&stored).await.unwrap();

        let before = repo
            .expire_and_snapshot(&[hood], Timestamp::from_secs(1_700_000_000).unwrap())
            .await
            .unwrap();
        assert_eq!(before[0].status(), QuoteStatus::Submitted);

        let after = repo
            .expire_and_snapshot(&[hood], Timestamp::from_secs(1_800_000_001).unwrap())
            .await
            .unwrap();
        assert_eq!(after[0].status(), QuoteStatus::Expired);
        let row = repo.get(stored.id()).await.unwrap().unwrap();
        assert_eq!(row.status(), QuoteStatus::Expired);
    }
}
