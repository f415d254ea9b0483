//! # In-Memory Quote Request Repository
//!
//! In-memory implementation of [`QuoteRequestRepository`] with optimistic
//! version checks.

use crate::domain::entities::QuoteRequest;
use crate::domain::value_objects::{AssessmentId, DamagedPartId, QuoteRequestId};
use crate::infrastructure::persistence::traits::{
    QuoteRequestRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Storage {
    requests: HashMap<QuoteRequestId, QuoteRequest>,
    by_part: HashMap<DamagedPartId, Vec<QuoteRequestId>>,
}

/// Thread-safe request storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuoteRequestRepository {
    storage: Arc<RwLock<Storage>>,
}

impl InMemoryQuoteRequestRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.storage.read().await.requests.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QuoteRequestRepository for InMemoryQuoteRequestRepository {
    async fn save(&self, request: &QuoteRequest) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if let Some(existing) = storage.requests.get(&request.id()) {
            if existing.version() >= request.version() {
                return Err(RepositoryError::version_conflict(
                    "QuoteRequest",
                    request.id().to_string(),
                    request.version(),
                    existing.version(),
                ));
            }
        } else {
            storage
                .by_part
                .entry(request.part_id())
                .or_default()
                .push(request.id());
        }
        storage.requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn get(&self, id: QuoteRequestId) -> RepositoryResult<Option<QuoteRequest>> {
        Ok(self.storage.read().await.requests.get(&id).cloned())
    }

    async fn find_by_part(&self, part_id: DamagedPartId) -> RepositoryResult<Vec<QuoteRequest>> {
        let storage = self.storage.read().await;
        Ok(storage
            .by_part
            .get(&part_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| storage.requests.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_assessment(
        &self,
        assessment_id: AssessmentId,
    ) -> RepositoryResult<Vec<QuoteRequest>> {
        let storage = self.storage.read().await;
        let mut requests: Vec<QuoteRequest> = storage
            .requests
            .values()
            .filter(|r| r.assessment_id() == assessment_id)
            .cloned()
            .collect();
        requests.sort_by_key(|r| (r.created_at(), r.id()));
        Ok(requests)
    }
}
