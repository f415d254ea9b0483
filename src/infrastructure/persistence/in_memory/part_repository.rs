//! # In-Memory Damaged Part Repository
//!
//! In-memory implementation of [`DamagedPartRepository`].

use crate::domain::entities::DamagedPart;
use crate::domain::value_objects::{AssessmentId, DamagedPartId};
use crate::infrastructure::persistence::traits::{DamagedPartRepository, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Parts kept per assessment in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDamagedPartRepository {
    storage: Arc<RwLock<HashMap<AssessmentId, Vec<DamagedPart>>>>,
}

impl InMemoryDamagedPartRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes everything.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl DamagedPartRepository for InMemoryDamagedPartRepository {
    async fn save(&self, part: &DamagedPart) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let parts = storage.entry(part.assessment_id()).or_default();
        match parts.iter_mut().find(|p| p.id() == part.id()) {
            Some(existing) => *existing = part.clone(),
            None => parts.push(part.clone()),
        }
        Ok(())
    }

    async fn get(&self, id: DamagedPartId) -> RepositoryResult<Option<DamagedPart>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .flat_map(|parts| parts.iter())
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn find_by_assessment(
        &self,
        assessment_id: AssessmentId,
    ) -> RepositoryResult<Vec<DamagedPart>> {
        let storage = self.storage.read().await;
        Ok(storage.get(&assessment_id).cloned().unwrap_or_default())
    }
}
