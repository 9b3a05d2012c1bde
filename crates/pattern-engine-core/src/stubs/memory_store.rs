//! In-memory implementation of [`VectorStore`].
//!
//! Test double for the HTTP adapter: linear-scan search, no persistence,
//! data gone on drop. Thread-safe via `DashMap` so the coordinator and the
//! scheduler tick can share one instance in integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::{StoreHealth, VectorStore};
use crate::types::document::{DocumentKind, SearchMatch, VectorDocument};

/// In-memory vector store for tests.
///
/// Stores documents keyed by id, serves `get_recent_data` from a seedable
/// sample buffer, and can be switched into a failing mode to exercise the
/// engine's best-effort persistence path.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    documents: DashMap<String, VectorDocument>,
    recent: RwLock<Vec<f64>>,
    operations: AtomicU64,
    failing: RwLock<Option<String>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload the samples served by `get_recent_data`.
    pub fn set_recent_data(&self, samples: Vec<f64>) {
        *self.recent.write() = samples;
    }

    /// Make every operation fail with a connection error, or restore
    /// normal behavior with `None`.
    pub fn set_failing(&self, reason: Option<String>) {
        *self.failing.write() = reason;
    }

    /// Number of stored documents of a kind.
    pub fn count(&self, kind: DocumentKind) -> usize {
        self.documents
            .iter()
            .filter(|entry| entry.value().kind == kind)
            .count()
    }

    /// Total operations served, failures included.
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    pub fn get(&self, id: &str) -> Option<VectorDocument> {
        self.documents.get(id).map(|entry| entry.value().clone())
    }

    fn check(&self) -> StoreResult<()> {
        self.operations.fetch_add(1, Ordering::Relaxed);
        match self.failing.read().as_ref() {
            Some(reason) => Err(StoreError::Connection(reason.clone())),
            None => Ok(()),
        }
    }

    fn insert(&self, document: VectorDocument) -> StoreResult<()> {
        self.check()?;
        self.documents.insert(document.id.clone(), document);
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn store_pattern(&self, document: VectorDocument) -> StoreResult<()> {
        self.insert(document)
    }

    async fn store_anomaly(&self, document: VectorDocument) -> StoreResult<()> {
        self.insert(document)
    }

    async fn store_correlation(&self, document: VectorDocument) -> StoreResult<()> {
        self.insert(document)
    }

    async fn get_recent_data(&self, limit: usize) -> StoreResult<Vec<f64>> {
        self.check()?;
        let recent = self.recent.read();
        let start = recent.len().saturating_sub(limit);
        Ok(recent[start..].to_vec())
    }

    async fn search_similar_patterns(
        &self,
        vector: Vec<f32>,
        k: usize,
    ) -> StoreResult<Vec<SearchMatch>> {
        self.check()?;
        let mut matches: Vec<SearchMatch> = self
            .documents
            .iter()
            .filter(|entry| entry.value().kind == DocumentKind::Pattern)
            .map(|entry| {
                let doc = entry.value();
                SearchMatch {
                    id: doc.id.clone(),
                    score: cosine(&vector, &doc.vector),
                    content: doc.content.clone(),
                    kind: doc.kind,
                }
            })
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(k);
        Ok(matches)
    }

    async fn health_check(&self) -> StoreResult<StoreHealth> {
        self.check()?;
        Ok(StoreHealth {
            status: "healthy".to_string(),
        })
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let dot: f64 = a[..n].iter().zip(&b[..n]).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a[..n].iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b[..n].iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn document(id: &str, kind: DocumentKind, vector: Vec<f32>) -> VectorDocument {
        VectorDocument {
            id: id.to_string(),
            kind,
            timestamp: Utc::now(),
            vector,
            metadata: json!({}),
            content: json!({"id": id}),
        }
    }

    #[tokio::test]
    async fn test_store_and_count() {
        let store = InMemoryVectorStore::new();
        store
            .store_pattern(document("pat_01", DocumentKind::Pattern, vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .store_anomaly(document("anom_01", DocumentKind::Anomaly, vec![0.0, 1.0]))
            .await
            .unwrap();

        assert_eq!(store.count(DocumentKind::Pattern), 1);
        assert_eq!(store.count(DocumentKind::Anomaly), 1);
        assert_eq!(store.count(DocumentKind::Correlation), 0);
        assert!(store.get("pat_01").is_some());
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .store_pattern(document("pat_a", DocumentKind::Pattern, vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .store_pattern(document("pat_b", DocumentKind::Pattern, vec![0.0, 1.0]))
            .await
            .unwrap();

        let matches = store
            .search_similar_patterns(vec![1.0, 0.1], 2)
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "pat_a");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let store = InMemoryVectorStore::new();
        store.set_failing(Some("connection refused".to_string()));
        let err = store
            .store_pattern(document("pat_x", DocumentKind::Pattern, vec![1.0]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
        assert_eq!(store.count(DocumentKind::Pattern), 0);

        store.set_failing(None);
        assert!(store.health_check().await.unwrap().is_healthy());
    }

    #[tokio::test]
    async fn test_recent_data_limit() {
        let store = InMemoryVectorStore::new();
        store.set_recent_data((0..100).map(|i| i as f64).collect());
        let recent = store.get_recent_data(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], 90.0);
    }
}
