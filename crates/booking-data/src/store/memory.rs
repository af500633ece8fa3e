//! In-process booking store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::BookingStore;
use crate::booking::{BookingDocument, BookingStatus, CancellationPatch, DocumentKey};
use crate::error::StoreError;

/// Booking store backed by an ordered map keyed by document id.
///
/// Scans return documents in id order, which keeps seeded test runs
/// reproducible.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    documents: Mutex<BTreeMap<String, BookingDocument>>,
}

impl InMemoryBookingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the document with `id`, if stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the store lock is poisoned.
    pub fn get(&self, id: &str) -> Result<Option<BookingDocument>, StoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    /// Returns copies of all stored documents in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the store lock is poisoned.
    pub fn documents(&self) -> Result<Vec<BookingDocument>, StoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    /// Returns the number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the store lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, BookingDocument>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::internal("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn upsert(&self, document: &BookingDocument) -> Result<(), StoreError> {
        self.lock()?.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn query_by_status(
        &self,
        status: BookingStatus,
        limit: usize,
    ) -> Result<Vec<DocumentKey>, StoreError> {
        Ok(self
            .lock()?
            .values()
            .filter(|document| document.status == status)
            .take(limit)
            .map(BookingDocument::key)
            .collect())
    }

    async fn patch(&self, key: &DocumentKey, patch: &CancellationPatch) -> Result<(), StoreError> {
        let mut documents = self.lock()?;
        let document = documents
            .get_mut(&key.id)
            .filter(|document| document.booking_id == key.partition_key)
            .ok_or_else(|| StoreError::not_found(key.id.clone()))?;
        document.apply(patch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn document(id: &str, status: BookingStatus) -> BookingDocument {
        let created = Utc
            .with_ymd_and_hms(2025, 6, 2, 10, 0, 0)
            .single()
            .expect("valid timestamp");
        BookingDocument {
            id: id.to_owned(),
            booking_id: id.to_owned(),
            customer_id: "7".to_owned(),
            listing_id: "555555".to_owned(),
            status,
            booking_created_at: created,
            checkin_date: NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date"),
            checkout_date: NaiveDate::from_ymd_opt(2025, 7, 3).expect("valid date"),
            nights: 2,
            lead_time_days: 29,
            guests_adults: 1,
            guests_children: 0,
            guests_infants: 0,
            price_nightly: 100.0,
            cleaning_fee: 25.0,
            total_amount: 225.0,
            currency: "USD".to_owned(),
            country_code: "USA".to_owned(),
            city: "New York".to_owned(),
            channel: "web".to_owned(),
            device_type: "Web".to_owned(),
            cancellation_ts: None,
            cancellation_reason: None,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_document() {
        let store = InMemoryBookingStore::new();
        let mut first = document("a", BookingStatus::Confirmed);
        store.upsert(&first).await.expect("upsert");
        first.total_amount = 999.0;
        store.upsert(&first).await.expect("upsert");

        assert_eq!(store.len().expect("len"), 1);
        let stored = store.get("a").expect("get").expect("stored");
        assert_eq!(stored.total_amount, 999.0);
    }

    #[tokio::test]
    async fn query_filters_by_status_and_honours_limit() {
        let store = InMemoryBookingStore::new();
        for id in ["a", "b", "c", "d"] {
            store
                .upsert(&document(id, BookingStatus::Confirmed))
                .await
                .expect("upsert");
        }
        store
            .upsert(&document("e", BookingStatus::Cancelled))
            .await
            .expect("upsert");

        let confirmed = store
            .query_by_status(BookingStatus::Confirmed, 3)
            .await
            .expect("query");
        let ids: Vec<_> = confirmed.iter().map(|key| key.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let cancelled = store
            .query_by_status(BookingStatus::Cancelled, 10)
            .await
            .expect("query");
        assert_eq!(cancelled.len(), 1);
    }

    #[tokio::test]
    async fn patch_changes_only_cancellation_fields() {
        let store = InMemoryBookingStore::new();
        let original = document("a", BookingStatus::Confirmed);
        store.upsert(&original).await.expect("upsert");
        let now = Utc
            .with_ymd_and_hms(2025, 8, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");

        store
            .patch(&original.key(), &CancellationPatch::new("host_issue", now))
            .await
            .expect("patch");

        let stored = store.get("a").expect("get").expect("stored");
        let mut expected = original;
        expected.status = BookingStatus::Cancelled;
        expected.cancellation_ts = Some(now);
        expected.cancellation_reason = Some("host_issue".to_owned());
        expected.updated_at = now;
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn patch_of_unknown_document_is_not_found() {
        let store = InMemoryBookingStore::new();
        let key = DocumentKey {
            id: "missing".to_owned(),
            partition_key: "missing".to_owned(),
        };
        let now = Utc::now();

        let result = store.patch(&key, &CancellationPatch::new("weather", now)).await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn patch_with_wrong_partition_key_is_not_found() {
        let store = InMemoryBookingStore::new();
        store
            .upsert(&document("a", BookingStatus::Confirmed))
            .await
            .expect("upsert");
        let key = DocumentKey {
            id: "a".to_owned(),
            partition_key: "b".to_owned(),
        };

        let result = store
            .patch(&key, &CancellationPatch::new("weather", Utc::now()))
            .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
