//! Booking store port and adapters.
//!
//! The publish and cancellation loops only need three capabilities from a
//! document store: upsert a whole document, list document keys by status, and
//! patch named fields of one document. [`BookingStore`] captures exactly
//! those. Adapters:
//!
//! - [`InMemoryBookingStore`] keeps documents in process, for tests and dry
//!   runs.
//! - [`CosmosBookingStore`] talks to the Cosmos DB SQL REST API.

mod cosmos;
mod memory;

use async_trait::async_trait;

pub use cosmos::{CosmosBookingStore, CosmosSettings};
pub use memory::InMemoryBookingStore;

use crate::booking::{BookingDocument, BookingStatus, CancellationPatch, DocumentKey};
use crate::error::StoreError;

/// Port for persisting and mutating booking documents.
///
/// Implementations must:
/// - Treat `upsert` as create-or-replace keyed by the document id, using
///   `booking_id` as the partition key.
/// - Return at most `limit` keys from `query_by_status`, scanning across
///   partitions.
/// - Change only the patched fields in `patch`, failing with
///   [`StoreError::NotFound`] when the document does not exist.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Create or fully replace a booking document.
    async fn upsert(&self, document: &BookingDocument) -> Result<(), StoreError>;

    /// List keys of documents whose `status` equals `status`.
    async fn query_by_status(
        &self,
        status: BookingStatus,
        limit: usize,
    ) -> Result<Vec<DocumentKey>, StoreError>;

    /// Apply a cancellation patch to one document.
    async fn patch(&self, key: &DocumentKey, patch: &CancellationPatch) -> Result<(), StoreError>;
}
