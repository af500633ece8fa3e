//! Booking document types.
//!
//! This module defines the document written to the store, the key that
//! addresses a stored document, and the partial update applied when a booking
//! is cancelled.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking.
///
/// Bookings are created `Confirmed` and may later move to `Cancelled`; the
/// reverse transition never happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// The booking is active.
    #[default]
    Confirmed,
    /// The booking was cancelled by the cancellation sampler.
    Cancelled,
}

impl BookingStatus {
    /// Returns the value stored in the `status` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Identity of a stored document: its id and partition key value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    /// Document identifier.
    pub id: String,
    /// Partition key value.
    pub partition_key: String,
}

/// A generated booking record.
///
/// `id` and `booking_id` carry the same value; the latter is the store's
/// partition key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDocument {
    /// Document identifier.
    pub id: String,
    /// Booking identifier and partition key.
    pub booking_id: String,
    /// Customer key joining to the external customer dataset.
    pub customer_id: String,
    /// Random listing identifier.
    pub listing_id: String,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// When the booking was made.
    pub booking_created_at: DateTime<Utc>,
    /// Arrival date.
    pub checkin_date: NaiveDate,
    /// Departure date.
    pub checkout_date: NaiveDate,
    /// Length of stay.
    pub nights: u32,
    /// Days between creation and check-in.
    pub lead_time_days: u32,
    /// Adult guests, at least one.
    pub guests_adults: u32,
    /// Child guests.
    pub guests_children: u32,
    /// Infant guests.
    pub guests_infants: u32,
    /// Nightly price after adjustments.
    pub price_nightly: f64,
    /// One-off cleaning fee.
    pub cleaning_fee: f64,
    /// Nightly price times nights plus cleaning fee.
    pub total_amount: f64,
    /// Currency code.
    pub currency: String,
    /// Country code of the destination city.
    pub country_code: String,
    /// Destination city.
    pub city: String,
    /// Booking channel.
    pub channel: String,
    /// Device used to book.
    pub device_type: String,
    /// When the booking was cancelled, if it was.
    pub cancellation_ts: Option<DateTime<Utc>>,
    /// Why the booking was cancelled, if it was.
    pub cancellation_reason: Option<String>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

impl BookingDocument {
    /// Returns the key addressing this document in the store.
    #[must_use]
    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            id: self.id.clone(),
            partition_key: self.booking_id.clone(),
        }
    }

    /// Applies a cancellation patch in place, leaving other fields untouched.
    pub fn apply(&mut self, patch: &CancellationPatch) {
        self.status = patch.status;
        self.cancellation_ts = Some(patch.cancellation_ts);
        self.cancellation_reason = Some(patch.cancellation_reason.clone());
        self.updated_at = patch.updated_at;
    }
}

/// Partial update marking a booking as cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationPatch {
    /// New status; always [`BookingStatus::Cancelled`] when built via
    /// [`CancellationPatch::new`].
    pub status: BookingStatus,
    /// Cancellation time.
    pub cancellation_ts: DateTime<Utc>,
    /// Reason drawn from the catalog.
    pub cancellation_reason: String,
    /// Write time.
    pub updated_at: DateTime<Utc>,
}

impl CancellationPatch {
    /// Builds a cancellation patch stamped at `now`.
    #[must_use]
    pub fn new(reason: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: BookingStatus::Cancelled,
            cancellation_ts: now,
            cancellation_reason: reason.into(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_document() -> BookingDocument {
        let created = Utc
            .with_ymd_and_hms(2025, 7, 10, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        BookingDocument {
            id: "b-1".to_owned(),
            booking_id: "b-1".to_owned(),
            customer_id: "42".to_owned(),
            listing_id: "123456".to_owned(),
            status: BookingStatus::Confirmed,
            booking_created_at: created,
            checkin_date: NaiveDate::from_ymd_opt(2025, 8, 7).expect("valid date"),
            checkout_date: NaiveDate::from_ymd_opt(2025, 8, 10).expect("valid date"),
            nights: 3,
            lead_time_days: 28,
            guests_adults: 2,
            guests_children: 0,
            guests_infants: 0,
            price_nightly: 120.5,
            cleaning_fee: 30.25,
            total_amount: 391.75,
            currency: "EUR".to_owned(),
            country_code: "FRA".to_owned(),
            city: "Paris".to_owned(),
            channel: "app".to_owned(),
            device_type: "iOS".to_owned(),
            cancellation_ts: None,
            cancellation_reason: None,
            updated_at: created,
        }
    }

    #[test]
    fn status_serializes_capitalised() {
        let json = serde_json::to_string(&BookingStatus::Cancelled).expect("serialize");
        assert_eq!(json, "\"Cancelled\"");
        assert_eq!(BookingStatus::Confirmed.as_str(), "Confirmed");
    }

    #[test]
    fn document_serializes_snake_case_with_null_cancellation() {
        let value = serde_json::to_value(sample_document()).expect("serialize");

        assert_eq!(value["booking_id"], "b-1");
        assert_eq!(value["checkin_date"], "2025-08-07");
        assert_eq!(value["status"], "Confirmed");
        assert!(value["cancellation_ts"].is_null());
        assert!(value["cancellation_reason"].is_null());
    }

    #[test]
    fn key_uses_booking_id_as_partition_key() {
        let key = sample_document().key();
        assert_eq!(key.id, "b-1");
        assert_eq!(key.partition_key, "b-1");
    }

    #[test]
    fn apply_patch_only_touches_cancellation_fields() {
        let mut document = sample_document();
        let before = document.clone();
        let now = Utc
            .with_ymd_and_hms(2025, 9, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");

        document.apply(&CancellationPatch::new("weather", now));

        assert_eq!(document.status, BookingStatus::Cancelled);
        assert_eq!(document.cancellation_ts, Some(now));
        assert_eq!(document.cancellation_reason.as_deref(), Some("weather"));
        assert_eq!(document.updated_at, now);
        assert_eq!(document.total_amount, before.total_amount);
        assert_eq!(document.checkin_date, before.checkin_date);
        assert_eq!(document.customer_id, before.customer_id);
    }
}
