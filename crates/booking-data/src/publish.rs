//! Publish loop: generate bookings and upsert them one at a time.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::booking::DocumentKey;
use crate::customers::CustomerKeys;
use crate::error::SeedingError;
use crate::generator::BookingGenerator;
use crate::store::BookingStore;

/// Number of bookings written by a default run.
pub const DEFAULT_RECORD_COUNT: usize = 500;

/// Pause between consecutive store writes, in milliseconds.
pub const DEFAULT_WRITE_DELAY_MS: u64 = 10;

/// Pause between consecutive store writes.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(DEFAULT_WRITE_DELAY_MS);

/// Settings for [`publish_confirmed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSettings {
    /// Number of bookings to generate and upsert.
    pub record_count: usize,
    /// Sleep after each upsert; zero disables throttling.
    pub write_delay: Duration,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            record_count: DEFAULT_RECORD_COUNT,
            write_delay: DEFAULT_WRITE_DELAY,
        }
    }
}

/// Result of a publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Keys of the documents written, in write order.
    pub written: Vec<DocumentKey>,
}

impl PublishOutcome {
    /// Returns how many documents were written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

/// Generates `record_count` confirmed bookings and upserts each one.
///
/// Each booking's customer is drawn uniformly from `customer_keys`. The loop
/// stops at the first failure, leaving earlier writes in place.
///
/// # Errors
///
/// Returns [`SeedingError::NoCustomerKeys`] if `customer_keys` is empty,
/// [`SeedingError::Generation`] if a booking cannot be generated, and
/// [`SeedingError::Store`] if an upsert fails.
pub async fn publish_confirmed<S, R>(
    store: &S,
    generator: &BookingGenerator,
    customer_keys: &CustomerKeys,
    rng: &mut R,
    settings: PublishSettings,
) -> Result<PublishOutcome, SeedingError>
where
    S: BookingStore + ?Sized,
    R: Rng + ?Sized,
{
    info!(
        record_count = settings.record_count,
        customer_key_count = customer_keys.len(),
        "publishing confirmed bookings"
    );

    // `record_count` is unbounded, so the up-front reservation is capped.
    let mut written = Vec::with_capacity(settings.record_count.min(DEFAULT_RECORD_COUNT));
    for _ in 0..settings.record_count {
        let customer_id = customer_keys
            .choose(rng)
            .ok_or(SeedingError::NoCustomerKeys)?;
        let booking = generator.generate(rng, customer_id)?;
        store.upsert(&booking).await?;
        debug!(booking_id = %booking.booking_id, customer_id, "booking written");
        written.push(booking.key());

        if !settings.write_delay.is_zero() {
            tokio::time::sleep(settings.write_delay).await;
        }
    }

    info!(record_count = written.len(), "publish complete");
    Ok(PublishOutcome { written })
}
