//! Cancellation sampler: flip a random share of confirmed bookings to
//! cancelled.

use std::time::Duration;

use mockable::Clock;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::booking::{BookingStatus, CancellationPatch};
use crate::catalog::Catalog;
use crate::error::{GenerationError, SeedingError};
use crate::publish::DEFAULT_WRITE_DELAY;
use crate::store::BookingStore;

/// Upper bound on confirmed keys read per run.
pub const DEFAULT_MAX_SCAN: usize = 2000;

/// Inclusive range of the sample rate drawn when none is configured.
pub const DEFAULT_SAMPLE_RATE_RANGE: std::ops::RangeInclusive<i64> = 2..=5;

/// Settings for [`cancel_existing_bookings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelSettings {
    /// Percentage of scanned bookings to cancel. `None` draws a value from
    /// [`DEFAULT_SAMPLE_RATE_RANGE`]; zero or negative skips the run.
    pub sample_rate_pct: Option<i64>,
    /// Maximum number of confirmed keys to scan.
    pub max_scan: usize,
    /// Sleep after each patch; zero disables throttling.
    pub write_delay: Duration,
}

impl Default for CancelSettings {
    fn default() -> Self {
        Self {
            sample_rate_pct: None,
            max_scan: DEFAULT_MAX_SCAN,
            write_delay: DEFAULT_WRITE_DELAY,
        }
    }
}

/// What a cancellation run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The sample rate was zero or negative; the store was not touched.
    Skipped {
        /// The effective sample rate.
        sample_rate_pct: i64,
    },
    /// The scan found no confirmed bookings.
    NoneFound,
    /// A sample of confirmed bookings was cancelled.
    Cancelled {
        /// Confirmed keys returned by the scan.
        scanned: usize,
        /// Bookings patched to cancelled.
        cancelled: usize,
    },
}

/// Draws a sample rate from [`DEFAULT_SAMPLE_RATE_RANGE`].
pub fn default_sample_rate<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.random_range(DEFAULT_SAMPLE_RATE_RANGE)
}

/// Number of bookings to cancel out of `scanned` at `sample_rate_pct`.
///
/// Computes `max(1, floor(scanned * pct / 100))`, capped at `scanned`.
/// Returns zero when nothing was scanned or the rate is not positive.
///
/// ```
/// use booking_data::sample_size;
///
/// assert_eq!(sample_size(2000, 3), 60);
/// assert_eq!(sample_size(10, 2), 1);
/// assert_eq!(sample_size(4, 250), 4);
/// ```
#[must_use]
pub fn sample_size(scanned: usize, sample_rate_pct: i64) -> usize {
    let Ok(pct) = u64::try_from(sample_rate_pct) else {
        return 0;
    };
    if scanned == 0 || pct == 0 {
        return 0;
    }
    let total = u64::try_from(scanned).unwrap_or(u64::MAX);
    let share = total.saturating_mul(pct).div_euclid(100).max(1);
    usize::try_from(share).unwrap_or(usize::MAX).min(scanned)
}

/// Cancels a uniform random sample of confirmed bookings.
///
/// Scans up to `max_scan` confirmed keys, draws
/// [`sample_size`] distinct keys without replacement, and patches each to
/// cancelled with a reason drawn uniformly from the catalog and the clock's
/// current time.
///
/// # Errors
///
/// Returns [`SeedingError::Store`] if the scan or a patch fails, and
/// [`SeedingError::Generation`] if the catalog has no cancel reasons.
pub async fn cancel_existing_bookings<S, R>(
    store: &S,
    catalog: &Catalog,
    clock: &dyn Clock,
    rng: &mut R,
    settings: CancelSettings,
) -> Result<CancelOutcome, SeedingError>
where
    S: BookingStore + ?Sized,
    R: Rng + ?Sized,
{
    let sample_rate_pct = settings
        .sample_rate_pct
        .unwrap_or_else(|| default_sample_rate(rng));
    if sample_rate_pct <= 0 {
        info!(sample_rate_pct, "sample rate is not positive; skipping cancellations");
        return Ok(CancelOutcome::Skipped { sample_rate_pct });
    }

    let confirmed = store
        .query_by_status(BookingStatus::Confirmed, settings.max_scan)
        .await?;
    let scanned = confirmed.len();
    if confirmed.is_empty() {
        info!("no confirmed bookings found; nothing to cancel");
        return Ok(CancelOutcome::NoneFound);
    }

    let picks = sample_size(scanned, sample_rate_pct);
    info!(scanned, sample_rate_pct, picks, "cancelling sampled bookings");

    let mut cancelled = 0;
    for key in confirmed.choose_multiple(rng, picks) {
        let reason = catalog
            .cancel_reasons()
            .choose(rng)
            .ok_or(GenerationError::NothingToChoose {
                list: "cancelReasons",
            })?;
        store
            .patch(key, &CancellationPatch::new(reason.as_str(), clock.utc()))
            .await?;
        debug!(booking_id = %key.partition_key, reason = %reason, "booking cancelled");
        cancelled += 1;

        if !settings.write_delay.is_zero() {
            tokio::time::sleep(settings.write_delay).await;
        }
    }

    info!(scanned, cancelled, "cancellation complete");
    Ok(CancelOutcome::Cancelled { scanned, cancelled })
}
