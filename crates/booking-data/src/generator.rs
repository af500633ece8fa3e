//! Seasonally-weighted booking generation.
//!
//! Generation is split into two stages so fixed inputs can be tested
//! directly: a [`ScheduleDraw`] captures the raw random picks (creation
//! month/day/time, lead time, stay length) and resolves into a
//! [`BookingSchedule`] of calendar dates. [`BookingGenerator`] then prices the
//! stay and fills in the categorical fields from the [`Catalog`].
//!
//! All randomness flows through the caller's RNG, so a seeded `ChaCha8Rng`
//! and a fixed clock reproduce identical bookings.

#![expect(
    clippy::float_arithmetic,
    reason = "pricing and triangular draws are floating-point by nature"
)]

use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc, Weekday};
use mockable::Clock;
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::{Builder, Uuid};

use crate::booking::{BookingDocument, BookingStatus};
use crate::catalog::{Catalog, CityEntry, Weighted};
use crate::error::GenerationError;

/// Months treated as high season for both creation weighting and pricing.
pub const PEAK_MONTHS: [u32; 4] = [6, 7, 8, 12];

/// Probability that the creation month is drawn from [`PEAK_MONTHS`].
const PEAK_CREATION_PROBABILITY: f64 = 0.55;

/// Default target year for booking creation timestamps.
pub const DEFAULT_TARGET_YEAR: i32 = 2025;

const LEAD_TIME_MIN: f64 = 7.0;
const LEAD_TIME_MAX: f64 = 45.0;
const LEAD_TIME_MODE: f64 = 28.0;

const NIGHTS_MIN: f64 = 1.0;
const NIGHTS_MAX: f64 = 14.0;
const NIGHTS_MODE: f64 = 3.0;

const ADULTS_MIN: f64 = 1.0;
const ADULTS_MAX: f64 = 3.0;
const ADULTS_MODE: f64 = 2.0;

const CHILD_PROBABILITY: f64 = 0.25;
const INFANT_PROBABILITY: f64 = 0.05;

const LISTING_ID_MIN: u32 = 100_000;
const LISTING_ID_MAX: u32 = 999_999;

/// Settings controlling booking generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Year in which creation timestamps fall.
    pub year: i32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            year: DEFAULT_TARGET_YEAR,
        }
    }
}

/// Raw random picks from which a booking's dates are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDraw {
    /// Creation month, 1 to 12.
    pub month: u32,
    /// Creation day of month, 1 to 28.
    pub day: u32,
    /// Creation hour, 6 to 22.
    pub hour: u32,
    /// Creation minute, 0 to 59.
    pub minute: u32,
    /// Days between creation and check-in, at least 7.
    pub lead_time_days: u32,
    /// Length of stay, at least 1.
    pub nights: u32,
}

impl ScheduleDraw {
    /// Draws creation time, lead time, and stay length from `rng`.
    ///
    /// Creation months favour [`PEAK_MONTHS`]; days stop at 28 so every
    /// month yields a valid date.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let month = if rng.random_bool(PEAK_CREATION_PROBABILITY) {
            PEAK_MONTHS.choose(rng).copied().unwrap_or(PEAK_MONTHS[0])
        } else {
            rng.random_range(1..=12)
        };
        let day = rng.random_range(1..=28);
        let hour = rng.random_range(6..=22);
        let minute = rng.random_range(0..=59);
        let lead_time_days =
            truncate_draw(triangular(rng, LEAD_TIME_MIN, LEAD_TIME_MAX, LEAD_TIME_MODE));
        let nights = truncate_draw(triangular(rng, NIGHTS_MIN, NIGHTS_MAX, NIGHTS_MODE)).max(1);

        Self {
            month,
            day,
            hour,
            minute,
            lead_time_days,
            nights,
        }
    }

    /// Resolves the draw against `year` into concrete dates.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidCreationTime`] if the draw does not
    /// name a real UTC time, or [`GenerationError::DateOutOfRange`] if the
    /// offsets leave the calendar range.
    pub fn resolve(&self, year: i32) -> Result<BookingSchedule, GenerationError> {
        let created_at = Utc
            .with_ymd_and_hms(year, self.month, self.day, self.hour, self.minute, 0)
            .single()
            .ok_or(GenerationError::InvalidCreationTime {
                year,
                month: self.month,
                day: self.day,
                hour: self.hour,
                minute: self.minute,
            })?;
        let checkin_date = add_days(created_at.date_naive(), self.lead_time_days)?;
        let checkout_date = add_days(checkin_date, self.nights)?;

        Ok(BookingSchedule {
            created_at,
            checkin_date,
            checkout_date,
            nights: self.nights,
            lead_time_days: self.lead_time_days,
        })
    }
}

fn add_days(from: NaiveDate, days: u32) -> Result<NaiveDate, GenerationError> {
    from.checked_add_days(Days::new(u64::from(days)))
        .ok_or(GenerationError::DateOutOfRange { from, days })
}

/// Calendar dates of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSchedule {
    /// When the booking was made.
    pub created_at: DateTime<Utc>,
    /// Arrival date.
    pub checkin_date: NaiveDate,
    /// Departure date.
    pub checkout_date: NaiveDate,
    /// Length of stay.
    pub nights: u32,
    /// Days between creation and check-in.
    pub lead_time_days: u32,
}

/// Price breakdown of a stay, each component rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    /// Nightly price after seasonal and weekend adjustments.
    pub price_nightly: f64,
    /// One-off cleaning fee.
    pub cleaning_fee: f64,
    /// `price_nightly * nights + cleaning_fee`.
    pub total_amount: f64,
}

/// Prices a stay from a city's base rate.
///
/// The multiplier starts at 1.0, gains 10–30% when check-in falls in a peak
/// month and a further 5–15% when check-in is a Friday or Saturday.
pub fn price_components<R: Rng + ?Sized>(
    rng: &mut R,
    base_rate: f64,
    nights: u32,
    checkin: NaiveDate,
) -> Pricing {
    let mut multiplier = 1.0;
    if PEAK_MONTHS.contains(&checkin.month()) {
        multiplier += rng.random_range(0.10..0.30);
    }
    if matches!(checkin.weekday(), Weekday::Fri | Weekday::Sat) {
        multiplier += rng.random_range(0.05..0.15);
    }

    let price_nightly = round2(base_rate * multiplier);
    let cleaning_fee = round2(rng.random_range(20.0..80.0));
    let total_amount = round2(price_nightly * f64::from(nights) + cleaning_fee);

    Pricing {
        price_nightly,
        cleaning_fee,
        total_amount,
    }
}

/// Rounds to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draws from a triangular distribution on `[low, high]` peaking at `mode`.
///
/// Uses the inverse CDF with a single uniform draw. A degenerate range
/// returns `low`.
pub fn triangular<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64, mode: f64) -> f64 {
    let span = high - low;
    if span == 0.0 {
        return low;
    }
    let mut u: f64 = rng.random();
    let mut c = (mode - low) / span;
    let (mut from, mut to) = (low, high);
    if u > c {
        u = 1.0 - u;
        c = 1.0 - c;
        (from, to) = (high, low);
    }
    from + (to - from) * (u * c).sqrt()
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "triangular draws here are bounded small positive values; truncation is intended"
)]
fn truncate_draw(value: f64) -> u32 {
    value.trunc() as u32
}

/// Produces booking documents from a catalog, clock, and caller-supplied RNG.
#[derive(Clone)]
pub struct BookingGenerator {
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
    settings: GeneratorSettings,
}

impl BookingGenerator {
    /// Create a generator.
    pub fn new(catalog: Arc<Catalog>, clock: Arc<dyn Clock>, settings: GeneratorSettings) -> Self {
        Self {
            catalog,
            clock,
            settings,
        }
    }

    /// Returns the catalog the generator draws from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Generates one confirmed booking for `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the drawn schedule cannot be resolved
    /// or a catalog list has nothing to choose from.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        customer_id: i64,
    ) -> Result<BookingDocument, GenerationError> {
        let city = choose(rng, self.catalog.cities(), "cities")?.clone();
        let schedule = ScheduleDraw::sample(rng).resolve(self.settings.year)?;
        self.generate_for(rng, customer_id, &city, &schedule)
    }

    /// Generates one confirmed booking with a fixed city and schedule.
    ///
    /// Pricing, guests, and categorical fields are still drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NothingToChoose`] if a catalog list is
    /// empty or its weights are unusable.
    pub fn generate_for<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        customer_id: i64,
        city: &CityEntry,
        schedule: &BookingSchedule,
    ) -> Result<BookingDocument, GenerationError> {
        let pricing = price_components(rng, city.base_rate, schedule.nights, schedule.checkin_date);
        let channel = choose_weighted(rng, self.catalog.channels(), "channels")?;
        let device_type = choose_weighted(rng, self.catalog.device_types(), "deviceTypes")?;

        let booking_id = random_uuid(rng).to_string();
        let currency = choose(rng, self.catalog.currencies(), "currencies")?.clone();
        let listing_id = rng.random_range(LISTING_ID_MIN..=LISTING_ID_MAX);
        let guests_adults =
            truncate_draw(triangular(rng, ADULTS_MIN, ADULTS_MAX, ADULTS_MODE)).max(1);
        let guests_children = u32::from(rng.random_bool(CHILD_PROBABILITY));
        let guests_infants = u32::from(rng.random_bool(INFANT_PROBABILITY));

        Ok(BookingDocument {
            id: booking_id.clone(),
            booking_id,
            customer_id: customer_id.to_string(),
            listing_id: listing_id.to_string(),
            status: BookingStatus::Confirmed,
            booking_created_at: schedule.created_at,
            checkin_date: schedule.checkin_date,
            checkout_date: schedule.checkout_date,
            nights: schedule.nights,
            lead_time_days: schedule.lead_time_days,
            guests_adults,
            guests_children,
            guests_infants,
            price_nightly: pricing.price_nightly,
            cleaning_fee: pricing.cleaning_fee,
            total_amount: pricing.total_amount,
            currency,
            country_code: city.country.clone(),
            city: city.city.clone(),
            channel,
            device_type,
            cancellation_ts: None,
            cancellation_reason: None,
            updated_at: self.clock.utc(),
        })
    }
}

/// Builds a version 4 UUID from the RNG so seeded runs repeat identifiers.
fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.random()).into_uuid()
}

fn choose<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [T],
    list: &'static str,
) -> Result<&'a T, GenerationError> {
    items
        .choose(rng)
        .ok_or(GenerationError::NothingToChoose { list })
}

fn choose_weighted<R: Rng + ?Sized>(
    rng: &mut R,
    items: &[Weighted],
    list: &'static str,
) -> Result<String, GenerationError> {
    items
        .choose_weighted(rng, |item| item.weight)
        .map(|item| item.value.clone())
        .map_err(|_| GenerationError::NothingToChoose { list })
}
