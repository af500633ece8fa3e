//! Seasonally weighted synthetic booking data for development document stores.
//!
//! This crate generates plausible short-stay booking documents, writes them to
//! a document store, and can flip a random share of confirmed bookings to
//! cancelled. Generated bookings reference customer keys harvested from a
//! base snapshot plus delta snapshots of a customer dataset, so they join to
//! that dataset downstream.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - A default booking catalog, optionally replaced by a JSON override
//! - Seeded booking generation with peak-season weighting
//! - Customer key loading from base and delta CSV snapshots
//! - Publish and cancellation loops over a [`BookingStore`]
//! - In-memory and Cosmos DB store adapters
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use booking_data::{
//!     BookingGenerator, Catalog, CustomerKeys, GeneratorSettings, InMemoryBookingStore,
//!     PublishSettings, publish_confirmed,
//! };
//! use mockable::DefaultClock;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let generator = BookingGenerator::new(
//!     Arc::new(Catalog::default()),
//!     Arc::new(DefaultClock),
//!     GeneratorSettings::default(),
//! );
//! let store = InMemoryBookingStore::new();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let settings = PublishSettings {
//!     record_count: 3,
//!     write_delay: Duration::ZERO,
//! };
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()
//!     .expect("runtime");
//! let outcome = runtime
//!     .block_on(publish_confirmed(
//!         &store,
//!         &generator,
//!         &CustomerKeys::fallback(),
//!         &mut rng,
//!         settings,
//!     ))
//!     .expect("publish succeeds");
//!
//! assert_eq!(outcome.count(), 3);
//! assert_eq!(store.len().expect("len"), 3);
//! ```

mod booking;
mod cancel;
mod catalog;
mod customers;
mod error;
mod generator;
mod publish;
mod store;

pub use booking::{BookingDocument, BookingStatus, CancellationPatch, DocumentKey};
pub use cancel::{
    CancelOutcome, CancelSettings, DEFAULT_MAX_SCAN, DEFAULT_SAMPLE_RATE_RANGE,
    cancel_existing_bookings, default_sample_rate, sample_size,
};
pub use catalog::{Catalog, CityEntry, Weighted};
pub use customers::{
    CUSTOMER_FILES, CUSTOMER_ID_COLUMN, CustomerKeySource, CustomerKeys, FALLBACK_CUSTOMER_COUNT,
    load_customer_keys,
};
pub use error::{CatalogError, GenerationError, SeedingError, StoreError};
pub use generator::{
    BookingGenerator, BookingSchedule, DEFAULT_TARGET_YEAR, GeneratorSettings, PEAK_MONTHS,
    Pricing, ScheduleDraw, price_components, round2, triangular,
};
pub use publish::{
    DEFAULT_RECORD_COUNT, DEFAULT_WRITE_DELAY, DEFAULT_WRITE_DELAY_MS, PublishOutcome,
    PublishSettings, publish_confirmed,
};
pub use store::{BookingStore, CosmosBookingStore, CosmosSettings, InMemoryBookingStore};
