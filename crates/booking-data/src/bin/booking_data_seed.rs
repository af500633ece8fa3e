//! Seed a document store with synthetic bookings and optionally cancel a
//! random share of confirmed ones.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use booking_data::{
    BookingGenerator, BookingStore, CancelOutcome, CancelSettings, Catalog, CatalogError,
    CosmosBookingStore, CosmosSettings, DEFAULT_MAX_SCAN, DEFAULT_RECORD_COUNT,
    DEFAULT_TARGET_YEAR, DEFAULT_WRITE_DELAY_MS, GeneratorSettings, InMemoryBookingStore,
    PublishSettings, SeedingError, StoreError, cancel_existing_bookings, load_customer_keys,
    publish_confirmed,
};
use camino::Utf8PathBuf;
use clap::Parser;
use mockable::{Clock, DefaultClock};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

const ENDPOINT_ENV: &str = "COSMOS_ENDPOINT";
const KEY_ENV: &str = "COSMOS_KEY";

/// `booking-data-seed` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "booking-data-seed",
    about = "Publish synthetic bookings to a document store and optionally cancel a sample",
    version
)]
struct CliArgs {
    /// Number of bookings to publish.
    #[arg(long, value_name = "count", default_value_t = DEFAULT_RECORD_COUNT)]
    records: usize,
    /// Directory holding the customer base and delta snapshots.
    #[arg(long = "customer-dir", value_name = "path", default_value = "CustomerData")]
    customer_dir: Utf8PathBuf,
    /// Calendar year bookings are created in.
    #[arg(long, value_name = "year", default_value_t = DEFAULT_TARGET_YEAR)]
    year: i32,
    /// RNG seed; a random seed is drawn and logged when omitted.
    #[arg(long, value_name = "seed")]
    seed: Option<u64>,
    /// Pause after each store write, in milliseconds.
    #[arg(long = "write-delay-ms", value_name = "ms", default_value_t = DEFAULT_WRITE_DELAY_MS)]
    write_delay_ms: u64,
    /// Percentage of confirmed bookings to cancel; drawn from 2-5 when omitted.
    #[arg(long = "cancel-rate-pct", value_name = "pct", allow_negative_numbers = true)]
    cancel_rate_pct: Option<i64>,
    /// Maximum number of confirmed bookings scanned for cancellation.
    #[arg(long = "max-scan", value_name = "count", default_value_t = DEFAULT_MAX_SCAN)]
    max_scan: usize,
    /// JSON catalog replacing the built-in cities, channels, and reasons.
    #[arg(long, value_name = "path")]
    catalog: Option<Utf8PathBuf>,
    /// Write to an in-memory store instead of Cosmos DB.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Cosmos DB account endpoint. Falls back to `COSMOS_ENDPOINT`.
    #[arg(long, value_name = "url")]
    endpoint: Option<String>,
    /// Cosmos DB account key. Falls back to `COSMOS_KEY`.
    #[arg(long, value_name = "key")]
    key: Option<String>,
    /// Database name.
    #[arg(long, value_name = "name", default_value = "AirBnB")]
    database: String,
    /// Container name.
    #[arg(long, value_name = "name", default_value = "bookings")]
    container: String,
    /// Cancel a sample of confirmed bookings after publishing.
    #[arg(long = "cancel-existing")]
    cancel_existing: bool,
    /// Skip the publish loop.
    #[arg(long = "skip-publish")]
    skip_publish: bool,
}

/// Failures that stop a seeding run.
#[derive(Debug, Error)]
enum CliError {
    /// The async runtime could not start.
    #[error("create Tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// A required connection setting is absent.
    #[error("{name} missing: set --{flag} or {env}")]
    MissingSetting {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },
    /// The endpoint is not a valid URL.
    #[error("invalid endpoint '{value}': {source}")]
    InvalidEndpoint {
        value: String,
        source: url::ParseError,
    },
    /// The catalog override could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The store could not be prepared.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A seeding loop failed.
    #[error(transparent)]
    Seeding(#[from] SeedingError),
}

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    match Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::from)
        .and_then(|runtime| runtime.block_on(run(args)))
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "seeding run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<(), CliError> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_file(path.as_std_path())?,
        None => Catalog::default(),
    };
    let catalog = Arc::new(catalog);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let write_delay = Duration::from_millis(args.write_delay_ms);
    info!(seed, dry_run = args.dry_run, "starting seeding run");

    let store = open_store(&args, Arc::clone(&clock)).await?;

    if args.skip_publish {
        info!("publish skipped");
    } else {
        let customer_keys = load_customer_keys(&args.customer_dir);
        info!(
            customer_key_count = customer_keys.len(),
            source = ?customer_keys.source(),
            "customer keys loaded"
        );
        let generator = BookingGenerator::new(
            Arc::clone(&catalog),
            Arc::clone(&clock),
            GeneratorSettings { year: args.year },
        );
        let outcome = publish_confirmed(
            store.as_ref(),
            &generator,
            &customer_keys,
            &mut rng,
            PublishSettings {
                record_count: args.records,
                write_delay,
            },
        )
        .await?;
        info!(written = outcome.count(), "bookings published");
    }

    if args.cancel_existing {
        let outcome = cancel_existing_bookings(
            store.as_ref(),
            &catalog,
            clock.as_ref(),
            &mut rng,
            CancelSettings {
                sample_rate_pct: args.cancel_rate_pct,
                max_scan: args.max_scan,
                write_delay,
            },
        )
        .await?;
        match outcome {
            CancelOutcome::Skipped { sample_rate_pct } => {
                info!(sample_rate_pct, "cancellation skipped");
            }
            CancelOutcome::NoneFound => info!("no confirmed bookings to cancel"),
            CancelOutcome::Cancelled { scanned, cancelled } => {
                info!(scanned, cancelled, "bookings cancelled");
            }
        }
    }

    Ok(())
}

async fn open_store(
    args: &CliArgs,
    clock: Arc<dyn Clock>,
) -> Result<Box<dyn BookingStore>, CliError> {
    if args.dry_run {
        return Ok(Box::new(InMemoryBookingStore::new()));
    }

    let endpoint = resolve_setting(
        args.endpoint.clone(),
        env::var(ENDPOINT_ENV).ok(),
        "endpoint",
        "endpoint",
        ENDPOINT_ENV,
    )?;
    let key = resolve_setting(
        args.key.clone(),
        env::var(KEY_ENV).ok(),
        "account key",
        "key",
        KEY_ENV,
    )?;
    let endpoint = Url::parse(&endpoint).map_err(|source| CliError::InvalidEndpoint {
        value: endpoint.clone(),
        source,
    })?;

    let mut settings = CosmosSettings::new(endpoint, key);
    settings.database.clone_from(&args.database);
    settings.container.clone_from(&args.container);
    let store = CosmosBookingStore::new(settings, clock)?;
    store.ensure_container().await?;
    Ok(Box::new(store))
}

/// Prefers an explicit, non-blank flag value over the environment.
fn resolve_setting(
    explicit: Option<String>,
    from_env: Option<String>,
    name: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String, CliError> {
    explicit
        .into_iter()
        .chain(from_env)
        .find(|value| !value.trim().is_empty())
        .ok_or(CliError::MissingSetting { name, flag, env })
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_match_a_plain_publish_run() {
        let args = CliArgs::try_parse_from(["booking-data-seed"]).expect("defaults parse");
        assert_eq!(args.records, 500);
        assert_eq!(args.customer_dir, Utf8PathBuf::from("CustomerData"));
        assert_eq!(args.year, 2025);
        assert_eq!(args.write_delay_ms, 10);
        assert_eq!(
            Duration::from_millis(args.write_delay_ms),
            booking_data::DEFAULT_WRITE_DELAY
        );
        assert_eq!(args.max_scan, 2000);
        assert_eq!(args.database, "AirBnB");
        assert_eq!(args.container, "bookings");
        assert!(!args.cancel_existing);
        assert!(!args.skip_publish);
        assert!(!args.dry_run);
        assert_eq!(args.cancel_rate_pct, None);
    }

    #[rstest]
    fn accepts_negative_cancel_rate() {
        let args = CliArgs::try_parse_from([
            "booking-data-seed",
            "--cancel-existing",
            "--cancel-rate-pct",
            "-1",
        ])
        .expect("negative rate parses");
        assert_eq!(args.cancel_rate_pct, Some(-1));
    }

    #[rstest]
    #[case::flag_wins(Some("flag"), Some("env"), "flag")]
    #[case::env_fallback(None, Some("env"), "env")]
    #[case::blank_flag_falls_back(Some("  "), Some("env"), "env")]
    fn resolves_setting_from_flag_then_env(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&str>,
        #[case] expected: &str,
    ) {
        let value = resolve_setting(
            explicit.map(str::to_owned),
            from_env.map(str::to_owned),
            "endpoint",
            "endpoint",
            ENDPOINT_ENV,
        )
        .expect("setting resolves");
        assert_eq!(value, expected);
    }

    #[rstest]
    fn missing_setting_names_flag_and_variable() {
        let err = resolve_setting(None, Some(String::new()), "account key", "key", KEY_ENV)
            .expect_err("blank values are rejected");
        assert_eq!(
            err.to_string(),
            "account key missing: set --key or COSMOS_KEY"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn dry_run_publishes_and_cancels_in_memory() {
        let args = CliArgs::try_parse_from([
            "booking-data-seed",
            "--dry-run",
            "--records",
            "40",
            "--seed",
            "7",
            "--write-delay-ms",
            "0",
            "--cancel-existing",
            "--cancel-rate-pct",
            "10",
            "--customer-dir",
            "target/booking-data-missing-customer-dir",
        ])
        .expect("arguments parse");

        run(args).await.expect("dry run succeeds");
    }
}
