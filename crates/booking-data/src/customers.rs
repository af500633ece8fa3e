//! Customer key harvesting from base and delta snapshot files.
//!
//! Generated bookings must join to a separately maintained customer table
//! that evolves through a base snapshot plus ordered delta snapshots. This
//! module reads the `customer_id` column from whichever of those files are
//! present, merges them into a sorted, de-duplicated key set, and falls back
//! to a synthetic range when nothing usable is found.

use std::collections::BTreeSet;
use std::io::{self, Read};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Dir};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

/// Snapshot files read in order: the base first, then each delta.
pub const CUSTOMER_FILES: [&str; 3] = [
    "customer_data_2025_10_30_base.csv",
    "customer_data_2025_10_30_delta1.csv",
    "customer_data_2025_10_30_delta2.csv",
];

/// Column holding the customer key.
pub const CUSTOMER_ID_COLUMN: &str = "customer_id";

/// Size of the synthetic key range used when no files yield keys.
pub const FALLBACK_CUSTOMER_COUNT: i64 = 100;

/// Where a [`CustomerKeys`] set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerKeySource {
    /// Keys were read from snapshot files.
    Files,
    /// No file yielded a key; the synthetic range `1..=100` is used.
    Fallback,
}

/// Sorted, de-duplicated customer keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerKeys {
    ids: Vec<i64>,
    source: CustomerKeySource,
}

impl CustomerKeys {
    /// Builds a key set from arbitrary identifiers, sorting and de-duplicating
    /// them. An empty input yields the fallback range.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        let merged: BTreeSet<i64> = ids.into_iter().collect();
        if merged.is_empty() {
            return Self::fallback();
        }
        Self {
            ids: merged.into_iter().collect(),
            source: CustomerKeySource::Files,
        }
    }

    /// Returns the synthetic fallback range `1..=100`.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            ids: (1..=FALLBACK_CUSTOMER_COUNT).collect(),
            source: CustomerKeySource::Fallback,
        }
    }

    /// Returns the identifiers in ascending order.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Returns where the keys came from.
    #[must_use]
    pub const fn source(&self) -> CustomerKeySource {
        self.source
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Picks a key uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<i64> {
        self.ids.choose(rng).copied()
    }
}

/// Loads customer keys from the snapshot files in `dir`.
///
/// Missing files are skipped. Rows whose `customer_id` is absent or not an
/// integer are skipped silently. A directory that cannot be opened, or files
/// that yield no keys at all, produce [`CustomerKeys::fallback`].
#[must_use]
pub fn load_customer_keys(dir: &Utf8Path) -> CustomerKeys {
    let root = match Dir::open_ambient_dir(dir, ambient_authority()) {
        Ok(root) => root,
        Err(error) => {
            warn!(path = %dir, %error, "customer directory unavailable; using fallback keys");
            return CustomerKeys::fallback();
        }
    };

    let mut ids = BTreeSet::new();
    for file_name in CUSTOMER_FILES {
        match root.open(file_name) {
            Ok(file) => match harvest_ids(file, &mut ids) {
                Ok(rows) => debug!(file = file_name, rows, "harvested customer keys"),
                Err(error) => warn!(file = file_name, %error, "skipping unreadable customer file"),
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(file = file_name, "customer file absent");
            }
            Err(error) => warn!(file = file_name, %error, "skipping unreadable customer file"),
        }
    }

    CustomerKeys::from_ids(ids)
}

/// Reads the `customer_id` column of one CSV into `ids`, returning the number
/// of rows that yielded a key.
///
/// Only a missing header row or column is an error; bad rows are skipped.
fn harvest_ids<R: Read>(source: R, ids: &mut BTreeSet<i64>) -> Result<usize, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let Some(column) = reader
        .headers()?
        .iter()
        .position(|header| header.trim() == CUSTOMER_ID_COLUMN)
    else {
        return Ok(0);
    };

    let mut harvested = 0;
    for record in reader.records() {
        let Ok(record) = record else { continue };
        if let Some(id) = record
            .get(column)
            .and_then(|value| value.trim().parse::<i64>().ok())
        {
            ids.insert(id);
            harvested += 1;
        }
    }
    Ok(harvested)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    use super::*;

    fn harvest(csv: &str) -> (usize, Vec<i64>) {
        let mut ids = BTreeSet::new();
        let rows = harvest_ids(csv.as_bytes(), &mut ids).expect("csv should parse");
        (rows, ids.into_iter().collect())
    }

    #[test]
    fn harvests_integer_keys_and_skips_bad_rows() {
        let (rows, ids) = harvest("customer_id,name\n3,Ada\nabc,Bob\n1,Cy\n\n 2 ,Di\n,Ed\n");
        assert_eq!(rows, 3);
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn locates_column_by_header_name() {
        let (_, ids) = harvest("name,email,customer_id\nAda,a@x,10\nBob,b@x,7\n");
        assert_eq!(ids, [7, 10]);
    }

    #[test]
    fn missing_column_yields_nothing() {
        let (rows, ids) = harvest("id,name\n1,Ada\n");
        assert_eq!(rows, 0);
        assert!(ids.is_empty());
    }

    #[test]
    fn short_rows_are_skipped() {
        let (_, ids) = harvest("name,customer_id\nAda\nBob,5\n");
        assert_eq!(ids, [5]);
    }

    #[rstest]
    #[case(vec![5, 3, 5, 1], vec![1, 3, 5])]
    #[case(vec![-2, 9], vec![-2, 9])]
    fn from_ids_sorts_and_deduplicates(#[case] input: Vec<i64>, #[case] expected: Vec<i64>) {
        let keys = CustomerKeys::from_ids(input);
        assert_eq!(keys.ids(), expected.as_slice());
        assert_eq!(keys.source(), CustomerKeySource::Files);
    }

    #[test]
    fn empty_ids_fall_back_to_default_range() {
        let keys = CustomerKeys::from_ids(Vec::new());
        assert_eq!(keys.source(), CustomerKeySource::Fallback);
        assert_eq!(keys.len(), 100);
        assert_eq!(keys.ids().first(), Some(&1));
        assert_eq!(keys.ids().last(), Some(&100));
    }

    #[test]
    fn missing_directory_falls_back() {
        let keys = load_customer_keys(Utf8Path::new("/nonexistent/customer-data"));
        assert_eq!(keys, CustomerKeys::fallback());
    }

    #[test]
    fn choose_draws_from_the_key_set() {
        let keys = CustomerKeys::from_ids([11, 22, 33]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..50 {
            let id = keys.choose(&mut rng).expect("non-empty keys");
            assert!(keys.ids().contains(&id));
        }
    }
}
