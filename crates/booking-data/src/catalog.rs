//! Categorical data used to populate generated bookings.
//!
//! The catalog holds the cities, weighted channels and devices, currencies,
//! and cancellation reasons that the generator and cancellation sampler draw
//! from. It is immutable once built and is passed explicitly to the code that
//! needs it. Overrides can be loaded from a JSON file shaped like the
//! built-in default.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

/// Current supported catalog file version.
const SUPPORTED_VERSION: u32 = 1;

/// A destination city with its country code and base nightly rate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityEntry {
    /// City display name.
    pub city: String,
    /// Country code recorded on the booking.
    pub country: String,
    /// Base nightly rate before seasonal and weekend adjustments.
    pub base_rate: f64,
}

impl CityEntry {
    fn new(city: &str, country: &str, base_rate: f64) -> Self {
        Self {
            city: city.to_owned(),
            country: country.to_owned(),
            base_rate,
        }
    }
}

/// A categorical value paired with its relative selection weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Weighted {
    /// The value written to the booking.
    pub value: String,
    /// Relative weight; weights need not sum to one.
    pub weight: f64,
}

impl Weighted {
    fn new(value: &str, weight: f64) -> Self {
        Self {
            value: value.to_owned(),
            weight,
        }
    }
}

/// Immutable categorical data for booking generation and cancellation.
///
/// # Example
///
/// ```
/// use booking_data::Catalog;
///
/// let catalog = Catalog::default();
/// assert_eq!(catalog.cities().len(), 7);
/// assert_eq!(catalog.cancel_reasons().len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    cities: Vec<CityEntry>,
    channels: Vec<Weighted>,
    device_types: Vec<Weighted>,
    currencies: Vec<String>,
    cancel_reasons: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            cities: vec![
                CityEntry::new("New York", "USA", 180.0),
                CityEntry::new("London", "UK", 170.0),
                CityEntry::new("Paris", "FRA", 160.0),
                CityEntry::new("Dubai", "UAE", 150.0),
                CityEntry::new("Mumbai", "IND", 90.0),
                CityEntry::new("Tokyo", "JPN", 140.0),
                CityEntry::new("Sydney", "AUS", 130.0),
            ],
            channels: vec![
                Weighted::new("app", 0.6),
                Weighted::new("web", 0.35),
                Weighted::new("partner", 0.05),
            ],
            device_types: vec![
                Weighted::new("iOS", 0.4),
                Weighted::new("Android", 0.4),
                Weighted::new("Web", 0.2),
            ],
            currencies: ["USD", "EUR", "GBP", "AED", "INR", "JPY", "AUD"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            cancel_reasons: [
                "guest_change_of_plans",
                "host_issue",
                "payment_issue",
                "weather",
                "overbooking",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}

impl Catalog {
    /// Parses a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if:
    /// - The JSON is malformed or missing required fields
    /// - The version is unsupported
    /// - Any list is empty
    /// - A base rate or weight is not a positive finite number
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json).map_err(|e| CatalogError::ParseError {
            message: e.to_string(),
        })?;

        Self::from_raw(raw)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawCatalog) -> Result<Self, CatalogError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        require_non_empty(&raw.cities, "cities")?;
        require_non_empty(&raw.channels, "channels")?;
        require_non_empty(&raw.device_types, "deviceTypes")?;
        require_non_empty(&raw.currencies, "currencies")?;
        require_non_empty(&raw.cancel_reasons, "cancelReasons")?;

        if let Some(entry) = raw
            .cities
            .iter()
            .find(|entry| !is_positive_finite(entry.base_rate))
        {
            return Err(CatalogError::InvalidBaseRate {
                city: entry.city.clone(),
                value: entry.base_rate,
            });
        }

        validate_weights(&raw.channels, "channels")?;
        validate_weights(&raw.device_types, "deviceTypes")?;

        Ok(Self {
            cities: raw.cities,
            channels: raw.channels,
            device_types: raw.device_types,
            currencies: raw.currencies,
            cancel_reasons: raw.cancel_reasons,
        })
    }

    /// Returns the city catalog.
    #[must_use]
    pub fn cities(&self) -> &[CityEntry] {
        &self.cities
    }

    /// Returns the weighted booking channels.
    #[must_use]
    pub fn channels(&self) -> &[Weighted] {
        &self.channels
    }

    /// Returns the weighted device types.
    #[must_use]
    pub fn device_types(&self) -> &[Weighted] {
        &self.device_types
    }

    /// Returns the currency codes.
    #[must_use]
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Returns the cancellation reasons.
    #[must_use]
    pub fn cancel_reasons(&self) -> &[String] {
        &self.cancel_reasons
    }
}

fn require_non_empty<T>(items: &[T], list: &'static str) -> Result<(), CatalogError> {
    if items.is_empty() {
        return Err(CatalogError::EmptyList { list });
    }
    Ok(())
}

fn validate_weights(items: &[Weighted], list: &'static str) -> Result<(), CatalogError> {
    match items.iter().find(|item| !is_positive_finite(item.weight)) {
        Some(item) => Err(CatalogError::InvalidWeight {
            list,
            value: item.value.clone(),
            weight: item.weight,
        }),
        None => Ok(()),
    }
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Raw JSON structure for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    version: u32,
    cities: Vec<CityEntry>,
    channels: Vec<Weighted>,
    device_types: Vec<Weighted>,
    currencies: Vec<String>,
    cancel_reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const VALID_JSON: &str = r#"{
        "version": 1,
        "cities": [{"city": "Lisbon", "country": "PRT", "baseRate": 110}],
        "channels": [{"value": "app", "weight": 1}],
        "deviceTypes": [{"value": "iOS", "weight": 2}, {"value": "Web", "weight": 1}],
        "currencies": ["EUR"],
        "cancelReasons": ["weather"]
    }"#;

    #[test]
    fn default_catalog_matches_built_in_data() {
        let catalog = Catalog::default();

        assert_eq!(catalog.cities().len(), 7);
        assert_eq!(catalog.currencies().len(), 7);
        let tokyo = catalog
            .cities()
            .iter()
            .find(|entry| entry.city == "Tokyo")
            .expect("Tokyo is catalogued");
        assert_eq!(tokyo.country, "JPN");
        assert_eq!(tokyo.base_rate, 140.0);
        let channels: Vec<_> = catalog.channels().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(channels, ["app", "web", "partner"]);
    }

    #[test]
    fn parses_valid_override() {
        let catalog = Catalog::from_json(VALID_JSON).expect("valid catalog");

        assert_eq!(catalog.cities(), [CityEntry::new("Lisbon", "PRT", 110.0)]);
        assert_eq!(catalog.device_types().len(), 2);
        assert_eq!(catalog.cancel_reasons(), ["weather".to_owned()]);
    }

    #[test]
    fn rejects_malformed_json() {
        let result = Catalog::from_json("not json");
        assert!(matches!(result, Err(CatalogError::ParseError { .. })));
    }

    #[test]
    fn rejects_unsupported_version() {
        let json = VALID_JSON.replace("\"version\": 1", "\"version\": 3");
        assert_eq!(
            Catalog::from_json(&json),
            Err(CatalogError::UnsupportedVersion {
                expected: 1,
                actual: 3
            })
        );
    }

    #[rstest]
    #[case::cities(r#""cities": [{"city": "Lisbon", "country": "PRT", "baseRate": 110}]"#, r#""cities": []"#, "cities")]
    #[case::currencies(r#""currencies": ["EUR"]"#, r#""currencies": []"#, "currencies")]
    #[case::reasons(r#""cancelReasons": ["weather"]"#, r#""cancelReasons": []"#, "cancelReasons")]
    #[case::channels(r#""channels": [{"value": "app", "weight": 1}]"#, r#""channels": []"#, "channels")]
    fn rejects_empty_lists(#[case] from: &str, #[case] to: &str, #[case] list: &'static str) {
        let json = VALID_JSON.replace(from, to);
        assert_eq!(
            Catalog::from_json(&json),
            Err(CatalogError::EmptyList { list })
        );
    }

    #[test]
    fn rejects_non_positive_base_rate() {
        let json = VALID_JSON.replace("\"baseRate\": 110", "\"baseRate\": 0");
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::InvalidBaseRate { ref city, .. }) if city == "Lisbon"
        ));
    }

    #[test]
    fn rejects_non_positive_weight() {
        let json = VALID_JSON.replace(
            r#"{"value": "Web", "weight": 1}"#,
            r#"{"value": "Web", "weight": -1}"#,
        );
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::InvalidWeight { list: "deviceTypes", ref value, .. }) if value == "Web"
        ));
    }

    #[test]
    fn reports_missing_file() {
        let result = Catalog::from_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(CatalogError::IoError { .. })));
    }
}
