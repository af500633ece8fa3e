//! Error types for the booking-data crate.
//!
//! This module defines semantic error enums for catalog parsing, booking
//! generation, store access, and the seeding loops, following the project's
//! error handling conventions with `thiserror`.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur when parsing a catalog override.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file at '{path}': {message}")]
    IoError {
        /// Path to the catalog file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The catalog JSON is malformed or missing required fields.
    #[error("invalid catalog JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The catalog version is not supported.
    #[error("unsupported catalog version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the catalog.
        actual: u32,
    },

    /// A required list has no entries.
    #[error("catalog list '{list}' must not be empty")]
    EmptyList {
        /// Name of the empty list.
        list: &'static str,
    },

    /// A city base rate is zero, negative, or not finite.
    #[error("invalid base rate {value} for city '{city}'")]
    InvalidBaseRate {
        /// City carrying the invalid rate.
        city: String,
        /// The rejected rate.
        value: f64,
    },

    /// A selection weight is zero, negative, or not finite.
    #[error("invalid weight {weight} for '{value}' in '{list}'")]
    InvalidWeight {
        /// Name of the weighted list.
        list: &'static str,
        /// Value carrying the invalid weight.
        value: String,
        /// The rejected weight.
        weight: f64,
    },
}

/// Errors raised while generating a booking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The drawn year, month, day, hour, and minute do not form a valid time.
    #[error("invalid creation time {year}-{month:02}-{day:02} {hour:02}:{minute:02}")]
    InvalidCreationTime {
        /// Target year.
        year: i32,
        /// Drawn month.
        month: u32,
        /// Drawn day of month.
        day: u32,
        /// Drawn hour.
        hour: u32,
        /// Drawn minute.
        minute: u32,
    },

    /// Adding the offset overflowed the supported calendar range.
    #[error("date {from} plus {days} days is out of range")]
    DateOutOfRange {
        /// Starting date.
        from: NaiveDate,
        /// Offset in days.
        days: u32,
    },

    /// A catalog list offered nothing to choose from.
    #[error("catalog list '{list}' has no selectable entries")]
    NothingToChoose {
        /// Name of the catalog list.
        list: &'static str,
    },
}

/// Errors raised by booking store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or the transport failed.
    #[error("store connection failed: {message}")]
    Connection {
        /// Transport failure description.
        message: String,
    },
    /// The store rejected the credentials.
    #[error("store rejected credentials: {message}")]
    Unauthorized {
        /// Store response description.
        message: String,
    },
    /// The store throttled the request.
    #[error("store throttled the request: {message}")]
    RateLimited {
        /// Store response description.
        message: String,
    },
    /// The addressed document does not exist.
    #[error("document not found: {message}")]
    NotFound {
        /// Identifier or response description.
        message: String,
    },
    /// The write conflicted with an existing resource.
    #[error("store conflict: {message}")]
    Conflict {
        /// Store response description.
        message: String,
    },
    /// The store rejected the request as malformed.
    #[error("store rejected the request: {message}")]
    InvalidRequest {
        /// Store response description.
        message: String,
    },
    /// The store response could not be decoded.
    #[error("failed to decode store response: {message}")]
    Decode {
        /// Decoder failure description.
        message: String,
    },
    /// The adapter hit an internal failure.
    #[error("store internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

impl StoreError {
    /// Builds a [`StoreError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Builds a [`StoreError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Errors that abort the publish or cancellation loops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedingError {
    /// A store operation failed.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
    /// A booking could not be generated.
    #[error("booking generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// The publish loop has no customer keys to draw from.
    #[error("no customer keys available for booking generation")]
    NoCustomerKeys,
}
