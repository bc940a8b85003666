#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the travel emissions gateway.
//!
//! Request bodies are loosely shaped (the web form posts coordinates as
//! strings and may put the product on each trip or once for the whole
//! request). [`AverageRequest::into_legs`] turns them into strictly typed
//! [`TripLeg`]s, rejecting anything malformed before the provider is
//! contacted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use travel_emissions_provider_models::{Coordinate, LocationSelector, parse_calendar_date};
use travel_emissions_trip_models::TripLeg;

/// Body of `POST /average`.
#[derive(Debug, Clone, Deserialize)]
pub struct AverageRequest {
    /// Product applied to every trip that does not name its own.
    #[serde(default)]
    pub product: Option<String>,
    /// Trip legs in the order they should be reported.
    pub trips: Vec<ApiTrip>,
}

/// A trip leg as posted by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTrip {
    /// Country code; mutually exclusive with the coordinates.
    #[serde(default)]
    pub country: Option<String>,
    /// Longitude, as a number or a numeric string.
    #[serde(default)]
    pub longitude: Option<CoordinateValue>,
    /// Latitude, as a number or a numeric string.
    #[serde(default)]
    pub latitude: Option<CoordinateValue>,
    /// First day (`YYYY-MM-DD` or an RFC 3339 timestamp).
    #[serde(default)]
    pub begin: Option<String>,
    /// End day (`YYYY-MM-DD` or an RFC 3339 timestamp).
    #[serde(default)]
    pub end: Option<String>,
    /// Per-trip product, overriding [`AverageRequest::product`].
    #[serde(default)]
    pub product: Option<String>,
}

/// A coordinate component that may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    /// A JSON number.
    Number(f64),
    /// A string such as `"52.37"`.
    Text(String),
}

impl CoordinateValue {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
        .filter(|value: &f64| value.is_finite())
    }

    fn describe(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// Reasons a request is rejected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The body could not be decoded (including `trips` not being an array).
    #[error("Invalid request body: {message}")]
    Body {
        /// Decoder message.
        message: String,
    },

    /// Neither the trip nor the request names a product.
    #[error("Trip {index}: missing product")]
    MissingProduct {
        /// Zero-based trip index.
        index: usize,
    },

    /// The product name cannot be used as a path segment.
    #[error("Trip {index}: invalid product '{product}'")]
    InvalidProduct {
        /// Zero-based trip index.
        index: usize,
        /// Offending product name.
        product: String,
    },

    /// Both a country and coordinates were given.
    #[error("Trip {index}: give either a country or coordinates, not both")]
    AmbiguousLocation {
        /// Zero-based trip index.
        index: usize,
    },

    /// No country and no complete coordinate pair.
    #[error("Trip {index}: missing country or longitude/latitude")]
    MissingLocation {
        /// Zero-based trip index.
        index: usize,
    },

    /// A coordinate is not a number or is out of range.
    #[error("Trip {index}: invalid {field} '{value}'")]
    InvalidCoordinate {
        /// Zero-based trip index.
        index: usize,
        /// `"longitude"` or `"latitude"`.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// `begin` or `end` is absent.
    #[error("Trip {index}: missing {field}")]
    MissingDate {
        /// Zero-based trip index.
        index: usize,
        /// `"begin"` or `"end"`.
        field: &'static str,
    },

    /// `begin` or `end` is not a date.
    #[error("Trip {index}: invalid {field} '{value}'")]
    InvalidDate {
        /// Zero-based trip index.
        index: usize,
        /// `"begin"` or `"end"`.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// `end` is before `begin`.
    #[error("Trip {index}: end {end} is before begin {begin}")]
    ReversedRange {
        /// Zero-based trip index.
        index: usize,
        /// Parsed begin date.
        begin: String,
        /// Parsed end date.
        end: String,
    },
}

impl AverageRequest {
    /// Validates every trip and converts them into [`TripLeg`]s.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, in trip order.
    pub fn into_legs(self) -> Result<Vec<TripLeg>, ValidationError> {
        let default_product = self.product;

        self.trips
            .into_iter()
            .enumerate()
            .map(|(index, trip)| trip.into_leg(index, default_product.as_deref()))
            .collect()
    }
}

impl ApiTrip {
    /// Validates this trip and converts it into a [`TripLeg`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem found.
    pub fn into_leg(
        self,
        index: usize,
        default_product: Option<&str>,
    ) -> Result<TripLeg, ValidationError> {
        let product = self
            .product
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or_else(|| default_product.map(str::trim).filter(|p| !p.is_empty()))
            .ok_or(ValidationError::MissingProduct { index })?;

        if !is_valid_product(product) {
            return Err(ValidationError::InvalidProduct {
                index,
                product: product.to_string(),
            });
        }

        let location = self.location(index)?;
        let begin = parse_date(index, "begin", self.begin.as_deref())?;
        let end = parse_date(index, "end", self.end.as_deref())?;

        if end < begin {
            return Err(ValidationError::ReversedRange {
                index,
                begin: begin.to_string(),
                end: end.to_string(),
            });
        }

        Ok(TripLeg {
            location,
            product: product.to_string(),
            begin,
            end,
        })
    }

    fn location(&self, index: usize) -> Result<LocationSelector, ValidationError> {
        let country = self
            .country
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        let longitude = self.longitude.as_ref().filter(|v| !v.is_blank());
        let latitude = self.latitude.as_ref().filter(|v| !v.is_blank());

        match (country, longitude, latitude) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(ValidationError::AmbiguousLocation { index })
            }
            (Some(code), None, None) => Ok(LocationSelector::Country {
                code: code.to_string(),
            }),
            (None, Some(longitude), Some(latitude)) => {
                let longitude = parse_coordinate(index, "longitude", longitude, 180.0)?;
                let latitude = parse_coordinate(index, "latitude", latitude, 90.0)?;
                Ok(LocationSelector::Coordinate(Coordinate {
                    longitude,
                    latitude,
                }))
            }
            (None, _, _) => Err(ValidationError::MissingLocation { index }),
        }
    }
}

/// Product names become a URL path segment, so only a safe subset is
/// accepted.
fn is_valid_product(product: &str) -> bool {
    !product.is_empty()
        && product
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && product != "."
        && product != ".."
}

fn parse_coordinate(
    index: usize,
    field: &'static str,
    value: &CoordinateValue,
    limit: f64,
) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|v| v.abs() <= limit)
        .ok_or_else(|| ValidationError::InvalidCoordinate {
            index,
            field,
            value: value.describe(),
        })
}

fn parse_date(
    index: usize,
    field: &'static str,
    value: Option<&str>,
) -> Result<NaiveDate, ValidationError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingDate { index, field })?;

    parse_calendar_date(value).ok_or_else(|| ValidationError::InvalidDate {
        index,
        field,
        value: value.to_string(),
    })
}

/// A country entry for selection lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    /// Country name shown to the user.
    pub label: String,
    /// Country code sent back in requests.
    pub value: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
