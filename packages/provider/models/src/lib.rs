#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Wire types for the upstream emissions data provider.
//!
//! The provider reports sparse daily pollutant averages for a location
//! (a country code or a longitude/latitude point) and a date range. These
//! types mirror its request parameters and response rows and are shared by
//! the HTTP client, the trip aggregator, and the gateway.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Date format used on the wire for request parameters and dense series.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

/// Where a trip leg takes place.
///
/// Exactly one selector is used per request: the provider is queried either
/// by country code or by a single point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LocationSelector {
    /// An ISO 3166 alpha-2 country code as listed by the provider (e.g. `"NL"`).
    Country {
        /// Country code.
        code: String,
    },
    /// A single geographic point.
    Coordinate(Coordinate),
}

impl fmt::Display for LocationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Country { code } => write!(f, "country {code}"),
            Self::Coordinate(point) => write!(f, "point {point}"),
        }
    }
}

/// One daily average reported by the provider.
///
/// The provider calls the date field `start` and may send either a plain
/// calendar date or a full timestamp; both are reduced to a UTC calendar
/// date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparseSample {
    /// Day the average was measured.
    #[serde(rename = "start", deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    /// Average pollutant value for that day.
    pub average: f64,
}

/// A country known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Country code (e.g. `"NL"`).
    pub code: String,
    /// Human-readable name (e.g. `"Netherlands"`).
    pub name: String,
}

/// Parameters for the provider's `{product}/average.json` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageQuery {
    /// Emission product name (e.g. `"carbonmonoxide"`).
    pub product: String,
    /// First day of the range.
    pub begin: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
    /// Country or point to query.
    pub location: LocationSelector,
}

impl AverageQuery {
    /// Returns the query-string pairs for this request.
    ///
    /// A coordinate is sent as two `point` parameters, longitude first.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("begin", self.begin.format(DATE_FORMAT).to_string()),
            ("end", self.end.format(DATE_FORMAT).to_string()),
        ];

        match &self.location {
            LocationSelector::Country { code } => pairs.push(("country", code.clone())),
            LocationSelector::Coordinate(point) => {
                pairs.push(("point", point.longitude.to_string()));
                pairs.push(("point", point.latitude.to_string()));
            }
        }

        pairs
    }
}

/// Parses a calendar date from either `YYYY-MM-DD` or an RFC 3339
/// timestamp.
///
/// Timestamps are converted to UTC before taking the date. Returns `None`
/// if the value matches neither form.
#[must_use]
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid sample date '{raw}'")))
}
