#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Trip leg and aggregate result types.
//!
//! A trip is an ordered list of [`TripLeg`]s. Each leg yields a
//! [`LegResult`]; the legs together yield a [`TripResult`]. All of these
//! are built per request and never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use travel_emissions_provider_models::{AverageQuery, LocationSelector};

/// One leg of a trip: a place, an emission product and a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLeg {
    /// Country or point the traveller stays at.
    pub location: LocationSelector,
    /// Emission product name (e.g. `"carbonmonoxide"`).
    pub product: String,
    /// First day of the stay.
    pub begin: NaiveDate,
    /// Day the stay ends (not counted).
    pub end: NaiveDate,
}

impl TripLeg {
    /// Number of whole days between `begin` and `end`, ignoring direction.
    #[must_use]
    pub fn span_days(&self) -> u64 {
        (self.end - self.begin).num_days().unsigned_abs()
    }

    /// Builds the provider query for this leg.
    #[must_use]
    pub fn query(&self) -> AverageQuery {
        AverageQuery {
            product: self.product.clone(),
            begin: self.begin,
            end: self.end,
            location: self.location.clone(),
        }
    }
}

/// A single day of a forward-filled series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenseDay {
    /// Calendar day.
    pub date: NaiveDate,
    /// Value carried for that day.
    pub average: f64,
}

/// Result for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LegResult {
    /// Sum of the leg's daily averages.
    pub total: f64,
    /// Days covered by the leg (0 when the provider had no data).
    pub days: u64,
}

/// Result for a whole trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TripResult {
    /// Sum of all leg totals.
    pub total: f64,
    /// `total` divided by the summed day count (or by 1 if that is 0).
    pub average: f64,
    /// Per-leg results in input order.
    pub details: Vec<LegResult>,
}

impl TripResult {
    /// Combines leg results, keeping their order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_details(details: Vec<LegResult>) -> Self {
        let total: f64 = details.iter().map(|leg| leg.total).sum();
        let days: u64 = details.iter().map(|leg| leg.days).sum();

        Self {
            total,
            average: total / days.max(1) as f64,
            details,
        }
    }

    /// Summed day count across all legs.
    #[must_use]
    pub fn days(&self) -> u64 {
        self.details.iter().map(|leg| leg.days).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn leg(begin: &str, end: &str) -> TripLeg {
        TripLeg {
            location: LocationSelector::Country {
                code: "NL".to_string(),
            },
            product: "carbonmonoxide".to_string(),
            begin: date(begin),
            end: date(end),
        }
    }

    #[test]
    fn span_is_direction_agnostic() {
        assert_eq!(leg("2021-01-01", "2021-01-03").span_days(), 2);
        assert_eq!(leg("2021-01-03", "2021-01-01").span_days(), 2);
        assert_eq!(leg("2021-01-01", "2021-01-01").span_days(), 0);
        assert_eq!(leg("2020-02-01", "2020-03-01").span_days(), 29);
    }

    #[test]
    fn query_copies_leg_fields() {
        let query = leg("2021-01-01", "2021-01-03").query();
        assert_eq!(query.product, "carbonmonoxide");
        assert_eq!(query.begin, date("2021-01-01"));
        assert_eq!(query.end, date("2021-01-03"));
    }

    #[test]
    fn trip_average_divides_by_total_days() {
        let result = TripResult::from_details(vec![
            LegResult {
                total: 20.0,
                days: 2,
            },
            LegResult {
                total: 10.0,
                days: 3,
            },
        ]);

        assert!((result.total - 30.0).abs() < f64::EPSILON);
        assert!((result.average - 6.0).abs() < f64::EPSILON);
        assert_eq!(result.days(), 5);
    }

    #[test]
    fn zero_days_falls_back_to_total() {
        let result = TripResult::from_details(vec![LegResult::default(), LegResult::default()]);
        assert!(result.total.abs() < f64::EPSILON);
        assert!(result.average.abs() < f64::EPSILON);

        let result = TripResult::from_details(vec![LegResult {
            total: 4.5,
            days: 0,
        }]);
        assert!((result.average - result.total).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_in_gateway_shape() {
        let result = TripResult::from_details(vec![LegResult {
            total: 20.0,
            days: 2,
        }]);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "total": 20.0,
                "average": 10.0,
                "details": [{ "total": 20.0, "days": 2 }]
            })
        );
    }
}
