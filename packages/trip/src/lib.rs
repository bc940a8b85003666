#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-leg forward-fill averaging and trip-wide aggregation.
//!
//! The provider only reports the days it actually measured. For each leg
//! the sparse samples are expanded into one value per calendar day of the
//! leg ([`densify`]): a day takes the most recent sample at or before it,
//! and days before the first sample take the first sample. The dense values
//! are summed into a [`LegResult`].
//!
//! [`trip_average`] runs every leg concurrently and folds the results into
//! a [`TripResult`]. The first failing leg fails the whole trip; the
//! remaining in-flight requests are dropped.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use travel_emissions_provider::{EmissionsProvider, ProviderError};
use travel_emissions_provider_models::SparseSample;
use travel_emissions_trip_models::{DenseDay, LegResult, TripLeg, TripResult};

/// Errors from computing leg or trip averages.
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    /// The provider could not be reached or answered with an error status.
    #[error("Upstream request failed: {0}")]
    Upstream(#[source] ProviderError),

    /// The provider answered, but not with data we can compute on.
    #[error("Computation error: {message}")]
    Computation {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<ProviderError> for TripError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Payload { message } => Self::Computation { message },
            other => Self::Upstream(other),
        }
    }
}

/// Expands sparse samples into `days` consecutive days starting at `begin`.
///
/// Each day carries the latest sample dated at or before it. Days earlier
/// than every sample carry the earliest sample. The fill is seeded with
/// the latest sample on or before `begin`, so when several samples precede
/// the range only the most recent of them is used. Samples may arrive in
/// any order; when two share a date the one that comes later in `samples`
/// wins. Returns an empty series when there are no samples.
#[must_use]
pub fn densify(samples: &[SparseSample], begin: NaiveDate, days: u64) -> Vec<DenseDay> {
    forward_fill(samples, begin, days).collect()
}

/// Lazy form of [`densify`].
fn forward_fill(
    samples: &[SparseSample],
    begin: NaiveDate,
    days: u64,
) -> impl Iterator<Item = DenseDay> {
    // Keyed by date, so iteration is ascending regardless of input order.
    let by_date: BTreeMap<NaiveDate, f64> = samples
        .iter()
        .map(|sample| (sample.date, sample.average))
        .collect();

    let seed = by_date
        .range(..=begin)
        .next_back()
        .or_else(|| by_date.iter().next())
        .map(|(_, &average)| average);
    let days = if seed.is_some() { days } else { 0 };
    let mut current = seed.unwrap_or_default();

    (0..days)
        .map_while(move |offset| begin.checked_add_days(Days::new(offset)))
        .map(move |date| {
            if let Some(&average) = by_date.get(&date) {
                current = average;
            }
            DenseDay {
                date,
                average: current,
            }
        })
}

/// Computes a leg's result from samples the provider already returned.
///
/// With no samples the leg counts as `{ total: 0, days: 0 }`, whatever its
/// span.
#[must_use]
pub fn leg_result(leg: &TripLeg, samples: &[SparseSample]) -> LegResult {
    if samples.is_empty() {
        return LegResult::default();
    }

    let days = leg.span_days();
    let total = forward_fill(samples, leg.begin, days)
        .map(|day| day.average)
        .sum();

    LegResult { total, days }
}

/// Fetches the samples for one leg, warning when the provider has none.
async fn fetch_samples(
    provider: &dyn EmissionsProvider,
    leg: &TripLeg,
) -> Result<Vec<SparseSample>, TripError> {
    let samples = provider.averages(&leg.query()).await?;

    if samples.is_empty() {
        log::warn!(
            "No {} data for {} between {} and {}",
            leg.product,
            leg.location,
            leg.begin,
            leg.end,
        );
    }

    Ok(samples)
}

fn log_leg(leg: &TripLeg, result: LegResult) {
    log::debug!(
        "Leg {} {}..{}: total={} days={}",
        leg.location,
        leg.begin,
        leg.end,
        result.total,
        result.days,
    );
}

fn log_trip(result: &TripResult) {
    log::info!(
        "Trip of {} legs: total={} average={} days={}",
        result.details.len(),
        result.total,
        result.average,
        result.days(),
    );
}

/// Fetches a leg's samples and computes its [`LegResult`].
///
/// # Errors
///
/// Returns [`TripError`] if the provider call fails.
pub async fn leg_average(
    provider: &dyn EmissionsProvider,
    leg: &TripLeg,
) -> Result<LegResult, TripError> {
    let samples = fetch_samples(provider, leg).await?;
    let result = leg_result(leg, &samples);
    log_leg(leg, result);
    Ok(result)
}

/// Fetches a leg's samples once and returns both its [`LegResult`] and
/// its forward-filled daily series.
///
/// # Errors
///
/// Returns [`TripError`] if the provider call fails.
pub async fn leg_daily(
    provider: &dyn EmissionsProvider,
    leg: &TripLeg,
) -> Result<(LegResult, Vec<DenseDay>), TripError> {
    let samples = fetch_samples(provider, leg).await?;
    let result = leg_result(leg, &samples);
    log_leg(leg, result);
    Ok((result, densify(&samples, leg.begin, leg.span_days())))
}

/// Computes every leg concurrently and aggregates the trip.
///
/// `details` follows the order of `legs`, not the order in which the
/// provider calls complete.
///
/// # Errors
///
/// Returns the first [`TripError`] raised by any leg.
pub async fn trip_average(
    provider: &dyn EmissionsProvider,
    legs: &[TripLeg],
) -> Result<TripResult, TripError> {
    let details =
        futures::future::try_join_all(legs.iter().map(|leg| leg_average(provider, leg))).await?;

    let result = TripResult::from_details(details);
    log_trip(&result);
    Ok(result)
}

/// Like [`trip_average`], but also returns each leg's daily series.
///
/// Every leg is fetched exactly once; the series and the totals come from
/// the same response.
///
/// # Errors
///
/// Returns the first [`TripError`] raised by any leg.
pub async fn trip_daily(
    provider: &dyn EmissionsProvider,
    legs: &[TripLeg],
) -> Result<(TripResult, Vec<Vec<DenseDay>>), TripError> {
    let legs = futures::future::try_join_all(legs.iter().map(|leg| leg_daily(provider, leg))).await?;
    let (details, series): (Vec<_>, Vec<_>) = legs.into_iter().unzip();

    let result = TripResult::from_details(details);
    log_trip(&result);
    Ok((result, series))
}
