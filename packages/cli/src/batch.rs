//! Non-interactive trip averaging from a JSON request body.

use std::io::Read as _;
use std::path::Path;

use travel_emissions_provider::EmissionsProvider;
use travel_emissions_server_models::{AverageRequest, ValidationError};
use travel_emissions_trip::{trip_average, trip_daily};
use travel_emissions_trip_models::{TripLeg, TripResult};

/// Reads the request body from `file`, or from stdin when `None`.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read.
pub fn read_body(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

/// Decodes and validates a `POST /average`-shaped body.
///
/// # Errors
///
/// Returns a [`ValidationError`] under the same rules the gateway applies.
pub fn parse_request(body: &str) -> Result<Vec<TripLeg>, ValidationError> {
    let request: AverageRequest =
        serde_json::from_str(body).map_err(|e| ValidationError::Body {
            message: e.to_string(),
        })?;
    request.into_legs()
}

/// Validates `body` and computes the trip average.
///
/// With `daily` set, each leg's forward-filled series is logged at info
/// level as well. Either way every leg is fetched once.
///
/// # Errors
///
/// Returns an error if validation or any provider call fails.
pub async fn run(
    provider: &dyn EmissionsProvider,
    body: &str,
    daily: bool,
) -> Result<TripResult, Box<dyn std::error::Error>> {
    let legs = parse_request(body)?;

    if !daily {
        return Ok(trip_average(provider, &legs).await?);
    }

    let (result, series) = trip_daily(provider, &legs).await?;
    for (leg, days) in legs.iter().zip(&series) {
        for day in days {
            log::info!("{} {} {}: {}", leg.product, leg.location, day.date, day.average);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use travel_emissions_provider::ProviderError;
    use travel_emissions_provider_models::{AverageQuery, Country, SparseSample};

    use super::*;

    #[derive(Default)]
    struct OneSample {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmissionsProvider for OneSample {
        async fn products(&self) -> Result<serde_json::Value, ProviderError> {
            Ok(serde_json::json!([]))
        }

        async fn countries(&self) -> Result<Vec<Country>, ProviderError> {
            Ok(Vec::new())
        }

        async fn averages(
            &self,
            _query: &AverageQuery,
        ) -> Result<Vec<SparseSample>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_value(serde_json::json!([
                { "start": "2021-01-01", "average": 10.0 }
            ]))
            .unwrap())
        }
    }

    const NL_TRIP: &str = r#"{
        "product": "carbonmonoxide",
        "trips": [{ "country": "NL", "begin": "2021-01-01", "end": "2021-01-03" }]
    }"#;

    #[test]
    fn parses_gateway_bodies() {
        let legs = parse_request(NL_TRIP).unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].span_days(), 2);
    }

    #[test]
    fn malformed_json_is_a_body_error() {
        assert!(matches!(
            parse_request("{ not json"),
            Err(ValidationError::Body { .. })
        ));
        assert!(matches!(
            parse_request(r#"{ "product": "ozone", "trips": "NL" }"#),
            Err(ValidationError::Body { .. })
        ));
    }

    #[tokio::test]
    async fn computes_the_trip() {
        let provider = OneSample::default();
        let result = run(&provider, NL_TRIP, false).await.unwrap();
        assert!((result.total - 20.0).abs() < f64::EPSILON);
        assert!((result.average - 10.0).abs() < f64::EPSILON);
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].days, 2);
    }

    #[tokio::test]
    async fn daily_output_reuses_the_same_fetch() {
        let body = r#"{
            "product": "carbonmonoxide",
            "trips": [
                { "country": "NL", "begin": "2021-01-01", "end": "2021-01-03" },
                { "longitude": 4.9, "latitude": 52.37, "begin": "2021-01-01", "end": "2021-01-02" }
            ]
        }"#;

        let provider = OneSample::default();
        let result = run(&provider, body, true).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!((result.total - 30.0).abs() < f64::EPSILON);
        assert!((result.average - 10.0).abs() < f64::EPSILON);
    }
}
