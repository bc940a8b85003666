//! HTTP handler functions for the travel emissions API.

use actix_web::{HttpResponse, web};
use travel_emissions_server_models::{ApiHealth, AverageRequest};
use travel_emissions_trip::trip_average;

use crate::{AppState, ApiError, countries::country_options};

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /emissions`
///
/// Returns the provider's product catalog unchanged.
pub async fn products(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let catalog = state.provider.products().await.map_err(|e| {
        log::error!("Failed to fetch products: {e}");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(catalog))
}

/// `GET /countries`
///
/// Returns `[{label, value}]` ordered by the label's first letter.
pub async fn countries(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let countries = state.provider.countries().await.map_err(|e| {
        log::error!("Failed to fetch countries: {e}");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(country_options(countries)))
}

/// `POST /average`
///
/// Validates every trip, then averages the legs against the provider.
pub async fn average(
    state: web::Data<AppState>,
    body: web::Json<AverageRequest>,
) -> Result<HttpResponse, ApiError> {
    let legs = body.into_inner().into_legs().map_err(|e| {
        log::error!("Rejected trip request: {e}");
        ApiError::from(e)
    })?;

    let result = trip_average(state.provider.as_ref(), &legs)
        .await
        .map_err(|e| {
            log::error!("Failed to compute trip average: {e}");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use travel_emissions_provider::{EmissionsProvider, ProviderError};
    use travel_emissions_provider_models::{AverageQuery, Country, SparseSample};

    use crate::{AppState, configure};

    #[derive(Default)]
    struct MockProvider {
        samples: Vec<SparseSample>,
        failing: bool,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn check(&self) -> Result<(), ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(ProviderError::Status {
                    status: 503,
                    url: "http://provider.test".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EmissionsProvider for MockProvider {
        async fn products(&self) -> Result<serde_json::Value, ProviderError> {
            self.check()?;
            Ok(serde_json::json!([
                { "name": "carbonmonoxide", "product_variable": "CO_column_number_density" },
                { "name": "ozone", "product_variable": "O3_column_number_density" }
            ]))
        }

        async fn countries(&self) -> Result<Vec<Country>, ProviderError> {
            self.check()?;
            Ok(vec![
                Country {
                    code: "NL".to_string(),
                    name: "Netherlands".to_string(),
                },
                Country {
                    code: "DE".to_string(),
                    name: "Germany".to_string(),
                },
                Country {
                    code: "NO".to_string(),
                    name: "Norway".to_string(),
                },
            ])
        }

        async fn averages(
            &self,
            _query: &AverageQuery,
        ) -> Result<Vec<SparseSample>, ProviderError> {
            self.check()?;
            Ok(self.samples.clone())
        }
    }

    fn ten_on_new_year() -> MockProvider {
        MockProvider {
            samples: vec![SparseSample {
                date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                average: 10.0,
            }],
            ..MockProvider::default()
        }
    }

    macro_rules! app {
        ($provider:expr) => {
            test::init_service(
                App::new()
                    .app_data(actix_web::web::Data::new(AppState {
                        provider: $provider.clone(),
                    }))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let provider: Arc<dyn EmissionsProvider> = Arc::new(MockProvider::default());
        let app = app!(provider);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn passes_products_through() {
        let provider: Arc<dyn EmissionsProvider> = Arc::new(MockProvider::default());
        let app = app!(provider);

        let req = test::TestRequest::get().uri("/emissions").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body[0]["name"], "carbonmonoxide");
        assert_eq!(body[1]["product_variable"], "O3_column_number_density");
    }

    #[actix_web::test]
    async fn lists_sorted_country_options() {
        let provider: Arc<dyn EmissionsProvider> = Arc::new(MockProvider::default());
        let app = app!(provider);

        let req = test::TestRequest::get().uri("/countries").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            serde_json::json!([
                { "label": "Germany", "value": "DE" },
                { "label": "Netherlands", "value": "NL" },
                { "label": "Norway", "value": "NO" }
            ])
        );
    }

    #[actix_web::test]
    async fn averages_a_single_leg_trip() {
        let provider: Arc<dyn EmissionsProvider> = Arc::new(ten_on_new_year());
        let app = app!(provider);

        let req = test::TestRequest::post()
            .uri("/average")
            .set_json(serde_json::json!({
                "product": "carbonmonoxide",
                "trips": [{ "country": "NL", "begin": "2021-01-01", "end": "2021-01-03" }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({
                "total": 20.0,
                "average": 10.0,
                "details": [{ "total": 20.0, "days": 2 }]
            })
        );
    }

    #[actix_web::test]
    async fn empty_trip_list_averages_to_zero() {
        let provider: Arc<dyn EmissionsProvider> = Arc::new(MockProvider::default());
        let app = app!(provider);

        let req = test::TestRequest::post()
            .uri("/average")
            .set_json(serde_json::json!({ "product": "ozone", "trips": [] }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            serde_json::json!({ "total": 0.0, "average": 0.0, "details": [] })
        );
    }

    #[actix_web::test]
    async fn non_array_trips_is_an_error() {
        let mock = Arc::new(ten_on_new_year());
        let provider: Arc<dyn EmissionsProvider> = mock.clone();
        let app = app!(provider);

        let req = test::TestRequest::post()
            .uri("/average")
            .set_json(serde_json::json!({ "product": "ozone", "trips": { "country": "NL" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn invalid_trip_never_reaches_provider() {
        let mock = Arc::new(ten_on_new_year());
        let provider: Arc<dyn EmissionsProvider> = mock.clone();
        let app = app!(provider);

        let req = test::TestRequest::post()
            .uri("/average")
            .set_json(serde_json::json!({
                "product": "ozone",
                "trips": [
                    { "country": "NL", "begin": "2021-01-01", "end": "2021-01-03" },
                    { "begin": "2021-01-01", "end": "2021-01-03" }
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Trip 1: missing country or longitude/latitude");
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn upstream_failure_is_a_500() {
        let provider: Arc<dyn EmissionsProvider> = Arc::new(MockProvider {
            failing: true,
            ..MockProvider::default()
        });
        let app = app!(provider);

        for req in [
            test::TestRequest::get().uri("/emissions").to_request(),
            test::TestRequest::get().uri("/countries").to_request(),
            test::TestRequest::post()
                .uri("/average")
                .set_json(serde_json::json!({
                    "product": "ozone",
                    "trips": [{ "country": "NL", "begin": "2021-01-01", "end": "2021-01-03" }]
                }))
                .to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(
                body["error"]
                    .as_str()
                    .is_some_and(|message| message.contains("503"))
            );
        }
    }
}
