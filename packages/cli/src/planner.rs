//! Interactive trip planner.
//!
//! Walks the user through one or more legs, computes the trip against the
//! provider and prints the totals the way the web form shows them.

use dialoguer::{Confirm, Input, Select};
use travel_emissions_provider::EmissionsProvider;
use travel_emissions_provider_models::parse_calendar_date;
use travel_emissions_server::countries::country_options;
use travel_emissions_server_models::{ApiTrip, CountryOption, CoordinateValue};
use travel_emissions_trip::trip_average;
use travel_emissions_trip_models::{TripLeg, TripResult};

/// How a leg's location is entered.
enum LocationKind {
    Country,
    Coordinates,
}

impl LocationKind {
    const ALL: &[Self] = &[Self::Country, Self::Coordinates];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::Coordinates => "Coordinates",
        }
    }
}

/// Runs the planner until the user stops adding legs, then prints the
/// trip's totals.
///
/// # Errors
///
/// Returns an error if a prompt fails or any provider call fails.
pub async fn run(provider: &dyn EmissionsProvider) -> Result<(), Box<dyn std::error::Error>> {
    let countries = country_options(provider.countries().await?);
    let products = product_names(&provider.products().await?);

    if products.is_empty() {
        println!("The provider lists no emission products.");
        return Ok(());
    }

    let mut legs: Vec<TripLeg> = Vec::new();
    loop {
        println!();
        println!("Leg {}", legs.len() + 1);

        match prompt_leg(legs.len(), &countries, &products)?.into_leg(legs.len(), None) {
            Ok(leg) => legs.push(leg),
            Err(e) => {
                println!("{e}");
                continue;
            }
        }

        if !Confirm::new()
            .with_prompt("Add another leg?")
            .default(false)
            .interact()?
        {
            break;
        }
    }

    let result = trip_average(provider, &legs).await?;

    println!();
    for line in report_lines(&result) {
        println!("{line}");
    }

    Ok(())
}

fn prompt_leg(
    index: usize,
    countries: &[CountryOption],
    products: &[String],
) -> Result<ApiTrip, Box<dyn std::error::Error>> {
    let kind = Select::new()
        .with_prompt("Location")
        .items(&LocationKind::ALL.iter().map(LocationKind::label).collect::<Vec<_>>())
        .default(0)
        .interact()?;

    let mut trip = ApiTrip::default();

    match (&LocationKind::ALL[kind], countries.is_empty()) {
        (LocationKind::Country, false) => {
            let labels: Vec<&str> = countries.iter().map(|c| c.label.as_str()).collect();
            let idx = Select::new()
                .with_prompt("Country")
                .items(&labels)
                .max_length(20)
                .default(0)
                .interact()?;
            trip.country = Some(countries[idx].value.clone());
        }
        (LocationKind::Country, true) => {
            let code: String = Input::new().with_prompt("Country code").interact_text()?;
            trip.country = Some(code);
        }
        (LocationKind::Coordinates, _) => {
            let longitude: f64 = Input::new()
                .with_prompt("Longitude")
                .validate_with(|v: &f64| range_check(*v, 180.0))
                .interact_text()?;
            let latitude: f64 = Input::new()
                .with_prompt("Latitude")
                .validate_with(|v: &f64| range_check(*v, 90.0))
                .interact_text()?;
            trip.longitude = Some(CoordinateValue::Number(longitude));
            trip.latitude = Some(CoordinateValue::Number(latitude));
        }
    }

    let product = Select::new()
        .with_prompt("Emission product")
        .items(products)
        .default(0)
        .interact()?;
    trip.product = Some(products[product].clone());

    trip.begin = Some(prompt_date(&format!("Leg {} begin (YYYY-MM-DD)", index + 1))?);
    trip.end = Some(prompt_date(&format!("Leg {} end (YYYY-MM-DD)", index + 1))?);

    Ok(trip)
}

fn prompt_date(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(Input::new()
        .with_prompt(prompt)
        .validate_with(|v: &String| {
            parse_calendar_date(v)
                .map(|_| ())
                .ok_or("Expected a date like 2021-01-31")
        })
        .interact_text()?)
}

fn range_check(value: f64, limit: f64) -> Result<(), String> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(format!("Must be between -{limit} and {limit}"))
    }
}

/// Extracts product names from the provider catalog.
///
/// Entries may be objects with a `name` field or bare strings; anything
/// else is skipped.
fn product_names(catalog: &serde_json::Value) -> Vec<String> {
    catalog
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("name").unwrap_or(entry).as_str())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Formats a trip result as the lines shown to the user.
fn report_lines(result: &TripResult) -> Vec<String> {
    let mut lines = vec![
        format!("Total emissions: {} mol/m²", result.total),
        format!("Average emissions: {} mol/m²", result.average),
    ];
    lines.extend(result.details.iter().map(|leg| {
        format!(
            "An average of {} mol/m² for {} days.",
            leg.total, leg.days
        )
    }));
    lines
}
