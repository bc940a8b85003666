//! Country list shaping for selection widgets.

use travel_emissions_provider_models::Country;
use travel_emissions_server_models::CountryOption;

/// Turns provider countries into `{label, value}` options.
///
/// Options are ordered by the first character of the lower-cased label
/// only. The sort is stable, so countries sharing a first letter keep the
/// provider's order, and an empty label comes first.
#[must_use]
pub fn country_options(countries: Vec<Country>) -> Vec<CountryOption> {
    let mut options: Vec<CountryOption> = countries
        .into_iter()
        .map(|country| CountryOption {
            label: country.name,
            value: country.code,
        })
        .collect();

    options.sort_by_key(|option| option.label.to_lowercase().chars().next());
    options
}
