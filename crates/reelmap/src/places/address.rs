//! Splits a geocoder's formatted address into components.
//!
//! Expects the `street, City, ST 12345, Country` shape most geocoders
//! return. Anything that doesn't fit is kept only as the free-form
//! address.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressParts {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Reads components from the end: the last part is the country, the one
/// before it is the state with an optional postal code, and the one
/// before that is the city.
pub fn parse_address(address: &str) -> AddressParts {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut out = AddressParts::default();
    let Some((country, rest)) = parts.split_last() else {
        return out;
    };
    out.country = Some(country.to_string());

    let Some((state_part, rest)) = rest.split_last() else {
        return out;
    };
    let mut tokens = state_part.split_whitespace();
    out.state = tokens.next().map(str::to_string);
    let postal: Vec<&str> = tokens.collect();
    if !postal.is_empty() {
        out.postal_code = Some(postal.join(" "));
    }

    out.city = rest.last().map(|c| c.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_us_address() {
        let parts = parse_address("7 Carmine St, New York, NY 10014, USA");
        assert_eq!(parts.country.as_deref(), Some("USA"));
        assert_eq!(parts.state.as_deref(), Some("NY"));
        assert_eq!(parts.postal_code.as_deref(), Some("10014"));
        assert_eq!(parts.city.as_deref(), Some("New York"));
    }

    #[test]
    fn test_multi_token_postal_code() {
        let parts = parse_address("10 Downing St, London, SW1A 2AA, UK");
        assert_eq!(parts.city.as_deref(), Some("London"));
        assert_eq!(parts.state.as_deref(), Some("SW1A"));
        assert_eq!(parts.postal_code.as_deref(), Some("2AA"));
    }

    #[test]
    fn test_state_and_country_only() {
        let parts = parse_address("NY, USA");
        assert_eq!(parts.state.as_deref(), Some("NY"));
        assert!(parts.postal_code.is_none());
        assert!(parts.city.is_none());
    }

    #[test]
    fn test_country_only_and_empty() {
        assert_eq!(parse_address("Italy").country.as_deref(), Some("Italy"));
        assert_eq!(parse_address(""), AddressParts::default());
        assert_eq!(parse_address(" , "), AddressParts::default());
    }
}
