//! HTTP request handlers, one module per resource

pub mod companies;
pub mod files;
pub mod follow_ups;
pub mod health;
pub mod people;
pub mod projects;
pub mod quotes;
pub mod registrations;
pub mod rfqs;

use std::str::FromStr;
use uuid::Uuid;

use crate::types::DateFilter;

/// Parse a comma-joined id list parameter. Tokens that are not valid UUIDs
/// are dropped; an absent parameter stays absent.
pub(crate) fn parse_id_list(raw: Option<&str>) -> Option<Vec<Uuid>> {
    raw.map(|list| {
        list.split(',')
            .filter_map(|token| Uuid::parse_str(token.trim()).ok())
            .collect()
    })
}

/// Parse a comma-joined string list parameter (currency codes etc.)
pub(crate) fn parse_str_list(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Parse a comma-joined enum list parameter, dropping unknown values
pub(crate) fn parse_enum_list<T: FromStr>(raw: Option<&str>) -> Option<Vec<T>> {
    raw.map(|list| {
        list.split(',')
            .filter_map(|token| T::from_str(token.trim()).ok())
            .collect()
    })
}

/// Wrap a raw date parameter for the query builder
pub(crate) fn date_filter(raw: Option<&str>) -> Option<DateFilter> {
    raw.map(|value| DateFilter::Raw(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use database_layer::QuoteOutcome;

    #[test]
    fn test_parse_id_list_drops_invalid_tokens() {
        let id = Uuid::new_v4();
        let raw = format!("{}, not-a-uuid", id);
        assert_eq!(parse_id_list(Some(&raw)), Some(vec![id]));
        assert_eq!(parse_id_list(None), None);
    }

    #[test]
    fn test_parse_str_list() {
        assert_eq!(
            parse_str_list(Some("USD, EUR ,")),
            Some(vec!["USD".to_string(), "EUR".to_string()])
        );
    }

    #[test]
    fn test_parse_enum_list_is_lenient() {
        assert_eq!(
            parse_enum_list::<QuoteOutcome>(Some("WON,banana,LOST")),
            Some(vec![QuoteOutcome::Won, QuoteOutcome::Lost])
        );
    }
}
