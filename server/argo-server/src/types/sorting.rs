//! Sort-state codec for list endpoints
//!
//! The `sort` query parameter carries the table's sort state as a
//! comma-joined list of `<columnId>.<asc|desc>` entries, first entry is the
//! primary sort key. The encoding round-trips exactly: parsing a serialized
//! value and serializing it again yields the identical string.

use std::fmt;

/// One sort entry: a column identifier and a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParam {
    pub id: String,
    pub desc: bool,
}

impl SortParam {
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: false,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: true,
        }
    }
}

impl fmt::Display for SortParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, if self.desc { "desc" } else { "asc" })
    }
}

/// Parse the `sort` parameter into ordered sort entries.
///
/// Entries that do not match `<id>.<asc|desc>` are dropped; an absent or
/// empty parameter yields an empty list (callers fall back to the default
/// ordering).
pub fn parse_sort(sort: Option<&str>) -> Vec<SortParam> {
    let Some(sort) = sort else {
        return Vec::new();
    };

    sort.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let (id, direction) = entry.rsplit_once('.')?;
            if id.is_empty() {
                return None;
            }
            match direction {
                "asc" => Some(SortParam::asc(id)),
                "desc" => Some(SortParam::desc(id)),
                _ => None,
            }
        })
        .collect()
}

/// Serialize sort entries back to the wire format
pub fn format_sort(sorts: &[SortParam]) -> String {
    sorts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_single_entry() {
        assert_eq!(parse_sort(Some("value.desc")), vec![SortParam::desc("value")]);
        assert_eq!(parse_sort(Some("name.asc")), vec![SortParam::asc("name")]);
    }

    #[test]
    fn test_parse_multiple_entries_preserves_priority() {
        let sorts = parse_sort(Some("clientName.asc,value.desc,createdAt.desc"));
        assert_eq!(
            sorts,
            vec![
                SortParam::asc("clientName"),
                SortParam::desc("value"),
                SortParam::desc("createdAt"),
            ]
        );
    }

    #[test]
    fn test_parse_absent_and_empty() {
        assert!(parse_sort(None).is_empty());
        assert!(parse_sort(Some("")).is_empty());
    }

    #[test]
    fn test_parse_drops_malformed_entries() {
        let sorts = parse_sort(Some("value.desc,bogus,other.sideways,.asc"));
        assert_eq!(sorts, vec![SortParam::desc("value")]);
    }

    #[test]
    fn test_round_trip_exact() {
        let wire = "clientName.asc,value.desc";
        let parsed = parse_sort(Some(wire));
        assert_eq!(format_sort(&parsed), wire);
    }

    proptest! {
        #[test]
        fn prop_format_parse_round_trip(
            entries in proptest::collection::vec(
                ("[a-zA-Z][a-zA-Z0-9]{0,12}", proptest::bool::ANY),
                0..5
            )
        ) {
            let sorts: Vec<SortParam> = entries
                .into_iter()
                .map(|(id, desc)| SortParam { id, desc })
                .collect();
            let wire = format_sort(&sorts);
            let reparsed = parse_sort(if wire.is_empty() { None } else { Some(&wire) });
            prop_assert_eq!(reparsed, sorts);
        }
    }
}
