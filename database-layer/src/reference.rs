//! Reference-number generation for quotes and RFQs
//!
//! Reference numbers are human-readable identifiers of the form
//! `ARGO-<TAG><serial>-<MM>-<YYYY>`: a category tag, a zero-padded serial,
//! and the month/year of the record's own date (not the clock at insert
//! time). Formatting is pure and deterministic; the serial is sourced from
//! a running row count at creation time.

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use crate::error::DatabaseResult;

/// Width the serial is zero-padded to inside the reference string
const SERIAL_WIDTH: usize = 3;

/// Record categories that carry reference numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Quote,
    Rfq,
}

impl ReferenceKind {
    /// Category tag embedded in the reference string
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Quote => "Q",
            Self::Rfq => "R",
        }
    }

    fn table(&self) -> &'static str {
        match self {
            Self::Quote => "quotes",
            Self::Rfq => "rfqs",
        }
    }
}

/// Format a reference number from its parts.
///
/// Deterministic and pure: the same `(kind, serial, date)` always produces
/// the same string, and the month/year come from the supplied date.
pub fn format_reference(kind: ReferenceKind, serial: u32, date: NaiveDate) -> String {
    format!(
        "ARGO-{tag}{serial:0width$}-{month:02}-{year}",
        tag = kind.tag(),
        serial = serial,
        width = SERIAL_WIDTH,
        month = date.month(),
        year = date.year(),
    )
}

/// Compute the next serial for a category as `count(existing rows) + 1`.
///
/// This is a count-then-insert strategy: two concurrent creates can observe
/// the same count and produce colliding serials. The unique index on
/// `reference_number` turns the collision into a structured constraint
/// error rather than silent duplication. See DESIGN.md before changing
/// this to a sequence or a transaction.
pub async fn next_serial(pool: &PgPool, kind: ReferenceKind) -> DatabaseResult<u32> {
    let count: i64 = sqlx::query_scalar(match kind {
        ReferenceKind::Quote => "SELECT COUNT(*) FROM quotes",
        ReferenceKind::Rfq => "SELECT COUNT(*) FROM rfqs",
    })
    .fetch_one(pool)
    .await?;

    tracing::debug!(table = kind.table(), count, "Computed next reference serial");

    Ok(u32::try_from(count).unwrap_or(u32::MAX).saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_format_fixed_example() {
        assert_eq!(
            format_reference(ReferenceKind::Quote, 7, date(2024, 3, 15)),
            "ARGO-Q007-03-2024"
        );
    }

    #[test]
    fn test_reference_format_is_deterministic() {
        let a = format_reference(ReferenceKind::Rfq, 42, date(2023, 11, 2));
        let b = format_reference(ReferenceKind::Rfq, 42, date(2023, 11, 2));
        assert_eq!(a, b);
        assert_eq!(a, "ARGO-R042-11-2023");
    }

    #[test]
    fn test_reference_uses_record_date_not_today() {
        // A quote dated in another year keeps that year in its reference.
        assert_eq!(
            format_reference(ReferenceKind::Quote, 1, date(1999, 12, 31)),
            "ARGO-Q001-12-1999"
        );
    }

    #[test]
    fn test_serial_wider_than_padding() {
        assert_eq!(
            format_reference(ReferenceKind::Quote, 1234, date(2024, 1, 1)),
            "ARGO-Q1234-01-2024"
        );
    }

    #[test]
    fn test_month_zero_padding() {
        let reference = format_reference(ReferenceKind::Quote, 99, date(2025, 7, 4));
        assert_eq!(reference, "ARGO-Q099-07-2025");
    }
}
