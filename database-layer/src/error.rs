use thiserror::Error;

/// Postgres error codes this layer classifies into structured variants.
mod pg_codes {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const NOT_NULL_VIOLATION: &str = "23502";
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Required column missing: {column}")]
    NotNullViolation { column: String },

    #[error("Database error: {0}")]
    SqlxError(sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<DatabaseError> for error_common::ArgoError {
    fn from(err: DatabaseError) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some(pg_codes::UNIQUE_VIOLATION) => {
                    return Self::UniqueViolation { constraint };
                }
                Some(pg_codes::FOREIGN_KEY_VIOLATION) => {
                    return Self::ForeignKeyViolation { constraint };
                }
                Some(pg_codes::NOT_NULL_VIOLATION) => {
                    let column = db_err
                        .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                        .and_then(|pg| pg.column())
                        .unwrap_or_default()
                        .to_string();
                    return Self::NotNullViolation { column };
                }
                _ => {}
            }
        }

        Self::SqlxError(err)
    }
}

/// Table names recognized when deriving a field key from a constraint name.
///
/// Longest names first so `follow_ups_quote_id_fkey` strips `follow_ups`
/// rather than stopping at the first underscore.
const TABLE_NAMES: &[&str] = &[
    "registrations",
    "follow_ups",
    "companies",
    "projects",
    "people",
    "quotes",
    "rfqs",
];

/// Derive the camelCase field key a constraint violation should be reported
/// under, from the Postgres constraint naming convention
/// `<table>_<column>_key` / `<table>_<column>_fkey`.
///
/// Returns `None` when the constraint does not follow the convention
/// (the caller then reports a form-level error instead).
pub fn field_for_constraint(constraint: &str) -> Option<String> {
    let stripped = constraint
        .strip_suffix("_fkey")
        .or_else(|| constraint.strip_suffix("_pkey"))
        .or_else(|| constraint.strip_suffix("_key"))?;

    let column = TABLE_NAMES
        .iter()
        .find_map(|table| stripped.strip_prefix(&format!("{}_", table)))?;

    if column.is_empty() {
        return None;
    }

    Some(snake_to_camel(column))
}

fn snake_to_camel(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_constraint_field() {
        assert_eq!(
            field_for_constraint("quotes_reference_number_key").as_deref(),
            Some("referenceNumber")
        );
        assert_eq!(
            field_for_constraint("companies_name_key").as_deref(),
            Some("name")
        );
    }

    #[test]
    fn test_foreign_key_constraint_field() {
        assert_eq!(
            field_for_constraint("projects_company_id_fkey").as_deref(),
            Some("companyId")
        );
        assert_eq!(
            field_for_constraint("quotes_contact_person_id_fkey").as_deref(),
            Some("contactPersonId")
        );
    }

    #[test]
    fn test_multi_word_table_prefix() {
        assert_eq!(
            field_for_constraint("follow_ups_quote_id_fkey").as_deref(),
            Some("quoteId")
        );
    }

    #[test]
    fn test_unconventional_constraint_name() {
        assert_eq!(field_for_constraint("some_custom_check"), None);
        assert_eq!(field_for_constraint("quotes_pkey"), None);
        assert_eq!(field_for_constraint(""), None);
    }

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("sales_person_id"), "salesPersonId");
        assert_eq!(snake_to_camel("name"), "name");
    }
}
