//! Query builder utilities for consistent SQL query construction
//!
//! This module provides utilities to eliminate duplication in SQL query
//! building across handlers, particularly for filtering, ordering, and
//! pagination. Every list endpoint applies its filters through ONE function
//! shared by the page query, the count query, the metadata breakdown and
//! the CSV export, so all of them always see identical filter state.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::types::date_filter::DateFilter;
use crate::types::pagination::PageMode;
use crate::types::sorting::SortParam;

/// Paginated query builder for consistent query construction
///
/// Example usage:
/// ```ignore
/// let mut query = PaginatedQuery::new("SELECT co.* FROM companies co");
/// query
///     .filter_contains("co.name", params.name.as_deref())
///     .filter_in("co.company_type", company_types)
///     .order_by(&sorts, company_order_expr, "co.created_at DESC")
///     .paginate(PageMode::from_params(&params.pagination));
///
/// let rows: Vec<Company> = query.fetch_all(&pool).await?;
/// ```
pub struct PaginatedQuery<'a> {
    query: QueryBuilder<'a, Postgres>,
    has_where: bool,
}

impl<'a> PaginatedQuery<'a> {
    /// Create a new query builder from a base SELECT (no WHERE clause)
    pub fn new(base_query: impl Into<String>) -> Self {
        Self {
            query: QueryBuilder::new(base_query),
            has_where: false,
        }
    }

    /// Push ` WHERE ` before the first predicate, ` AND ` before the rest
    fn push_predicate_prefix(&mut self) {
        if self.has_where {
            self.query.push(" AND ");
        } else {
            self.query.push(" WHERE ");
            self.has_where = true;
        }
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'static,
    {
        if let Some(val) = value {
            self.push_predicate_prefix();
            self.query.push(format!("{} = ", column));
            self.query.push_bind(val);
        }
        self
    }

    /// Add a case-insensitive substring filter (only if value is non-empty)
    pub fn filter_contains(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(raw) = value {
            let needle = raw.trim();
            if !needle.is_empty() {
                self.push_predicate_prefix();
                self.query.push(format!("{} ILIKE ", column));
                self.query.push_bind(format!("%{}%", escape_like(needle)));
                self.query.push(" ESCAPE '\\'");
            }
        }
        self
    }

    /// Add a set-membership filter (only if values is non-empty).
    ///
    /// An empty list means "no constraint", never "match nothing".
    pub fn filter_in<T>(&mut self, column: &str, values: Option<Vec<T>>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres>
            + sqlx::Type<Postgres>
            + sqlx::postgres::PgHasArrayType
            + Send
            + Sync
            + 'static,
    {
        if let Some(vals) = values {
            if !vals.is_empty() {
                self.push_predicate_prefix();
                self.query.push(format!("{} = ANY(", column));
                self.query.push_bind(vals);
                self.query.push(")");
            }
        }
        self
    }

    /// Add an inclusive date-range filter on a `DATE` column.
    ///
    /// Malformed filter values resolve to no bounds and add no constraint.
    pub fn filter_date(&mut self, column: &str, filter: Option<&DateFilter>) -> &mut Self {
        if let Some(bounds) = filter.and_then(DateFilter::date_bounds) {
            let (start, end) = bounds;
            self.push_predicate_prefix();
            self.query.push(format!("{} >= ", column));
            self.query.push_bind(start);
            self.query.push(format!(" AND {} <= ", column));
            self.query.push_bind(end);
        }
        self
    }

    /// Constrain to rows where the given column is NULL (the `null` sentinel
    /// for a direct foreign-key relation filter)
    pub fn filter_is_null(&mut self, column: &str) -> &mut Self {
        self.push_predicate_prefix();
        self.query.push(format!("{} IS NULL", column));
        self
    }

    /// Constrain to rows with no related rows matching the correlated
    /// subquery (the `null` sentinel for a reverse relation filter)
    pub fn filter_not_exists(&mut self, subquery: &str) -> &mut Self {
        self.push_predicate_prefix();
        self.query.push(format!("NOT EXISTS ({})", subquery));
        self
    }

    /// Constrain to rows whose related rows include one of `ids`.
    ///
    /// `subquery_prefix` is a correlated subquery ending in the related id
    /// column, e.g. `SELECT 1 FROM rfqs r WHERE r.quote_id = q.id AND r.id`.
    pub fn filter_exists_any(&mut self, subquery_prefix: &str, ids: Vec<uuid::Uuid>) -> &mut Self {
        if !ids.is_empty() {
            self.push_predicate_prefix();
            self.query.push(format!("EXISTS ({} = ANY(", subquery_prefix));
            self.query.push_bind(ids);
            self.query.push("))");
        }
        self
    }

    /// Add an ORDER BY clause from the request's sort entries.
    ///
    /// `column_expr` maps a wire column id to a concrete SQL expression;
    /// entries it does not recognize are dropped, and when nothing remains
    /// the fixed `default_expr` applies. Joined columns order by the joined
    /// field, not the foreign key.
    pub fn order_by(
        &mut self,
        sorts: &[SortParam],
        column_expr: impl Fn(&str) -> Option<&'static str>,
        default_expr: &str,
    ) -> &mut Self {
        let mut exprs: Vec<String> = sorts
            .iter()
            .filter_map(|sort| {
                column_expr(&sort.id)
                    .map(|col| format!("{} {}", col, if sort.desc { "DESC" } else { "ASC" }))
            })
            .collect();

        if exprs.is_empty() {
            exprs.push(default_expr.to_string());
        }

        self.query.push(" ORDER BY ");
        self.query.push(exprs.join(", "));
        self
    }

    /// Apply the window for the given pagination mode. Unbounded mode adds
    /// no LIMIT/OFFSET; callers doing unbounded reads are expected to cap
    /// rows explicitly via [`Self::limit`].
    pub fn paginate(&mut self, mode: PageMode) -> &mut Self {
        if let Some((limit, offset)) = mode.limit_offset() {
            self.query.push(" LIMIT ");
            self.query.push_bind(limit);
            self.query.push(" OFFSET ");
            self.query.push_bind(offset);
        }
        self
    }

    /// Add a bare LIMIT (used by the CSV exporter's row cap)
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.query.push(" LIMIT ");
        self.query.push_bind(limit);
        self
    }

    /// The SQL accumulated so far (bind placeholders rendered as `$n`)
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    /// Execute the query and fetch all rows as the given type
    pub async fn fetch_all<T>(&mut self, pool: &PgPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        self.query.build_query_as::<T>().fetch_all(pool).await
    }

    /// Execute the query as a COUNT and fetch the single scalar
    pub async fn fetch_count(&mut self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        self.query.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Get the underlying query builder for advanced use cases
    pub fn query_builder(&mut self) -> &mut QueryBuilder<'a, Postgres> {
        &mut self.query
    }
}

/// Escape LIKE wildcards in user input so a literal `%`/`_` matches itself
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pagination::PaginationParams;
    use uuid::Uuid;

    const BASE: &str = "SELECT * FROM test_table";

    #[test]
    fn test_empty_filters_add_no_predicate() {
        let mut query = PaginatedQuery::new(BASE);
        query
            .filter_contains("name", None)
            .filter_contains("name", Some(""))
            .filter_contains("name", Some("   "))
            .filter_in("id", None::<Vec<Uuid>>)
            .filter_in("id", Some(Vec::<Uuid>::new()))
            .filter_date("date", None)
            .filter_eq("status", None::<String>);

        assert_eq!(query.sql(), BASE);
    }

    #[test]
    fn test_contains_filter_is_case_insensitive_substring() {
        let mut query = PaginatedQuery::new(BASE);
        query.filter_contains("name", Some("acme"));
        assert_eq!(
            query.sql(),
            "SELECT * FROM test_table WHERE name ILIKE $1 ESCAPE '\\'"
        );
    }

    #[test]
    fn test_in_filter_uses_any() {
        let mut query = PaginatedQuery::new(BASE);
        query.filter_in("id", Some(vec![Uuid::new_v4(), Uuid::new_v4()]));
        assert_eq!(query.sql(), "SELECT * FROM test_table WHERE id = ANY($1)");
    }

    #[test]
    fn test_empty_in_filter_never_matches_nothing() {
        // Regression guard: an empty multi-select must be "no constraint",
        // not an `IN ()` that matches zero rows.
        let mut query = PaginatedQuery::new(BASE);
        query.filter_in("id", Some(Vec::<Uuid>::new()));
        assert_eq!(query.sql(), BASE);
    }

    #[test]
    fn test_predicates_chain_with_where_then_and() {
        let mut query = PaginatedQuery::new(BASE);
        query
            .filter_contains("name", Some("acme"))
            .filter_eq("status", Some("active"));
        assert_eq!(
            query.sql(),
            "SELECT * FROM test_table WHERE name ILIKE $1 ESCAPE '\\' AND status = $2"
        );
    }

    #[test]
    fn test_date_filter_adds_inclusive_range() {
        let filter = crate::types::DateFilter::Raw("1710504000000".to_string());
        let mut query = PaginatedQuery::new(BASE);
        query.filter_date("date", Some(&filter));
        assert_eq!(
            query.sql(),
            "SELECT * FROM test_table WHERE date >= $1 AND date <= $2"
        );
    }

    #[test]
    fn test_malformed_date_filter_adds_no_constraint() {
        let filter = crate::types::DateFilter::Raw("garbage".to_string());
        let mut query = PaginatedQuery::new(BASE);
        query.filter_date("date", Some(&filter));
        assert_eq!(query.sql(), BASE);
    }

    #[test]
    fn test_null_sentinel_filters() {
        let mut query = PaginatedQuery::new(BASE);
        query.filter_is_null("quote_id");
        assert_eq!(query.sql(), "SELECT * FROM test_table WHERE quote_id IS NULL");

        let mut query = PaginatedQuery::new("SELECT q.* FROM quotes q");
        query.filter_not_exists("SELECT 1 FROM rfqs r WHERE r.quote_id = q.id");
        assert_eq!(
            query.sql(),
            "SELECT q.* FROM quotes q WHERE NOT EXISTS (SELECT 1 FROM rfqs r WHERE r.quote_id = q.id)"
        );
    }

    #[test]
    fn test_exists_any_with_ids() {
        let mut query = PaginatedQuery::new("SELECT q.* FROM quotes q");
        query.filter_exists_any(
            "SELECT 1 FROM rfqs r WHERE r.quote_id = q.id AND r.id",
            vec![Uuid::new_v4()],
        );
        assert_eq!(
            query.sql(),
            "SELECT q.* FROM quotes q WHERE EXISTS (SELECT 1 FROM rfqs r WHERE r.quote_id = q.id AND r.id = ANY($1))"
        );
    }

    #[test]
    fn test_exists_any_with_empty_ids_adds_nothing() {
        let mut query = PaginatedQuery::new("SELECT q.* FROM quotes q");
        query.filter_exists_any("SELECT 1 FROM rfqs r WHERE r.quote_id = q.id AND r.id", vec![]);
        assert_eq!(query.sql(), "SELECT q.* FROM quotes q");
    }

    fn quote_order_expr(id: &str) -> Option<&'static str> {
        match id {
            "value" => Some("q.value"),
            "clientName" => Some("c.name"),
            "createdAt" => Some("q.created_at"),
            _ => None,
        }
    }

    #[test]
    fn test_order_by_maps_columns() {
        let sorts = vec![SortParam::desc("value"), SortParam::asc("clientName")];
        let mut query = PaginatedQuery::new(BASE);
        query.order_by(&sorts, quote_order_expr, "q.created_at DESC");
        assert_eq!(
            query.sql(),
            "SELECT * FROM test_table ORDER BY q.value DESC, c.name ASC"
        );
    }

    #[test]
    fn test_order_by_joined_column_orders_by_joined_field() {
        let sorts = vec![SortParam::asc("clientName")];
        let mut query = PaginatedQuery::new(BASE);
        query.order_by(&sorts, quote_order_expr, "q.created_at DESC");
        assert!(query.sql().contains("ORDER BY c.name ASC"));
        assert!(!query.sql().contains("client_id"));
    }

    #[test]
    fn test_order_by_unknown_column_falls_back_to_default() {
        let sorts = vec![SortParam::desc("nonsense")];
        let mut query = PaginatedQuery::new(BASE);
        query.order_by(&sorts, quote_order_expr, "q.created_at DESC");
        assert_eq!(query.sql(), "SELECT * FROM test_table ORDER BY q.created_at DESC");
    }

    #[test]
    fn test_order_by_empty_sorts_uses_default() {
        let mut query = PaginatedQuery::new(BASE);
        query.order_by(&[], quote_order_expr, "q.created_at DESC");
        assert_eq!(query.sql(), "SELECT * FROM test_table ORDER BY q.created_at DESC");
    }

    #[test]
    fn test_paginate_binds_limit_and_offset() {
        let params = PaginationParams {
            page: Some(2),
            per_page: Some(25),
        };
        let mut query = PaginatedQuery::new(BASE);
        query.paginate(PageMode::from_params(&params));
        assert_eq!(query.sql(), "SELECT * FROM test_table LIMIT $1 OFFSET $2");
    }

    #[test]
    fn test_unbounded_mode_adds_no_window() {
        let mut query = PaginatedQuery::new(BASE);
        query.paginate(PageMode::Unbounded);
        assert_eq!(query.sql(), BASE);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_done\\x"), "50\\%\\_done\\\\x");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_same_filter_fn_for_count_and_page() {
        // The pattern every handler follows: one closure applied to both
        // builders yields predicates that differ only in the base SELECT.
        let apply = |query: &mut PaginatedQuery| {
            query
                .filter_contains("q.reference_number", Some("ARGO"))
                .filter_eq("q.currency", Some("USD".to_string()));
        };

        let mut page_query = PaginatedQuery::new("SELECT q.* FROM quotes q");
        let mut count_query = PaginatedQuery::new("SELECT COUNT(*) FROM quotes q");
        apply(&mut page_query);
        apply(&mut count_query);

        let page_sql = page_query.sql().trim_start_matches("SELECT q.* FROM quotes q");
        let count_sql = count_query.sql().trim_start_matches("SELECT COUNT(*) FROM quotes q");
        assert_eq!(page_sql, count_sql);
    }
}
