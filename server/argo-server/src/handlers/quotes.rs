use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use database_layer::{Quote, QuoteInput, QuoteListRow, QuoteOutcome};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::{date_filter, parse_enum_list, parse_id_list, parse_str_list};
use crate::server::ArgoServer;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::csv_export::{csv_response, CsvExporter, MAX_EXPORT_ROWS};
use crate::utils::fx;
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_non_negative, validate_required};

pub const RESOURCE: &str = "quotes";

const SELECT_BASE: &str = "SELECT q.*, c.name AS client_name, s.name AS supplier_name, \
     p.name AS project_name, sp.name AS sales_person_name, a.name AS author_name \
     FROM quotes q \
     LEFT JOIN companies c ON c.id = q.client_id \
     LEFT JOIN companies s ON s.id = q.supplier_id \
     LEFT JOIN projects p ON p.id = q.project_id \
     LEFT JOIN people sp ON sp.id = q.sales_person_id \
     LEFT JOIN people a ON a.id = q.author_id";

const COUNT_BASE: &str = "SELECT COUNT(*) \
     FROM quotes q \
     LEFT JOIN companies c ON c.id = q.client_id \
     LEFT JOIN companies s ON s.id = q.supplier_id \
     LEFT JOIN projects p ON p.id = q.project_id \
     LEFT JOIN people sp ON sp.id = q.sales_person_id \
     LEFT JOIN people a ON a.id = q.author_id";

const METADATA_BASE: &str = "SELECT q.outcome, COUNT(*) \
     FROM quotes q \
     LEFT JOIN companies c ON c.id = q.client_id \
     LEFT JOIN companies s ON s.id = q.supplier_id \
     LEFT JOIN projects p ON p.id = q.project_id \
     LEFT JOIN people sp ON sp.id = q.sales_person_id \
     LEFT JOIN people a ON a.id = q.author_id";

/// Query parameters for quote list, metadata and export endpoints
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListParams {
    /// Substring match on the reference number
    pub reference: Option<String>,
    /// Comma-joined currency codes
    pub currency: Option<String>,
    /// Comma-joined outcome values (`WON,LOST,PENDING`)
    pub outcome: Option<String>,
    /// Comma-joined client company ids
    pub client_id: Option<String>,
    /// Comma-joined supplier company ids
    pub supplier_id: Option<String>,
    /// Comma-joined project ids
    pub project_id: Option<String>,
    /// Comma-joined sales person ids
    pub sales_person_id: Option<String>,
    /// Quote date: epoch millis (whole day) or epoch pair (range)
    pub date: Option<String>,
    /// Delivery date: epoch millis (whole day) or epoch pair (range)
    pub delivery_date: Option<String>,
    /// Linked-RFQ filter: `null` selects quotes with no RFQ, otherwise
    /// comma-joined RFQ ids
    pub rfq: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Aggregate counts for the dashboard summary tiles
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMetadata {
    pub total_quotes: i64,
    pub won: i64,
    pub lost: i64,
    pub pending: i64,
}

impl RequestValidation for QuoteInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!("currency", self.currency, "Currency is required");
        validate_field!(
            "currency",
            self.currency.trim().len() == 3,
            "Currency must be a 3-letter ISO code"
        );
        validate_non_negative!("value", self.value, "Value must not be negative");
        validate_field!(
            "authorId",
            !self.author_id.is_nil(),
            "Author is required"
        );
        Ok(())
    }
}

/// Apply the quote filter set to a query builder.
///
/// Shared by the page query, the count query, the metadata breakdown and
/// the CSV export so every variant sees identical filter state.
fn apply_filters(query: &mut PaginatedQuery, params: &QuoteListParams) {
    query
        .filter_contains("q.reference_number", params.reference.as_deref())
        .filter_in("q.currency", parse_str_list(params.currency.as_deref()))
        .filter_in(
            "q.outcome",
            parse_enum_list::<QuoteOutcome>(params.outcome.as_deref()),
        )
        .filter_in("q.client_id", parse_id_list(params.client_id.as_deref()))
        .filter_in("q.supplier_id", parse_id_list(params.supplier_id.as_deref()))
        .filter_in("q.project_id", parse_id_list(params.project_id.as_deref()))
        .filter_in(
            "q.sales_person_id",
            parse_id_list(params.sales_person_id.as_deref()),
        )
        .filter_date("q.date", date_filter(params.date.as_deref()).as_ref())
        .filter_date(
            "q.delivery_date",
            date_filter(params.delivery_date.as_deref()).as_ref(),
        );

    // The `null` sentinel selects quotes with no linked RFQ; this is
    // distinct from the parameter being absent (no filter at all).
    match params.rfq.as_deref().map(str::trim) {
        Some("null") => {
            query.filter_not_exists("SELECT 1 FROM rfqs r WHERE r.quote_id = q.id");
        }
        Some(raw) => {
            let ids: Vec<Uuid> = raw
                .split(',')
                .filter_map(|token| Uuid::parse_str(token.trim()).ok())
                .collect();
            query.filter_exists_any("SELECT 1 FROM rfqs r WHERE r.quote_id = q.id AND r.id", ids);
        }
        None => {}
    }
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "referenceNumber" => Some("q.reference_number"),
        "date" => Some("q.date"),
        "currency" => Some("q.currency"),
        "value" => Some("q.value"),
        "outcome" => Some("q.outcome"),
        "deliveryDate" => Some("q.delivery_date"),
        "clientName" => Some("c.name"),
        "supplierName" => Some("s.name"),
        "projectName" => Some("p.name"),
        "salesPersonName" => Some("sp.name"),
        "authorName" => Some("a.name"),
        "createdAt" => Some("q.created_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "q.created_at DESC";

/// List quotes with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/quotes",
    params(QuoteListParams),
    responses(
        (status = 200, description = "Quotes retrieved successfully", body = ListResponse<QuoteListRow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn list_quotes(
    State(server): State<ArgoServer>,
    Query(params): Query<QuoteListParams>,
) -> Result<Json<ListResponse<QuoteListRow>>, ApiError> {
    let key = CacheKey::list(RESOURCE, &params);
    let response = server
        .cache
        .get_or_load(key, || async {
            let sorts = parse_sort(params.sort.as_deref());
            let mode = PageMode::from_params(&params.pagination);

            let mut page_query = PaginatedQuery::new(SELECT_BASE);
            let mut count_query = PaginatedQuery::new(COUNT_BASE);
            apply_filters(&mut page_query, &params);
            apply_filters(&mut count_query, &params);
            page_query.order_by(&sorts, order_expr, DEFAULT_ORDER).paginate(mode);

            let (rows, total) = tokio::try_join!(
                page_query.fetch_all::<QuoteListRow>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Aggregate quote counts by outcome, honoring every filter except outcome
#[utoipa::path(
    get,
    path = "/api/v1/quotes/metadata",
    params(QuoteListParams),
    responses(
        (status = 200, description = "Quote metadata retrieved successfully", body = ApiResponse<QuoteMetadata>),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn quote_metadata(
    State(server): State<ArgoServer>,
    Query(params): Query<QuoteListParams>,
) -> Result<Json<ApiResponse<QuoteMetadata>>, ApiError> {
    let key = CacheKey::metadata(RESOURCE, &params);
    let metadata = server
        .cache
        .get_or_load(key, || async {
            // Reuse the filter set minus the field being broken down on, so
            // the per-outcome counts always sum to the filtered total.
            let mut grouped_params = params.clone();
            grouped_params.outcome = None;

            let mut query = PaginatedQuery::new(METADATA_BASE);
            apply_filters(&mut query, &grouped_params);
            query.query_builder().push(" GROUP BY q.outcome");

            let rows: Vec<(QuoteOutcome, i64)> = query.fetch_all(server.db.pool()).await?;

            let mut metadata = QuoteMetadata {
                total_quotes: 0,
                won: 0,
                lost: 0,
                pending: 0,
            };
            for (outcome, count) in rows {
                metadata.total_quotes += count;
                match outcome {
                    QuoteOutcome::Won => metadata.won = count,
                    QuoteOutcome::Lost => metadata.lost = count,
                    QuoteOutcome::Pending => metadata.pending = count,
                }
            }

            Ok::<_, ApiError>(metadata)
        })
        .await?;

    Ok(Json(api_success(metadata)))
}

/// Get a quote by ID
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote retrieved successfully", body = ApiResponse<Quote>),
        (status = 404, description = "Quote not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn get_quote(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Quote>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let quote = server
        .cache
        .get_or_load(key, || async {
            server.quote_repo.get_quote(id).await.map_err(ApiError::from)
        })
        .await?;

    match quote {
        Some(quote) => Ok(Json(api_success(quote))),
        None => Err(ApiError::not_found("quote")),
    }
}

/// Create a new quote
#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    request_body = QuoteInput,
    responses(
        (status = 201, description = "Quote created successfully", body = ApiResponse<Quote>),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Reference number collision"),
        (status = 422, description = "Referenced record does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn create_quote(
    State(server): State<ArgoServer>,
    Json(payload): Json<QuoteInput>,
) -> Result<(StatusCode, Json<ApiResponse<Quote>>), ApiError> {
    payload.validate()?;

    let fx_rate = fx::rate_to_usd(payload.currency.trim());
    let quote = server.quote_repo.create_quote(&payload, fx_rate).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(quote_id = %quote.id, reference = %quote.reference_number, "Quote created");
    Ok((StatusCode::CREATED, Json(api_success(quote))))
}

/// Update a quote.
///
/// The detail cache entry is patched optimistically while the database
/// write runs; on failure the pre-patch snapshot is restored verbatim.
#[utoipa::path(
    put,
    path = "/api/v1/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = QuoteInput,
    responses(
        (status = 200, description = "Quote updated successfully", body = ApiResponse<Quote>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Quote not found"),
        (status = 422, description = "Referenced record does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn update_quote(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuoteInput>,
) -> Result<Json<ApiResponse<Quote>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let quote = server
        .cache
        .update_optimistic(
            vec![CacheKey::detail(RESOURCE, id)],
            move |_, value| {
                if let (Some(target), Some(fields)) = (value.as_object_mut(), patch.as_object()) {
                    for (field, new_value) in fields {
                        target.insert(field.clone(), new_value.clone());
                    }
                }
            },
            async {
                server
                    .quote_repo
                    .update_quote(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(quote)))
}

/// Delete a quote
#[utoipa::path(
    delete,
    path = "/api/v1/quotes/{id}",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote deleted successfully", body = SuccessResponse),
        (status = 404, description = "Quote not found"),
        (status = 422, description = "Quote is still referenced"),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn delete_quote(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.quote_repo.delete_quote(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

/// Export the filtered quote list as CSV (same filters, no pagination)
#[utoipa::path(
    get,
    path = "/api/v1/quotes/export",
    params(QuoteListParams),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "quotes"
)]
pub async fn export_quotes(
    State(server): State<ArgoServer>,
    Query(params): Query<QuoteListParams>,
) -> Result<Response, ApiError> {
    let sorts = parse_sort(params.sort.as_deref());

    let mut query = PaginatedQuery::new(SELECT_BASE);
    apply_filters(&mut query, &params);
    query
        .order_by(&sorts, order_expr, DEFAULT_ORDER)
        .limit(MAX_EXPORT_ROWS as i64);

    let rows: Vec<QuoteListRow> = query.fetch_all(server.db.pool()).await?;

    let mut exporter = CsvExporter::new(&[
        "Reference",
        "Date",
        "Client",
        "Supplier",
        "Project",
        "Currency",
        "Value",
        "Outcome",
        "Delivery Date",
        "Sales Person",
        "Notes",
    ]);

    for row in &rows {
        let fields = [
            row.quote.reference_number.clone(),
            row.quote.date.to_string(),
            row.client_name.clone().unwrap_or_default(),
            row.supplier_name.clone().unwrap_or_default(),
            row.project_name.clone().unwrap_or_default(),
            row.quote.currency.clone(),
            row.quote.value.to_string(),
            row.quote.outcome.as_str().to_string(),
            row.quote
                .delivery_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.sales_person_name.clone().unwrap_or_default(),
            row.quote.notes.clone().unwrap_or_default(),
        ];
        if !exporter.push_row(fields.iter().map(String::as_str)) {
            break;
        }
    }

    Ok(csv_response("quotes.csv", exporter.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> QuoteListParams {
        QuoteListParams {
            reference: None,
            currency: None,
            outcome: None,
            client_id: None,
            supplier_id: None,
            project_id: None,
            sales_person_id: None,
            date: None,
            delivery_date: None,
            rfq: None,
            sort: None,
            pagination: PaginationParams {
                page: None,
                per_page: None,
            },
        }
    }

    #[test]
    fn test_empty_params_add_no_predicates() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        apply_filters(&mut query, &empty_params());
        assert_eq!(query.sql(), SELECT_BASE);
    }

    #[test]
    fn test_null_rfq_sentinel_is_distinct_from_absent() {
        let mut with_sentinel = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.rfq = Some("null".to_string());
        apply_filters(&mut with_sentinel, &params);
        assert!(with_sentinel.sql().contains("NOT EXISTS"));

        let mut without = PaginatedQuery::new(SELECT_BASE);
        apply_filters(&mut without, &empty_params());
        assert!(!without.sql().contains("NOT EXISTS"));
    }

    #[test]
    fn test_outcome_filter_parses_wire_values() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.outcome = Some("WON,LOST".to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("q.outcome = ANY($1)"));
    }

    #[test]
    fn test_sort_by_client_orders_by_joined_name() {
        assert_eq!(order_expr("clientName"), Some("c.name"));
        assert_eq!(order_expr("salesPersonName"), Some("sp.name"));
        assert_eq!(order_expr("bogus"), None);
    }

    #[test]
    fn test_count_and_page_queries_share_predicates() {
        let mut params = empty_params();
        params.currency = Some("USD".to_string());
        params.rfq = Some("null".to_string());

        let mut page_query = PaginatedQuery::new(SELECT_BASE);
        let mut count_query = PaginatedQuery::new(COUNT_BASE);
        apply_filters(&mut page_query, &params);
        apply_filters(&mut count_query, &params);

        let page_predicates = page_query.sql().trim_start_matches(SELECT_BASE).to_string();
        let count_predicates = count_query.sql().trim_start_matches(COUNT_BASE).to_string();
        assert_eq!(page_predicates, count_predicates);
    }

    #[test]
    fn test_list_params_cache_state_is_deterministic() {
        let mut a = empty_params();
        a.currency = Some("USD".to_string());
        let mut b = empty_params();
        b.currency = Some("USD".to_string());
        assert_eq!(CacheKey::list(RESOURCE, &a), CacheKey::list(RESOURCE, &b));

        let mut c = empty_params();
        c.currency = Some("EUR".to_string());
        assert_ne!(CacheKey::list(RESOURCE, &a), CacheKey::list(RESOURCE, &c));
    }

    #[test]
    fn test_quote_input_validation() {
        let input = QuoteInput {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            currency: "USD".to_string(),
            value: 1000.0,
            outcome: None,
            delivery_date: None,
            notes: None,
            files: None,
            author_id: Uuid::new_v4(),
            supplier_id: None,
            client_id: None,
            project_id: None,
            contact_person_id: None,
            sales_person_id: None,
        };
        assert!(input.validate().is_ok());

        let mut bad = input.clone();
        bad.currency = "DOLLARS".to_string();
        assert!(bad.validate().is_err());

        let mut bad = input.clone();
        bad.value = -5.0;
        assert!(bad.validate().is_err());

        let mut bad = input;
        bad.author_id = Uuid::nil();
        assert!(bad.validate().is_err());
    }
}
