use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use database_layer::{Rfq, RfqInput, RfqListRow, RfqReceipt, RfqStatus};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::{date_filter, parse_enum_list, parse_id_list, parse_str_list};
use crate::server::ArgoServer;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::csv_export::{csv_response, CsvExporter, MAX_EXPORT_ROWS};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_non_negative, validate_required};

pub const RESOURCE: &str = "rfqs";

const SELECT_BASE: &str = "SELECT r.*, s.name AS supplier_name, p.name AS project_name, \
     a.name AS author_name, q.reference_number AS quote_reference \
     FROM rfqs r \
     LEFT JOIN companies s ON s.id = r.supplier_id \
     LEFT JOIN projects p ON p.id = r.project_id \
     LEFT JOIN people a ON a.id = r.author_id \
     LEFT JOIN quotes q ON q.id = r.quote_id";

const COUNT_BASE: &str = "SELECT COUNT(*) \
     FROM rfqs r \
     LEFT JOIN companies s ON s.id = r.supplier_id \
     LEFT JOIN projects p ON p.id = r.project_id \
     LEFT JOIN people a ON a.id = r.author_id \
     LEFT JOIN quotes q ON q.id = r.quote_id";

const METADATA_BASE: &str = "SELECT r.status, COUNT(*) \
     FROM rfqs r \
     LEFT JOIN companies s ON s.id = r.supplier_id \
     LEFT JOIN projects p ON p.id = r.project_id \
     LEFT JOIN people a ON a.id = r.author_id \
     LEFT JOIN quotes q ON q.id = r.quote_id";

/// Query parameters for RFQ list, metadata and export endpoints
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RfqListParams {
    /// Substring match on the reference number
    pub reference: Option<String>,
    /// Comma-joined status values (`SENT,RECEIVED`)
    pub status: Option<String>,
    /// Comma-joined currency codes
    pub currency: Option<String>,
    /// Comma-joined supplier company ids
    pub supplier_id: Option<String>,
    /// Comma-joined project ids
    pub project_id: Option<String>,
    /// RFQ date: epoch millis (whole day) or epoch pair (range)
    pub date: Option<String>,
    /// Receipt date: epoch millis (whole day) or epoch pair (range)
    pub received_date: Option<String>,
    /// Linked-quote filter: `null` selects RFQs with no linked quote,
    /// otherwise comma-joined quote ids
    pub quote: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Aggregate RFQ counts for the dashboard summary tiles
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqMetadata {
    pub total_rfqs: i64,
    pub by_status: HashMap<String, i64>,
}

impl RequestValidation for RfqInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!("currency", self.currency, "Currency is required");
        validate_field!(
            "currency",
            self.currency.trim().len() == 3,
            "Currency must be a 3-letter ISO code"
        );
        validate_non_negative!("value", self.value, "Value must not be negative");
        validate_field!("authorId", !self.author_id.is_nil(), "Author is required");
        Ok(())
    }
}

impl RequestValidation for RfqReceipt {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(
            "receivedCurrency",
            self.received_currency,
            "Received currency is required"
        );
        validate_field!(
            "receivedCurrency",
            self.received_currency.trim().len() == 3,
            "Received currency must be a 3-letter ISO code"
        );
        validate_non_negative!(
            "receivedValue",
            self.received_value,
            "Received value must not be negative"
        );
        Ok(())
    }
}

fn apply_filters(query: &mut PaginatedQuery, params: &RfqListParams) {
    query
        .filter_contains("r.reference_number", params.reference.as_deref())
        .filter_in(
            "r.status",
            parse_enum_list::<RfqStatus>(params.status.as_deref()),
        )
        .filter_in("r.currency", parse_str_list(params.currency.as_deref()))
        .filter_in("r.supplier_id", parse_id_list(params.supplier_id.as_deref()))
        .filter_in("r.project_id", parse_id_list(params.project_id.as_deref()))
        .filter_date("r.date", date_filter(params.date.as_deref()).as_ref())
        .filter_date(
            "r.received_date",
            date_filter(params.received_date.as_deref()).as_ref(),
        );

    // `null` sentinel: RFQs with no linked quote. Distinct from absence.
    match params.quote.as_deref().map(str::trim) {
        Some("null") => {
            query.filter_is_null("r.quote_id");
        }
        Some(raw) => {
            query.filter_in("r.quote_id", parse_id_list(Some(raw)));
        }
        None => {}
    }
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "referenceNumber" => Some("r.reference_number"),
        "date" => Some("r.date"),
        "currency" => Some("r.currency"),
        "value" => Some("r.value"),
        "status" => Some("r.status"),
        "receivedDate" => Some("r.received_date"),
        "receivedValue" => Some("r.received_value"),
        "supplierName" => Some("s.name"),
        "projectName" => Some("p.name"),
        "quoteReference" => Some("q.reference_number"),
        "createdAt" => Some("r.created_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "r.created_at DESC";

/// List RFQs with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/rfqs",
    params(RfqListParams),
    responses(
        (status = 200, description = "RFQs retrieved successfully", body = ListResponse<RfqListRow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn list_rfqs(
    State(server): State<ArgoServer>,
    Query(params): Query<RfqListParams>,
) -> Result<Json<ListResponse<RfqListRow>>, ApiError> {
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
                page_query.fetch_all::<RfqListRow>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Aggregate RFQ counts by status, honoring every filter except status
#[utoipa::path(
    get,
    path = "/api/v1/rfqs/metadata",
    params(RfqListParams),
    responses(
        (status = 200, description = "RFQ metadata retrieved successfully", body = ApiResponse<RfqMetadata>),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn rfq_metadata(
    State(server): State<ArgoServer>,
    Query(params): Query<RfqListParams>,
) -> Result<Json<ApiResponse<RfqMetadata>>, ApiError> {
    let key = CacheKey::metadata(RESOURCE, &params);
    let metadata = server
        .cache
        .get_or_load(key, || async {
            let mut grouped_params = params.clone();
            grouped_params.status = None;

            let mut query = PaginatedQuery::new(METADATA_BASE);
            apply_filters(&mut query, &grouped_params);
            query.query_builder().push(" GROUP BY r.status");

            let rows: Vec<(RfqStatus, i64)> = query.fetch_all(server.db.pool()).await?;

            let mut by_status = HashMap::new();
            let mut total = 0;
            for (status, count) in rows {
                total += count;
                by_status.insert(status.as_str().to_string(), count);
            }

            Ok::<_, ApiError>(RfqMetadata {
                total_rfqs: total,
                by_status,
            })
        })
        .await?;

    Ok(Json(api_success(metadata)))
}

/// Get an RFQ by ID
#[utoipa::path(
    get,
    path = "/api/v1/rfqs/{id}",
    params(("id" = Uuid, Path, description = "RFQ ID")),
    responses(
        (status = 200, description = "RFQ retrieved successfully", body = ApiResponse<Rfq>),
        (status = 404, description = "RFQ not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn get_rfq(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Rfq>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let rfq = server
        .cache
        .get_or_load(key, || async {
            server.rfq_repo.get_rfq(id).await.map_err(ApiError::from)
        })
        .await?;

    match rfq {
        Some(rfq) => Ok(Json(api_success(rfq))),
        None => Err(ApiError::not_found("rfq")),
    }
}

/// Create a new RFQ (status starts at SENT)
#[utoipa::path(
    post,
    path = "/api/v1/rfqs",
    request_body = RfqInput,
    responses(
        (status = 201, description = "RFQ created successfully", body = ApiResponse<Rfq>),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Referenced record does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn create_rfq(
    State(server): State<ArgoServer>,
    Json(payload): Json<RfqInput>,
) -> Result<(StatusCode, Json<ApiResponse<Rfq>>), ApiError> {
    payload.validate()?;

    let rfq = server.rfq_repo.create_rfq(&payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(rfq_id = %rfq.id, reference = %rfq.reference_number, "RFQ created");
    Ok((StatusCode::CREATED, Json(api_success(rfq))))
}

/// Update an RFQ's editable fields
#[utoipa::path(
    put,
    path = "/api/v1/rfqs/{id}",
    params(("id" = Uuid, Path, description = "RFQ ID")),
    request_body = RfqInput,
    responses(
        (status = 200, description = "RFQ updated successfully", body = ApiResponse<Rfq>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "RFQ not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn update_rfq(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RfqInput>,
) -> Result<Json<ApiResponse<Rfq>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let rfq = server
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
                    .rfq_repo
                    .update_rfq(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(rfq)))
}

/// Record the supplier's answer to an RFQ
#[utoipa::path(
    put,
    path = "/api/v1/rfqs/{id}/receive",
    params(("id" = Uuid, Path, description = "RFQ ID")),
    request_body = RfqReceipt,
    responses(
        (status = 200, description = "RFQ marked as received", body = ApiResponse<Rfq>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "RFQ not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn receive_rfq(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RfqReceipt>,
) -> Result<Json<ApiResponse<Rfq>>, ApiError> {
    payload.validate()?;

    let rfq = server.rfq_repo.receive_rfq(id, &payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(rfq_id = %rfq.id, "RFQ marked received");
    Ok(Json(api_success(rfq)))
}

/// Delete an RFQ
#[utoipa::path(
    delete,
    path = "/api/v1/rfqs/{id}",
    params(("id" = Uuid, Path, description = "RFQ ID")),
    responses(
        (status = 200, description = "RFQ deleted successfully", body = SuccessResponse),
        (status = 404, description = "RFQ not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn delete_rfq(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.rfq_repo.delete_rfq(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

/// Export the filtered RFQ list as CSV (same filters, no pagination)
#[utoipa::path(
    get,
    path = "/api/v1/rfqs/export",
    params(RfqListParams),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rfqs"
)]
pub async fn export_rfqs(
    State(server): State<ArgoServer>,
    Query(params): Query<RfqListParams>,
) -> Result<Response, ApiError> {
    let sorts = parse_sort(params.sort.as_deref());

    let mut query = PaginatedQuery::new(SELECT_BASE);
    apply_filters(&mut query, &params);
    query
        .order_by(&sorts, order_expr, DEFAULT_ORDER)
        .limit(MAX_EXPORT_ROWS as i64);

    let rows: Vec<RfqListRow> = query.fetch_all(server.db.pool()).await?;

    let mut exporter = CsvExporter::new(&[
        "Reference",
        "Date",
        "Supplier",
        "Project",
        "Currency",
        "Value",
        "Status",
        "Received Date",
        "Received Value",
        "Quote",
        "Notes",
    ]);

    for row in &rows {
        let fields = [
            row.rfq.reference_number.clone(),
            row.rfq.date.to_string(),
            row.supplier_name.clone().unwrap_or_default(),
            row.project_name.clone().unwrap_or_default(),
            row.rfq.currency.clone(),
            row.rfq.value.to_string(),
            row.rfq.status.as_str().to_string(),
            row.rfq
                .received_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.rfq
                .received_value
                .map(|v| v.to_string())
                .unwrap_or_default(),
            row.quote_reference.clone().unwrap_or_default(),
            row.rfq.notes.clone().unwrap_or_default(),
        ];
        if !exporter.push_row(fields.iter().map(String::as_str)) {
            break;
        }
    }

    Ok(csv_response("rfqs.csv", exporter.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> RfqListParams {
        RfqListParams {
            reference: None,
            status: None,
            currency: None,
            supplier_id: None,
            project_id: None,
            date: None,
            received_date: None,
            quote: None,
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
    fn test_null_quote_sentinel_uses_is_null() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.quote = Some("null".to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("r.quote_id IS NULL"));
    }

    #[test]
    fn test_quote_id_filter_uses_membership() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.quote = Some(Uuid::new_v4().to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("r.quote_id = ANY($1)"));
    }

    #[test]
    fn test_sort_by_quote_reference_is_joined() {
        assert_eq!(order_expr("quoteReference"), Some("q.reference_number"));
    }

    #[test]
    fn test_receipt_validation() {
        let receipt = RfqReceipt {
            received_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            received_value: 500.0,
            received_currency: "USD".to_string(),
        };
        assert!(receipt.validate().is_ok());

        let mut bad = receipt.clone();
        bad.received_currency = "".to_string();
        assert!(bad.validate().is_err());

        let mut bad = receipt;
        bad.received_value = -1.0;
        assert!(bad.validate().is_err());
    }
}
