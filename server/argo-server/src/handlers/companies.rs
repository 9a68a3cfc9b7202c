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

use database_layer::{Company, CompanyInput, CompanyType};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::parse_enum_list;
use crate::server::ArgoServer;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::csv_export::{csv_response, CsvExporter, MAX_EXPORT_ROWS};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_field, validate_length, validate_required};

pub const RESOURCE: &str = "companies";

const SELECT_BASE: &str = "SELECT co.* FROM companies co";
const COUNT_BASE: &str = "SELECT COUNT(*) FROM companies co";
const METADATA_BASE: &str = "SELECT co.company_type, COUNT(*) FROM companies co";

/// Query parameters for company list, metadata and export endpoints
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListParams {
    /// Substring match on the company name
    pub name: Option<String>,
    /// Substring match on the contact email
    pub email: Option<String>,
    /// Comma-joined company type values
    pub company_type: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Company counts by type for the dashboard summary tiles
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMetadata {
    pub total_companies: i64,
    pub by_type: HashMap<String, i64>,
}

impl RequestValidation for CompanyInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!("name", self.name, "Name is required");
        validate_length!("name", self.name, 1, 200, "Name must be between 1 and 200 characters");
        validate_email!("email", self.email, "Invalid email format");
        Ok(())
    }
}

fn apply_filters(query: &mut PaginatedQuery, params: &CompanyListParams) {
    query
        .filter_contains("co.name", params.name.as_deref())
        .filter_contains("co.email", params.email.as_deref())
        .filter_in(
            "co.company_type",
            parse_enum_list::<CompanyType>(params.company_type.as_deref()),
        );
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "name" => Some("co.name"),
        "email" => Some("co.email"),
        "companyType" => Some("co.company_type"),
        "createdAt" => Some("co.created_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "co.created_at DESC";

/// List companies with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(CompanyListParams),
    responses(
        (status = 200, description = "Companies retrieved successfully", body = ListResponse<Company>),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn list_companies(
    State(server): State<ArgoServer>,
    Query(params): Query<CompanyListParams>,
) -> Result<Json<ListResponse<Company>>, ApiError> {
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
                page_query.fetch_all::<Company>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Aggregate company counts by type, honoring every filter except type
#[utoipa::path(
    get,
    path = "/api/v1/companies/metadata",
    params(CompanyListParams),
    responses(
        (status = 200, description = "Company metadata retrieved successfully", body = ApiResponse<CompanyMetadata>),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn company_metadata(
    State(server): State<ArgoServer>,
    Query(params): Query<CompanyListParams>,
) -> Result<Json<ApiResponse<CompanyMetadata>>, ApiError> {
    let key = CacheKey::metadata(RESOURCE, &params);
    let metadata = server
        .cache
        .get_or_load(key, || async {
            let mut grouped_params = params.clone();
            grouped_params.company_type = None;

            let mut query = PaginatedQuery::new(METADATA_BASE);
            apply_filters(&mut query, &grouped_params);
            query.query_builder().push(" GROUP BY co.company_type");

            let rows: Vec<(CompanyType, i64)> = query.fetch_all(server.db.pool()).await?;

            let mut by_type = HashMap::new();
            let mut total = 0;
            for (company_type, count) in rows {
                total += count;
                by_type.insert(company_type.as_str().to_string(), count);
            }

            Ok::<_, ApiError>(CompanyMetadata {
                total_companies: total,
                by_type,
            })
        })
        .await?;

    Ok(Json(api_success(metadata)))
}

/// Get a company by ID
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company retrieved successfully", body = ApiResponse<Company>),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn get_company(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let company = server
        .cache
        .get_or_load(key, || async {
            server
                .directory_repo
                .get_company(id)
                .await
                .map_err(ApiError::from)
        })
        .await?;

    match company {
        Some(company) => Ok(Json(api_success(company))),
        None => Err(ApiError::not_found("company")),
    }
}

/// Create a new company
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CompanyInput,
    responses(
        (status = 201, description = "Company created successfully", body = ApiResponse<Company>),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Company name already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn create_company(
    State(server): State<ArgoServer>,
    Json(payload): Json<CompanyInput>,
) -> Result<(StatusCode, Json<ApiResponse<Company>>), ApiError> {
    payload.validate()?;

    let company = server.directory_repo.create_company(&payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(company_id = %company.id, name = %company.name, "Company created");
    Ok((StatusCode::CREATED, Json(api_success(company))))
}

/// Update a company
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CompanyInput,
    responses(
        (status = 200, description = "Company updated successfully", body = ApiResponse<Company>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Company name already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn update_company(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyInput>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let company = server
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
                    .directory_repo
                    .update_company(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(company)))
}

/// Delete a company.
///
/// Fails with a structured foreign-key error when the company is still
/// referenced by a project, person, quote, RFQ or registration.
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted successfully", body = SuccessResponse),
        (status = 404, description = "Company not found"),
        (status = 422, description = "Company is still referenced"),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn delete_company(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.directory_repo.delete_company(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

/// Export the filtered company list as CSV (same filters, no pagination)
#[utoipa::path(
    get,
    path = "/api/v1/companies/export",
    params(CompanyListParams),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "companies"
)]
pub async fn export_companies(
    State(server): State<ArgoServer>,
    Query(params): Query<CompanyListParams>,
) -> Result<Response, ApiError> {
    let sorts = parse_sort(params.sort.as_deref());

    let mut query = PaginatedQuery::new(SELECT_BASE);
    apply_filters(&mut query, &params);
    query
        .order_by(&sorts, order_expr, DEFAULT_ORDER)
        .limit(MAX_EXPORT_ROWS as i64);

    let rows: Vec<Company> = query.fetch_all(server.db.pool()).await?;

    let mut exporter = CsvExporter::new(&["Name", "Email", "Phone", "Type"]);
    for company in &rows {
        let fields = [
            company.name.clone(),
            company.email.clone().unwrap_or_default(),
            company.phone.clone().unwrap_or_default(),
            company.company_type.as_str().to_string(),
        ];
        if !exporter.push_row(fields.iter().map(String::as_str)) {
            break;
        }
    }

    Ok(csv_response("companies.csv", exporter.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> CompanyListParams {
        CompanyListParams {
            name: None,
            email: None,
            company_type: None,
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
    fn test_type_filter_parses_wire_values() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.company_type = Some("SUPPLIER,CLIENT".to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("co.company_type = ANY($1)"));
    }

    #[test]
    fn test_company_input_validation() {
        let input = CompanyInput {
            name: "Acme Trading".to_string(),
            email: Some("sales@acme.example".to_string()),
            phone: None,
            company_type: CompanyType::Supplier,
        };
        assert!(input.validate().is_ok());

        let mut bad = input.clone();
        bad.name = " ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = input;
        bad.email = Some("nope".to_string());
        assert!(bad.validate().is_err());
    }
}
