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

use database_layer::{Registration, RegistrationInput, RegistrationListRow, RegistrationStatus};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::{parse_enum_list, parse_id_list};
use crate::server::ArgoServer;
use crate::storage::validate_object_key;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::csv_export::{csv_response, CsvExporter, MAX_EXPORT_ROWS};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::validate_field;

pub const RESOURCE: &str = "registrations";

const SELECT_BASE: &str = "SELECT re.*, co.name AS company_name, a.name AS author_name \
     FROM registrations re \
     LEFT JOIN companies co ON co.id = re.company_id \
     LEFT JOIN people a ON a.id = re.author_id";

const COUNT_BASE: &str = "SELECT COUNT(*) \
     FROM registrations re \
     LEFT JOIN companies co ON co.id = re.company_id \
     LEFT JOIN people a ON a.id = re.author_id";

const METADATA_BASE: &str = "SELECT re.status, COUNT(*) \
     FROM registrations re \
     LEFT JOIN companies co ON co.id = re.company_id \
     LEFT JOIN people a ON a.id = re.author_id";

/// Query parameters for registration list, metadata and export endpoints
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationListParams {
    /// Comma-joined status values (`PURSUING` .. `DECLINED`)
    pub status: Option<String>,
    /// Comma-joined company ids
    pub company_id: Option<String>,
    /// Comma-joined author person ids
    pub author_id: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Registration counts by status for the dashboard summary tiles
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationMetadata {
    pub total_registrations: i64,
    pub by_status: HashMap<String, i64>,
}

impl RequestValidation for RegistrationInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!("companyId", !self.company_id.is_nil(), "Company is required");
        validate_field!("authorId", !self.author_id.is_nil(), "Author is required");
        if let Some(ref file) = self.file {
            validate_field!("file", validate_object_key(file), "Invalid file key");
        }
        Ok(())
    }
}

fn apply_filters(query: &mut PaginatedQuery, params: &RegistrationListParams) {
    query
        .filter_in(
            "re.status",
            parse_enum_list::<RegistrationStatus>(params.status.as_deref()),
        )
        .filter_in("re.company_id", parse_id_list(params.company_id.as_deref()))
        .filter_in("re.author_id", parse_id_list(params.author_id.as_deref()));
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "status" => Some("re.status"),
        "companyName" => Some("co.name"),
        "authorName" => Some("a.name"),
        "createdAt" => Some("re.created_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "re.created_at DESC";

/// List registrations with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/registrations",
    params(RegistrationListParams),
    responses(
        (status = 200, description = "Registrations retrieved successfully", body = ListResponse<RegistrationListRow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn list_registrations(
    State(server): State<ArgoServer>,
    Query(params): Query<RegistrationListParams>,
) -> Result<Json<ListResponse<RegistrationListRow>>, ApiError> {
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
                page_query.fetch_all::<RegistrationListRow>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Aggregate registration counts by status, honoring every filter except status
#[utoipa::path(
    get,
    path = "/api/v1/registrations/metadata",
    params(RegistrationListParams),
    responses(
        (status = 200, description = "Registration metadata retrieved successfully", body = ApiResponse<RegistrationMetadata>),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn registration_metadata(
    State(server): State<ArgoServer>,
    Query(params): Query<RegistrationListParams>,
) -> Result<Json<ApiResponse<RegistrationMetadata>>, ApiError> {
    let key = CacheKey::metadata(RESOURCE, &params);
    let metadata = server
        .cache
        .get_or_load(key, || async {
            let mut grouped_params = params.clone();
            grouped_params.status = None;

            let mut query = PaginatedQuery::new(METADATA_BASE);
            apply_filters(&mut query, &grouped_params);
            query.query_builder().push(" GROUP BY re.status");

            let rows: Vec<(RegistrationStatus, i64)> = query.fetch_all(server.db.pool()).await?;

            let mut by_status = HashMap::new();
            let mut total = 0;
            for (status, count) in rows {
                total += count;
                by_status.insert(status.as_str().to_string(), count);
            }

            Ok::<_, ApiError>(RegistrationMetadata {
                total_registrations: total,
                by_status,
            })
        })
        .await?;

    Ok(Json(api_success(metadata)))
}

/// Get a registration by ID
#[utoipa::path(
    get,
    path = "/api/v1/registrations/{id}",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration retrieved successfully", body = ApiResponse<Registration>),
        (status = 404, description = "Registration not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn get_registration(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Registration>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let registration = server
        .cache
        .get_or_load(key, || async {
            server
                .registration_repo
                .get_registration(id)
                .await
                .map_err(ApiError::from)
        })
        .await?;

    match registration {
        Some(registration) => Ok(Json(api_success(registration))),
        None => Err(ApiError::not_found("registration")),
    }
}

/// Create a new registration
#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    request_body = RegistrationInput,
    responses(
        (status = 201, description = "Registration created successfully", body = ApiResponse<Registration>),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Referenced record does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn create_registration(
    State(server): State<ArgoServer>,
    Json(payload): Json<RegistrationInput>,
) -> Result<(StatusCode, Json<ApiResponse<Registration>>), ApiError> {
    payload.validate()?;

    let registration = server.registration_repo.create_registration(&payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(
        registration_id = %registration.id,
        company_id = %registration.company_id,
        "Registration created"
    );
    Ok((StatusCode::CREATED, Json(api_success(registration))))
}

/// Update a registration
#[utoipa::path(
    put,
    path = "/api/v1/registrations/{id}",
    params(("id" = Uuid, Path, description = "Registration ID")),
    request_body = RegistrationInput,
    responses(
        (status = 200, description = "Registration updated successfully", body = ApiResponse<Registration>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Registration not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn update_registration(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegistrationInput>,
) -> Result<Json<ApiResponse<Registration>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let registration = server
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
                    .registration_repo
                    .update_registration(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(registration)))
}

/// Delete a registration
#[utoipa::path(
    delete,
    path = "/api/v1/registrations/{id}",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration deleted successfully", body = SuccessResponse),
        (status = 404, description = "Registration not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn delete_registration(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.registration_repo.delete_registration(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

/// Export the filtered registration list as CSV (same filters, no pagination)
#[utoipa::path(
    get,
    path = "/api/v1/registrations/export",
    params(RegistrationListParams),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "registrations"
)]
pub async fn export_registrations(
    State(server): State<ArgoServer>,
    Query(params): Query<RegistrationListParams>,
) -> Result<Response, ApiError> {
    let sorts = parse_sort(params.sort.as_deref());

    let mut query = PaginatedQuery::new(SELECT_BASE);
    apply_filters(&mut query, &params);
    query
        .order_by(&sorts, order_expr, DEFAULT_ORDER)
        .limit(MAX_EXPORT_ROWS as i64);

    let rows: Vec<RegistrationListRow> = query.fetch_all(server.db.pool()).await?;

    let mut exporter = CsvExporter::new(&["Company", "Status", "Author", "File", "Notes"]);
    for row in &rows {
        let fields = [
            row.company_name.clone().unwrap_or_default(),
            row.registration.status.as_str().to_string(),
            row.author_name.clone().unwrap_or_default(),
            row.registration.file.clone().unwrap_or_default(),
            row.registration.notes.clone().unwrap_or_default(),
        ];
        if !exporter.push_row(fields.iter().map(String::as_str)) {
            break;
        }
    }

    Ok(csv_response("registrations.csv", exporter.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> RegistrationListParams {
        RegistrationListParams {
            status: None,
            company_id: None,
            author_id: None,
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
    fn test_full_status_range_parses() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.status = Some("PURSUING,UNDER_REVIEW,DECLINED".to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("re.status = ANY($1)"));
    }

    #[test]
    fn test_registration_input_validation() {
        let input = RegistrationInput {
            company_id: Uuid::new_v4(),
            status: RegistrationStatus::Pursuing,
            author_id: Uuid::new_v4(),
            file: Some("registrations/cert.pdf".to_string()),
            notes: None,
        };
        assert!(input.validate().is_ok());

        let mut bad = input.clone();
        bad.company_id = Uuid::nil();
        assert!(bad.validate().is_err());

        let mut bad = input;
        bad.file = Some("../escape".to_string());
        assert!(bad.validate().is_err());
    }
}
