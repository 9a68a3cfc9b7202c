use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use database_layer::{Project, ProjectInput, ProjectListRow, ProjectStatus};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::{parse_enum_list, parse_id_list};
use crate::server::ArgoServer;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::csv_export::{csv_response, CsvExporter, MAX_EXPORT_ROWS};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_length, validate_required};

pub const RESOURCE: &str = "projects";

const SELECT_BASE: &str = "SELECT pr.*, co.name AS company_name \
     FROM projects pr \
     LEFT JOIN companies co ON co.id = pr.company_id";

const COUNT_BASE: &str = "SELECT COUNT(*) \
     FROM projects pr \
     LEFT JOIN companies co ON co.id = pr.company_id";

/// Query parameters for the project list and export endpoints
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListParams {
    /// Substring match on the project name
    pub name: Option<String>,
    /// Comma-joined status values (`IN_HAND,TENDER`)
    pub status: Option<String>,
    /// Comma-joined company ids
    pub company_id: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl RequestValidation for ProjectInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!("name", self.name, "Name is required");
        validate_length!("name", self.name, 1, 200, "Name must be between 1 and 200 characters");
        Ok(())
    }
}

fn apply_filters(query: &mut PaginatedQuery, params: &ProjectListParams) {
    query
        .filter_contains("pr.name", params.name.as_deref())
        .filter_in(
            "pr.status",
            parse_enum_list::<ProjectStatus>(params.status.as_deref()),
        )
        .filter_in("pr.company_id", parse_id_list(params.company_id.as_deref()));
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "name" => Some("pr.name"),
        "status" => Some("pr.status"),
        "companyName" => Some("co.name"),
        "createdAt" => Some("pr.created_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "pr.created_at DESC";

/// List projects with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(ProjectListParams),
    responses(
        (status = 200, description = "Projects retrieved successfully", body = ListResponse<ProjectListRow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "projects"
)]
pub async fn list_projects(
    State(server): State<ArgoServer>,
    Query(params): Query<ProjectListParams>,
) -> Result<Json<ListResponse<ProjectListRow>>, ApiError> {
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
                page_query.fetch_all::<ProjectListRow>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Get a project by ID
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project retrieved successfully", body = ApiResponse<Project>),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let project = server
        .cache
        .get_or_load(key, || async {
            server
                .directory_repo
                .get_project(id)
                .await
                .map_err(ApiError::from)
        })
        .await?;

    match project {
        Some(project) => Ok(Json(api_success(project))),
        None => Err(ApiError::not_found("project")),
    }
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectInput,
    responses(
        (status = 201, description = "Project created successfully", body = ApiResponse<Project>),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Referenced company does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(server): State<ArgoServer>,
    Json(payload): Json<ProjectInput>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    payload.validate()?;

    let project = server.directory_repo.create_project(&payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    Ok((StatusCode::CREATED, Json(api_success(project))))
}

/// Update a project
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project updated successfully", body = ApiResponse<Project>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "projects"
)]
pub async fn update_project(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProjectInput>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let project = server
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
                    .update_project(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(project)))
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted successfully", body = SuccessResponse),
        (status = 404, description = "Project not found"),
        (status = 422, description = "Project is still referenced"),
        (status = 500, description = "Internal server error")
    ),
    tag = "projects"
)]
pub async fn delete_project(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.directory_repo.delete_project(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

/// Export the filtered project list as CSV (same filters, no pagination)
#[utoipa::path(
    get,
    path = "/api/v1/projects/export",
    params(ProjectListParams),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "projects"
)]
pub async fn export_projects(
    State(server): State<ArgoServer>,
    Query(params): Query<ProjectListParams>,
) -> Result<Response, ApiError> {
    let sorts = parse_sort(params.sort.as_deref());

    let mut query = PaginatedQuery::new(SELECT_BASE);
    apply_filters(&mut query, &params);
    query
        .order_by(&sorts, order_expr, DEFAULT_ORDER)
        .limit(MAX_EXPORT_ROWS as i64);

    let rows: Vec<ProjectListRow> = query.fetch_all(server.db.pool()).await?;

    let mut exporter = CsvExporter::new(&["Name", "Status", "Company"]);
    for row in &rows {
        let fields = [
            row.project.name.clone(),
            row.project
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            row.company_name.clone().unwrap_or_default(),
        ];
        if !exporter.push_row(fields.iter().map(String::as_str)) {
            break;
        }
    }

    Ok(csv_response("projects.csv", exporter.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> ProjectListParams {
        ProjectListParams {
            name: None,
            status: None,
            company_id: None,
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
    fn test_status_filter_parses_wire_values() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.status = Some("IN_HAND".to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("pr.status = ANY($1)"));
    }

    #[test]
    fn test_project_input_validation() {
        let input = ProjectInput {
            name: "Harbor Expansion".to_string(),
            status: Some(ProjectStatus::Tender),
            company_id: None,
        };
        assert!(input.validate().is_ok());

        let mut bad = input;
        bad.name = "".to_string();
        assert!(bad.validate().is_err());
    }
}
