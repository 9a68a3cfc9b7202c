use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use database_layer::{FollowUp, FollowUpInput, FollowUpListRow};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::parse_id_list;
use crate::server::ArgoServer;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::validate_field;

pub const RESOURCE: &str = "followUps";

const SELECT_BASE: &str = "SELECT f.*, q.reference_number AS quote_reference, a.name AS author_name \
     FROM follow_ups f \
     LEFT JOIN quotes q ON q.id = f.quote_id \
     LEFT JOIN people a ON a.id = f.author_id";

const COUNT_BASE: &str = "SELECT COUNT(*) \
     FROM follow_ups f \
     LEFT JOIN quotes q ON q.id = f.quote_id \
     LEFT JOIN people a ON a.id = f.author_id";

/// Query parameters for the follow-up list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpListParams {
    /// Comma-joined quote ids
    pub quote_id: Option<String>,
    /// Comma-joined author person ids
    pub author_id: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl RequestValidation for FollowUpInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!("quoteId", !self.quote_id.is_nil(), "Quote is required");
        validate_field!("authorId", !self.author_id.is_nil(), "Author is required");
        Ok(())
    }
}

fn apply_filters(query: &mut PaginatedQuery, params: &FollowUpListParams) {
    query
        .filter_in("f.quote_id", parse_id_list(params.quote_id.as_deref()))
        .filter_in("f.author_id", parse_id_list(params.author_id.as_deref()));
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "quoteReference" => Some("q.reference_number"),
        "authorName" => Some("a.name"),
        "createdAt" => Some("f.created_at"),
        "updatedAt" => Some("f.updated_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "f.created_at DESC";

/// List follow-ups with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/follow-ups",
    params(FollowUpListParams),
    responses(
        (status = 200, description = "Follow-ups retrieved successfully", body = ListResponse<FollowUpListRow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "follow-ups"
)]
pub async fn list_follow_ups(
    State(server): State<ArgoServer>,
    Query(params): Query<FollowUpListParams>,
) -> Result<Json<ListResponse<FollowUpListRow>>, ApiError> {
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
                page_query.fetch_all::<FollowUpListRow>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Get a follow-up by ID
#[utoipa::path(
    get,
    path = "/api/v1/follow-ups/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up retrieved successfully", body = ApiResponse<FollowUp>),
        (status = 404, description = "Follow-up not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "follow-ups"
)]
pub async fn get_follow_up(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FollowUp>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let follow_up = server
        .cache
        .get_or_load(key, || async {
            server
                .quote_repo
                .get_follow_up(id)
                .await
                .map_err(ApiError::from)
        })
        .await?;

    match follow_up {
        Some(follow_up) => Ok(Json(api_success(follow_up))),
        None => Err(ApiError::not_found("follow-up")),
    }
}

/// Create a new follow-up
#[utoipa::path(
    post,
    path = "/api/v1/follow-ups",
    request_body = FollowUpInput,
    responses(
        (status = 201, description = "Follow-up created successfully", body = ApiResponse<FollowUp>),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Referenced record does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "follow-ups"
)]
pub async fn create_follow_up(
    State(server): State<ArgoServer>,
    Json(payload): Json<FollowUpInput>,
) -> Result<(StatusCode, Json<ApiResponse<FollowUp>>), ApiError> {
    payload.validate()?;

    let follow_up = server.quote_repo.create_follow_up(&payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(
        follow_up_id = %follow_up.id,
        quote_id = %follow_up.quote_id,
        "Follow-up created"
    );
    Ok((StatusCode::CREATED, Json(api_success(follow_up))))
}

/// Update a follow-up
#[utoipa::path(
    put,
    path = "/api/v1/follow-ups/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    request_body = FollowUpInput,
    responses(
        (status = 200, description = "Follow-up updated successfully", body = ApiResponse<FollowUp>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Follow-up not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "follow-ups"
)]
pub async fn update_follow_up(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FollowUpInput>,
) -> Result<Json<ApiResponse<FollowUp>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let follow_up = server
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
                    .update_follow_up(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(follow_up)))
}

/// Delete a follow-up
#[utoipa::path(
    delete,
    path = "/api/v1/follow-ups/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up deleted successfully", body = SuccessResponse),
        (status = 404, description = "Follow-up not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "follow-ups"
)]
pub async fn delete_follow_up(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.quote_repo.delete_follow_up(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_add_no_predicates() {
        let params = FollowUpListParams {
            quote_id: None,
            author_id: None,
            sort: None,
            pagination: PaginationParams {
                page: None,
                per_page: None,
            },
        };
        let mut query = PaginatedQuery::new(SELECT_BASE);
        apply_filters(&mut query, &params);
        assert_eq!(query.sql(), SELECT_BASE);
    }

    #[test]
    fn test_follow_up_input_validation() {
        let input = FollowUpInput {
            quote_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            notes: Some("Called the client".to_string()),
        };
        assert!(input.validate().is_ok());

        let mut bad = input;
        bad.quote_id = Uuid::nil();
        assert!(bad.validate().is_err());
    }
}
