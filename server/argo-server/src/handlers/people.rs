use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use database_layer::{Person, PersonInput, PersonListRow, PersonType};

use crate::cache::{touched_resources, CacheKey};
use crate::error::{api_success, ApiError, ApiResponse, SuccessResponse};
use crate::handlers::{parse_enum_list, parse_id_list};
use crate::server::ArgoServer;
use crate::types::pagination::{ListResponse, PageMode, PaginationParams};
use crate::types::sorting::parse_sort;
use crate::utils::csv_export::{csv_response, CsvExporter, MAX_EXPORT_ROWS};
use crate::utils::query_builder::PaginatedQuery;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_field, validate_length, validate_required};

pub const RESOURCE: &str = "people";

const SELECT_BASE: &str = "SELECT pe.*, co.name AS company_name \
     FROM people pe \
     LEFT JOIN companies co ON co.id = pe.company_id";

const COUNT_BASE: &str = "SELECT COUNT(*) \
     FROM people pe \
     LEFT JOIN companies co ON co.id = pe.company_id";

/// Query parameters for the person list and export endpoints
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PersonListParams {
    /// Substring match on the person name
    pub name: Option<String>,
    /// Comma-joined person type values
    pub person_type: Option<String>,
    /// Comma-joined company ids
    pub company_id: Option<String>,
    /// Sort state: comma-joined `column.asc|desc` entries
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl RequestValidation for PersonInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!("name", self.name, "Name is required");
        validate_length!("name", self.name, 1, 200, "Name must be between 1 and 200 characters");
        validate_email!("email", self.email, "Invalid email format");
        Ok(())
    }
}

fn apply_filters(query: &mut PaginatedQuery, params: &PersonListParams) {
    query
        .filter_contains("pe.name", params.name.as_deref())
        .filter_in(
            "pe.person_type",
            parse_enum_list::<PersonType>(params.person_type.as_deref()),
        )
        .filter_in("pe.company_id", parse_id_list(params.company_id.as_deref()));
}

fn order_expr(id: &str) -> Option<&'static str> {
    match id {
        "name" => Some("pe.name"),
        "email" => Some("pe.email"),
        "title" => Some("pe.title"),
        "personType" => Some("pe.person_type"),
        "companyName" => Some("co.name"),
        "createdAt" => Some("pe.created_at"),
        _ => None,
    }
}

const DEFAULT_ORDER: &str = "pe.created_at DESC";

/// List people with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/people",
    params(PersonListParams),
    responses(
        (status = 200, description = "People retrieved successfully", body = ListResponse<PersonListRow>),
        (status = 500, description = "Internal server error")
    ),
    tag = "people"
)]
pub async fn list_people(
    State(server): State<ArgoServer>,
    Query(params): Query<PersonListParams>,
) -> Result<Json<ListResponse<PersonListRow>>, ApiError> {
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
                page_query.fetch_all::<PersonListRow>(server.db.pool()),
                count_query.fetch_count(server.db.pool()),
            )?;

            Ok::<_, ApiError>(ListResponse::new(rows, total, mode))
        })
        .await?;

    Ok(Json(response))
}

/// Get a person by ID
#[utoipa::path(
    get,
    path = "/api/v1/people/{id}",
    params(("id" = Uuid, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person retrieved successfully", body = ApiResponse<Person>),
        (status = 404, description = "Person not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "people"
)]
pub async fn get_person(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Person>>, ApiError> {
    let key = CacheKey::detail(RESOURCE, id);
    let person = server
        .cache
        .get_or_load(key, || async {
            server
                .directory_repo
                .get_person(id)
                .await
                .map_err(ApiError::from)
        })
        .await?;

    match person {
        Some(person) => Ok(Json(api_success(person))),
        None => Err(ApiError::not_found("person")),
    }
}

/// Create a new person
#[utoipa::path(
    post,
    path = "/api/v1/people",
    request_body = PersonInput,
    responses(
        (status = 201, description = "Person created successfully", body = ApiResponse<Person>),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Referenced company does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "people"
)]
pub async fn create_person(
    State(server): State<ArgoServer>,
    Json(payload): Json<PersonInput>,
) -> Result<(StatusCode, Json<ApiResponse<Person>>), ApiError> {
    payload.validate()?;

    let person = server.directory_repo.create_person(&payload).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    tracing::info!(person_id = %person.id, name = %person.name, "Person created");
    Ok((StatusCode::CREATED, Json(api_success(person))))
}

/// Update a person
#[utoipa::path(
    put,
    path = "/api/v1/people/{id}",
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = PersonInput,
    responses(
        (status = 200, description = "Person updated successfully", body = ApiResponse<Person>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Person not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "people"
)]
pub async fn update_person(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PersonInput>,
) -> Result<Json<ApiResponse<Person>>, ApiError> {
    payload.validate()?;

    let patch = serde_json::to_value(&payload)?;
    let person = server
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
                    .update_person(id, &payload)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(api_success(person)))
}

/// Delete a person
#[utoipa::path(
    delete,
    path = "/api/v1/people/{id}",
    params(("id" = Uuid, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person deleted successfully", body = SuccessResponse),
        (status = 404, description = "Person not found"),
        (status = 422, description = "Person is still referenced"),
        (status = 500, description = "Internal server error")
    ),
    tag = "people"
)]
pub async fn delete_person(
    State(server): State<ArgoServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    server.directory_repo.delete_person(id).await?;

    server.cache.invalidate_resources(touched_resources(RESOURCE));

    Ok(Json(SuccessResponse { success: true }))
}

/// Export the filtered person list as CSV (same filters, no pagination)
#[utoipa::path(
    get,
    path = "/api/v1/people/export",
    params(PersonListParams),
    responses(
        (status = 200, description = "CSV export", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "people"
)]
pub async fn export_people(
    State(server): State<ArgoServer>,
    Query(params): Query<PersonListParams>,
) -> Result<Response, ApiError> {
    let sorts = parse_sort(params.sort.as_deref());

    let mut query = PaginatedQuery::new(SELECT_BASE);
    apply_filters(&mut query, &params);
    query
        .order_by(&sorts, order_expr, DEFAULT_ORDER)
        .limit(MAX_EXPORT_ROWS as i64);

    let rows: Vec<PersonListRow> = query.fetch_all(server.db.pool()).await?;

    let mut exporter = CsvExporter::new(&["Name", "Email", "Phone", "Title", "Type", "Company"]);
    for row in &rows {
        let fields = [
            row.person.name.clone(),
            row.person.email.clone().unwrap_or_default(),
            row.person.phone.clone().unwrap_or_default(),
            row.person.title.clone().unwrap_or_default(),
            row.person.person_type.as_str().to_string(),
            row.company_name.clone().unwrap_or_default(),
        ];
        if !exporter.push_row(fields.iter().map(String::as_str)) {
            break;
        }
    }

    Ok(csv_response("people.csv", exporter.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_params() -> PersonListParams {
        PersonListParams {
            name: None,
            person_type: None,
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
    fn test_company_sort_uses_joined_name() {
        assert_eq!(order_expr("companyName"), Some("co.name"));
    }

    #[test]
    fn test_person_type_filter() {
        let mut query = PaginatedQuery::new(SELECT_BASE);
        let mut params = empty_params();
        params.person_type = Some("AUTHOR,CONTACT_PERSON".to_string());
        apply_filters(&mut query, &params);
        assert!(query.sql().contains("pe.person_type = ANY($1)"));
    }
}
