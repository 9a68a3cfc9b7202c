//! Aggregated OpenAPI document and swagger-ui mount

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

/// OpenAPI documentation for the Argo CRM API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Argo CRM Engine API",
        description = "Quotes, RFQs and directory management API",
        license(name = "AGPL-3.0-only")
    ),
    paths(
        handlers::health::health_check,
        handlers::health::version_info,
        handlers::health::system_status,
        handlers::quotes::list_quotes,
        handlers::quotes::quote_metadata,
        handlers::quotes::get_quote,
        handlers::quotes::create_quote,
        handlers::quotes::update_quote,
        handlers::quotes::delete_quote,
        handlers::quotes::export_quotes,
        handlers::rfqs::list_rfqs,
        handlers::rfqs::rfq_metadata,
        handlers::rfqs::get_rfq,
        handlers::rfqs::create_rfq,
        handlers::rfqs::update_rfq,
        handlers::rfqs::receive_rfq,
        handlers::rfqs::delete_rfq,
        handlers::rfqs::export_rfqs,
        handlers::companies::list_companies,
        handlers::companies::company_metadata,
        handlers::companies::get_company,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::companies::export_companies,
        handlers::people::list_people,
        handlers::people::get_person,
        handlers::people::create_person,
        handlers::people::update_person,
        handlers::people::delete_person,
        handlers::people::export_people,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::export_projects,
        handlers::registrations::list_registrations,
        handlers::registrations::registration_metadata,
        handlers::registrations::get_registration,
        handlers::registrations::create_registration,
        handlers::registrations::update_registration,
        handlers::registrations::delete_registration,
        handlers::registrations::export_registrations,
        handlers::follow_ups::list_follow_ups,
        handlers::follow_ups::get_follow_up,
        handlers::follow_ups::create_follow_up,
        handlers::follow_ups::update_follow_up,
        handlers::follow_ups::delete_follow_up,
        handlers::files::get_file,
    ),
    tags(
        (name = "health", description = "Liveness and status probes"),
        (name = "quotes", description = "Quote management"),
        (name = "rfqs", description = "Request-for-quotation management"),
        (name = "companies", description = "Company directory"),
        (name = "people", description = "People directory"),
        (name = "projects", description = "Project directory"),
        (name = "registrations", description = "Vendor registrations"),
        (name = "follow-ups", description = "Quote follow-ups"),
        (name = "files", description = "Stored file retrieval")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated document
pub fn swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
