pub mod paths;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers::{companies, files, follow_ups, health, people, projects, quotes, registrations, rfqs},
    server::ArgoServer,
};

/// Create health check routes
pub fn health_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
        .route(paths::health::STATUS, get(health::system_status))
}

/// Create quote routes
pub fn quote_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::quotes::QUOTES, get(quotes::list_quotes))
        .route(paths::quotes::QUOTES, post(quotes::create_quote))
        .route(paths::quotes::QUOTE_METADATA, get(quotes::quote_metadata))
        .route(paths::quotes::QUOTE_EXPORT, get(quotes::export_quotes))
        .route(paths::quotes::QUOTE_BY_ID, get(quotes::get_quote))
        .route(paths::quotes::QUOTE_BY_ID, put(quotes::update_quote))
        .route(paths::quotes::QUOTE_BY_ID, delete(quotes::delete_quote))
}

/// Create RFQ routes
pub fn rfq_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::rfqs::RFQS, get(rfqs::list_rfqs))
        .route(paths::rfqs::RFQS, post(rfqs::create_rfq))
        .route(paths::rfqs::RFQ_METADATA, get(rfqs::rfq_metadata))
        .route(paths::rfqs::RFQ_EXPORT, get(rfqs::export_rfqs))
        .route(paths::rfqs::RFQ_BY_ID, get(rfqs::get_rfq))
        .route(paths::rfqs::RFQ_BY_ID, put(rfqs::update_rfq))
        .route(paths::rfqs::RFQ_BY_ID, delete(rfqs::delete_rfq))
        .route(paths::rfqs::RFQ_RECEIVE, put(rfqs::receive_rfq))
}

/// Create company routes
pub fn company_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::companies::COMPANIES, get(companies::list_companies))
        .route(paths::companies::COMPANIES, post(companies::create_company))
        .route(paths::companies::COMPANY_METADATA, get(companies::company_metadata))
        .route(paths::companies::COMPANY_EXPORT, get(companies::export_companies))
        .route(paths::companies::COMPANY_BY_ID, get(companies::get_company))
        .route(paths::companies::COMPANY_BY_ID, put(companies::update_company))
        .route(paths::companies::COMPANY_BY_ID, delete(companies::delete_company))
}

/// Create person routes
pub fn person_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::people::PEOPLE, get(people::list_people))
        .route(paths::people::PEOPLE, post(people::create_person))
        .route(paths::people::PERSON_EXPORT, get(people::export_people))
        .route(paths::people::PERSON_BY_ID, get(people::get_person))
        .route(paths::people::PERSON_BY_ID, put(people::update_person))
        .route(paths::people::PERSON_BY_ID, delete(people::delete_person))
}

/// Create project routes
pub fn project_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::projects::PROJECTS, get(projects::list_projects))
        .route(paths::projects::PROJECTS, post(projects::create_project))
        .route(paths::projects::PROJECT_EXPORT, get(projects::export_projects))
        .route(paths::projects::PROJECT_BY_ID, get(projects::get_project))
        .route(paths::projects::PROJECT_BY_ID, put(projects::update_project))
        .route(paths::projects::PROJECT_BY_ID, delete(projects::delete_project))
}

/// Create registration routes
pub fn registration_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::registrations::REGISTRATIONS, get(registrations::list_registrations))
        .route(paths::registrations::REGISTRATIONS, post(registrations::create_registration))
        .route(paths::registrations::REGISTRATION_METADATA, get(registrations::registration_metadata))
        .route(paths::registrations::REGISTRATION_EXPORT, get(registrations::export_registrations))
        .route(paths::registrations::REGISTRATION_BY_ID, get(registrations::get_registration))
        .route(paths::registrations::REGISTRATION_BY_ID, put(registrations::update_registration))
        .route(paths::registrations::REGISTRATION_BY_ID, delete(registrations::delete_registration))
}

/// Create follow-up routes
pub fn follow_up_routes() -> Router<ArgoServer> {
    Router::new()
        .route(paths::follow_ups::FOLLOW_UPS, get(follow_ups::list_follow_ups))
        .route(paths::follow_ups::FOLLOW_UPS, post(follow_ups::create_follow_up))
        .route(paths::follow_ups::FOLLOW_UP_BY_ID, get(follow_ups::get_follow_up))
        .route(paths::follow_ups::FOLLOW_UP_BY_ID, put(follow_ups::update_follow_up))
        .route(paths::follow_ups::FOLLOW_UP_BY_ID, delete(follow_ups::delete_follow_up))
}

/// Create file retrieval routes
pub fn file_routes() -> Router<ArgoServer> {
    Router::new().route(paths::files::FILE_BY_KEY, get(files::get_file))
}

/// Merge all route groups into the application router
pub fn create_routes() -> Router<ArgoServer> {
    Router::new()
        .merge(health_routes())
        .merge(quote_routes())
        .merge(rfq_routes())
        .merge(company_routes())
        .merge(person_routes())
        .merge(project_routes())
        .merge(registration_routes())
        .merge(follow_up_routes())
        .merge(file_routes())
}
