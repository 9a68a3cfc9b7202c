// Database models for the CRM domain
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_outcome", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteOutcome {
    Won,
    Lost,
    Pending,
}

/// Status of an RFQ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rfq_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfqStatus {
    Sent,
    Received,
}

/// Classification of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "company_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyType {
    Supplier,
    Client,
    Contractor,
    Consultant,
}

/// Classification of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "person_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonType {
    Author,
    ContactPerson,
    Internal,
}

/// Status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    InHand,
    Tender,
}

/// Lifecycle status of a vendor registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pursuing,
    Applied,
    Submitted,
    UnderReview,
    Approved,
    Registered,
    Expired,
    Declined,
}

macro_rules! enum_str_impls {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }
    };
}

enum_str_impls!(QuoteOutcome {
    Won => "WON",
    Lost => "LOST",
    Pending => "PENDING",
});

enum_str_impls!(RfqStatus {
    Sent => "SENT",
    Received => "RECEIVED",
});

enum_str_impls!(CompanyType {
    Supplier => "SUPPLIER",
    Client => "CLIENT",
    Contractor => "CONTRACTOR",
    Consultant => "CONSULTANT",
});

enum_str_impls!(PersonType {
    Author => "AUTHOR",
    ContactPerson => "CONTACT_PERSON",
    Internal => "INTERNAL",
});

enum_str_impls!(ProjectStatus {
    InHand => "IN_HAND",
    Tender => "TENDER",
});

enum_str_impls!(RegistrationStatus {
    Pursuing => "PURSUING",
    Applied => "APPLIED",
    Submitted => "SUBMITTED",
    UnderReview => "UNDER_REVIEW",
    Approved => "APPROVED",
    Registered => "REGISTERED",
    Expired => "EXPIRED",
    Declined => "DECLINED",
});

macro_rules! enum_array_type_impls {
    ($($ty:ident => $array_name:literal),+ $(,)?) => {
        $(
            impl sqlx::postgres::PgHasArrayType for $ty {
                fn array_type_info() -> sqlx::postgres::PgTypeInfo {
                    sqlx::postgres::PgTypeInfo::with_name($array_name)
                }
            }
        )+
    };
}

enum_array_type_impls!(
    QuoteOutcome => "_quote_outcome",
    RfqStatus => "_rfq_status",
    CompanyType => "_company_type",
    PersonType => "_person_type",
    ProjectStatus => "_project_status",
    RegistrationStatus => "_registration_status",
);

/// A quote issued to a client
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub reference_number: String,
    pub date: NaiveDate,
    pub currency: String,
    pub value: f64,
    /// Exchange-rate snapshot captured when the quote was created
    pub fx_rate: f64,
    pub outcome: QuoteOutcome,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Opaque object-storage keys of attached files
    pub files: Vec<String>,
    pub author_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub contact_person_id: Option<Uuid>,
    pub sales_person_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A quote row with the joined display names used by list views and export
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub quote: Quote,
    pub client_name: Option<String>,
    pub supplier_name: Option<String>,
    pub project_name: Option<String>,
    pub sales_person_name: Option<String>,
    pub author_name: Option<String>,
}

/// Payload for creating or updating a quote
///
/// The reference number and fx-rate snapshot are server-computed and never
/// accepted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    pub date: NaiveDate,
    pub currency: String,
    pub value: f64,
    pub outcome: Option<QuoteOutcome>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub files: Option<Vec<String>>,
    pub author_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub contact_person_id: Option<Uuid>,
    pub sales_person_id: Option<Uuid>,
}

/// A request for quotation sent to a supplier
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rfq {
    pub id: Uuid,
    pub reference_number: String,
    pub date: NaiveDate,
    pub currency: String,
    pub value: f64,
    pub status: RfqStatus,
    pub quote_id: Option<Uuid>,
    pub received_date: Option<NaiveDate>,
    pub received_value: Option<f64>,
    pub received_currency: Option<String>,
    pub notes: Option<String>,
    pub files: Vec<String>,
    pub author_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An RFQ row with joined display names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub rfq: Rfq,
    pub supplier_name: Option<String>,
    pub project_name: Option<String>,
    pub author_name: Option<String>,
    pub quote_reference: Option<String>,
}

/// Payload for creating or updating an RFQ
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqInput {
    pub date: NaiveDate,
    pub currency: String,
    pub value: f64,
    pub quote_id: Option<Uuid>,
    pub notes: Option<String>,
    pub files: Option<Vec<String>>,
    pub author_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

/// Receipt details recorded when a supplier answers an RFQ
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RfqReceipt {
    pub received_date: NaiveDate,
    pub received_value: f64,
    pub received_currency: String,
}

/// A company in the directory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_type: CompanyType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or updating a company
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_type: CompanyType,
}

/// A person in the directory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub person_type: PersonType,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A person row with the joined company name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub person: Person,
    pub company_name: Option<String>,
}

/// Payload for creating or updating a person
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub person_type: PersonType,
    pub company_id: Option<Uuid>,
}

/// A project
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub status: Option<ProjectStatus>,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project row with the joined company name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub project: Project,
    pub company_name: Option<String>,
}

/// Payload for creating or updating a project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    pub status: Option<ProjectStatus>,
    pub company_id: Option<Uuid>,
}

/// A vendor registration
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    pub company_id: Uuid,
    pub status: RegistrationStatus,
    pub author_id: Uuid,
    /// Opaque object-storage key of the uploaded registration document
    pub file: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registration row with joined display names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub registration: Registration,
    pub company_name: Option<String>,
    pub author_name: Option<String>,
}

/// Payload for creating or updating a registration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    pub company_id: Uuid,
    pub status: RegistrationStatus,
    pub author_id: Uuid,
    pub file: Option<String>,
    pub notes: Option<String>,
}

/// A follow-up note attached to a quote
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub author_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A follow-up row with joined display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub follow_up: FollowUp,
    pub quote_reference: Option<String>,
    pub author_name: Option<String>,
}

/// Payload for creating or updating a follow-up
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpInput {
    pub quote_id: Uuid,
    pub author_id: Uuid,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_enum_labels_round_trip() {
        for outcome in [QuoteOutcome::Won, QuoteOutcome::Lost, QuoteOutcome::Pending] {
            assert_eq!(QuoteOutcome::from_str(outcome.as_str()), Ok(outcome));
        }
        assert_eq!(
            RegistrationStatus::from_str("UNDER_REVIEW"),
            Ok(RegistrationStatus::UnderReview)
        );
        assert_eq!(PersonType::from_str("CONTACT_PERSON"), Ok(PersonType::ContactPerson));
        assert!(QuoteOutcome::from_str("won").is_err());
    }

    #[test]
    fn test_serde_uses_wire_casing() {
        let json = serde_json::to_value(QuoteOutcome::Pending).unwrap();
        assert_eq!(json, serde_json::json!("PENDING"));
        let status: RegistrationStatus = serde_json::from_value(serde_json::json!("UNDER_REVIEW")).unwrap();
        assert_eq!(status, RegistrationStatus::UnderReview);
    }
}
