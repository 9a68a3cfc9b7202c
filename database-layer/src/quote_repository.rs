use sqlx::{PgPool, Pool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::{FollowUp, FollowUpInput, Quote, QuoteInput, QuoteOutcome};
use crate::reference::{format_reference, next_serial, ReferenceKind};

/// Repository for quotes and their follow-ups.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: Pool<Postgres>,
}

impl QuoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a quote.
    ///
    /// The reference number is derived from the current row count and the
    /// quote's own date (count-then-insert, see [`crate::reference`]); the
    /// fx-rate snapshot is supplied by the caller's rate source.
    pub async fn create_quote(&self, input: &QuoteInput, fx_rate: f64) -> DatabaseResult<Quote> {
        let serial = next_serial(&self.pool, ReferenceKind::Quote).await?;
        let reference_number = format_reference(ReferenceKind::Quote, serial, input.date);
        let outcome = input.outcome.unwrap_or(QuoteOutcome::Pending);
        let files = input.files.clone().unwrap_or_default();

        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (
                reference_number, date, currency, value, fx_rate, outcome,
                delivery_date, notes, files, author_id, supplier_id, client_id,
                project_id, contact_person_id, sales_person_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&reference_number)
        .bind(input.date)
        .bind(&input.currency)
        .bind(input.value)
        .bind(fx_rate)
        .bind(outcome)
        .bind(input.delivery_date)
        .bind(&input.notes)
        .bind(&files)
        .bind(input.author_id)
        .bind(input.supplier_id)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.contact_person_id)
        .bind(input.sales_person_id)
        .fetch_one(&self.pool)
        .await?;

        info!(quote_id = %quote.id, reference = %quote.reference_number, "Quote created");
        Ok(quote)
    }

    /// Update a quote. The reference number and fx-rate snapshot are
    /// immutable after creation.
    pub async fn update_quote(&self, id: Uuid, input: &QuoteInput) -> DatabaseResult<Quote> {
        let outcome = input.outcome.unwrap_or(QuoteOutcome::Pending);
        let files = input.files.clone().unwrap_or_default();

        let quote = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET date = $2, currency = $3, value = $4, outcome = $5,
                delivery_date = $6, notes = $7, files = $8, author_id = $9,
                supplier_id = $10, client_id = $11, project_id = $12,
                contact_person_id = $13, sales_person_id = $14, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.date)
        .bind(&input.currency)
        .bind(input.value)
        .bind(outcome)
        .bind(input.delivery_date)
        .bind(&input.notes)
        .bind(&files)
        .bind(input.author_id)
        .bind(input.supplier_id)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.contact_person_id)
        .bind(input.sales_person_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(quote)
    }

    pub async fn delete_quote(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(quote_id = %id, "Quote deleted");
        Ok(())
    }

    pub async fn get_quote(&self, id: Uuid) -> DatabaseResult<Option<Quote>> {
        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quote)
    }

    // Follow-ups

    pub async fn create_follow_up(&self, input: &FollowUpInput) -> DatabaseResult<FollowUp> {
        let follow_up = sqlx::query_as::<_, FollowUp>(
            r#"
            INSERT INTO follow_ups (quote_id, author_id, notes)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.quote_id)
        .bind(input.author_id)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        info!(follow_up_id = %follow_up.id, quote_id = %follow_up.quote_id, "Follow-up created");
        Ok(follow_up)
    }

    pub async fn update_follow_up(&self, id: Uuid, input: &FollowUpInput) -> DatabaseResult<FollowUp> {
        let follow_up = sqlx::query_as::<_, FollowUp>(
            r#"
            UPDATE follow_ups
            SET quote_id = $2, author_id = $3, notes = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.quote_id)
        .bind(input.author_id)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(follow_up)
    }

    pub async fn delete_follow_up(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM follow_ups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(follow_up_id = %id, "Follow-up deleted");
        Ok(())
    }

    pub async fn get_follow_up(&self, id: Uuid) -> DatabaseResult<Option<FollowUp>> {
        let follow_up = sqlx::query_as::<_, FollowUp>("SELECT * FROM follow_ups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(follow_up)
    }
}
