use sqlx::{PgPool, Pool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::{Rfq, RfqInput, RfqReceipt, RfqStatus};
use crate::reference::{format_reference, next_serial, ReferenceKind};

/// Repository for requests for quotation.
#[derive(Debug, Clone)]
pub struct RfqRepository {
    pool: Pool<Postgres>,
}

impl RfqRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create an RFQ in `SENT` status with no receipt details.
    pub async fn create_rfq(&self, input: &RfqInput) -> DatabaseResult<Rfq> {
        let serial = next_serial(&self.pool, ReferenceKind::Rfq).await?;
        let reference_number = format_reference(ReferenceKind::Rfq, serial, input.date);
        let files = input.files.clone().unwrap_or_default();

        let rfq = sqlx::query_as::<_, Rfq>(
            r#"
            INSERT INTO rfqs (
                reference_number, date, currency, value, status, quote_id,
                notes, files, author_id, supplier_id, project_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&reference_number)
        .bind(input.date)
        .bind(&input.currency)
        .bind(input.value)
        .bind(RfqStatus::Sent)
        .bind(input.quote_id)
        .bind(&input.notes)
        .bind(&files)
        .bind(input.author_id)
        .bind(input.supplier_id)
        .bind(input.project_id)
        .fetch_one(&self.pool)
        .await?;

        info!(rfq_id = %rfq.id, reference = %rfq.reference_number, "RFQ created");
        Ok(rfq)
    }

    /// Update an RFQ's editable fields. Status and receipt details change
    /// only through [`Self::receive_rfq`].
    pub async fn update_rfq(&self, id: Uuid, input: &RfqInput) -> DatabaseResult<Rfq> {
        let files = input.files.clone().unwrap_or_default();

        let rfq = sqlx::query_as::<_, Rfq>(
            r#"
            UPDATE rfqs
            SET date = $2, currency = $3, value = $4, quote_id = $5, notes = $6,
                files = $7, author_id = $8, supplier_id = $9, project_id = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.date)
        .bind(&input.currency)
        .bind(input.value)
        .bind(input.quote_id)
        .bind(&input.notes)
        .bind(&files)
        .bind(input.author_id)
        .bind(input.supplier_id)
        .bind(input.project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(rfq)
    }

    /// Record the supplier's answer: flips status to `RECEIVED` and stores
    /// the receipt date/value/currency.
    pub async fn receive_rfq(&self, id: Uuid, receipt: &RfqReceipt) -> DatabaseResult<Rfq> {
        let rfq = sqlx::query_as::<_, Rfq>(
            r#"
            UPDATE rfqs
            SET status = $2, received_date = $3, received_value = $4,
                received_currency = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(RfqStatus::Received)
        .bind(receipt.received_date)
        .bind(receipt.received_value)
        .bind(&receipt.received_currency)
        .fetch_one(&self.pool)
        .await?;

        info!(rfq_id = %rfq.id, reference = %rfq.reference_number, "RFQ marked received");
        Ok(rfq)
    }

    pub async fn delete_rfq(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM rfqs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(rfq_id = %id, "RFQ deleted");
        Ok(())
    }

    pub async fn get_rfq(&self, id: Uuid) -> DatabaseResult<Option<Rfq>> {
        let rfq = sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rfq)
    }
}
