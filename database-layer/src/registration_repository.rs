use sqlx::{PgPool, Pool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::{Registration, RegistrationInput};

/// Repository for vendor registrations.
#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: Pool<Postgres>,
}

impl RegistrationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create_registration(&self, input: &RegistrationInput) -> DatabaseResult<Registration> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (company_id, status, author_id, file, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.company_id)
        .bind(input.status)
        .bind(input.author_id)
        .bind(&input.file)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        info!(
            registration_id = %registration.id,
            company_id = %registration.company_id,
            "Registration created"
        );
        Ok(registration)
    }

    pub async fn update_registration(
        &self,
        id: Uuid,
        input: &RegistrationInput,
    ) -> DatabaseResult<Registration> {
        let registration = sqlx::query_as::<_, Registration>(
            r#"
            UPDATE registrations
            SET company_id = $2, status = $3, author_id = $4, file = $5,
                notes = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.company_id)
        .bind(input.status)
        .bind(input.author_id)
        .bind(&input.file)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    pub async fn delete_registration(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(registration_id = %id, "Registration deleted");
        Ok(())
    }

    pub async fn get_registration(&self, id: Uuid) -> DatabaseResult<Option<Registration>> {
        let registration =
            sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(registration)
    }
}
