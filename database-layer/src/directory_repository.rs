use sqlx::{PgPool, Pool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::{Company, CompanyInput, Person, PersonInput, Project, ProjectInput};

/// Repository for the directory entities: companies, people, and projects.
///
/// Mutations return the stored row (`RETURNING *`) so callers always see
/// server-assigned ids and timestamps. Constraint violations surface as
/// structured [`crate::error::DatabaseError`] variants.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: Pool<Postgres>,
}

impl DirectoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Companies

    pub async fn create_company(&self, input: &CompanyInput) -> DatabaseResult<Company> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, email, phone, company_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.company_type)
        .fetch_one(&self.pool)
        .await?;

        info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    pub async fn update_company(&self, id: Uuid, input: &CompanyInput) -> DatabaseResult<Company> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $2, email = $3, phone = $4, company_type = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.company_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn delete_company(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(company_id = %id, "Company deleted");
        Ok(())
    }

    pub async fn get_company(&self, id: Uuid) -> DatabaseResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    // People

    pub async fn create_person(&self, input: &PersonInput) -> DatabaseResult<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO people (name, email, phone, title, person_type, company_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.title)
        .bind(input.person_type)
        .bind(input.company_id)
        .fetch_one(&self.pool)
        .await?;

        info!(person_id = %person.id, name = %person.name, "Person created");
        Ok(person)
    }

    pub async fn update_person(&self, id: Uuid, input: &PersonInput) -> DatabaseResult<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            UPDATE people
            SET name = $2, email = $3, phone = $4, title = $5, person_type = $6,
                company_id = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.title)
        .bind(input.person_type)
        .bind(input.company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(person)
    }

    pub async fn delete_person(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(person_id = %id, "Person deleted");
        Ok(())
    }

    pub async fn get_person(&self, id: Uuid) -> DatabaseResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>("SELECT * FROM people WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(person)
    }

    // Projects

    pub async fn create_project(&self, input: &ProjectInput) -> DatabaseResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, status, company_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.status)
        .bind(input.company_id)
        .fetch_one(&self.pool)
        .await?;

        info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    pub async fn update_project(&self, id: Uuid, input: &ProjectInput) -> DatabaseResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2, status = $3, company_id = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.status)
        .bind(input.company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn delete_project(&self, id: Uuid) -> DatabaseResult<()> {
        let rows_affected = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(crate::error::DatabaseError::NotFound);
        }

        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    pub async fn get_project(&self, id: Uuid) -> DatabaseResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }
}
