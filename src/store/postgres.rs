//! PostgreSQL-backed stores

use axum::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ContractStore, StoreError, UserStore};
use crate::contracts::{like_pattern, ContractColumn, ContractFilter, ContractPage};
use crate::models::{Contract, NewContract, NewUser, User, UserChanges};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, bio, is_active, created_at, updated_at";

/// Unique violations become [`StoreError::Conflict`] with a message picked by
/// the caller from the violated constraint.
fn map_unique(err: sqlx::Error, describe: impl Fn(Option<&str>) -> String) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(describe(db_err.constraint()));
        }
    }
    StoreError::Database(err)
}

fn describe_user_conflict(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("email") => "Email already registered".to_string(),
        Some(c) if c.contains("username") => "Username already registered".to_string(),
        _ => "User with this username or email already exists".to_string(),
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    db_pool: PgPool,
}

impl PgUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, full_name, bio)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(&user.bio)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| map_unique(e, describe_user_conflict))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.db_pool)
            .await?)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.db_pool.begin().await?;

        let select = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, User>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let update = format!(
            "UPDATE users
             SET username = $2, email = $3, password_hash = $4, full_name = $5, bio = $6,
                 updated_at = $7
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, User>(&update)
            .bind(id)
            .bind(changes.username.unwrap_or(current.username))
            .bind(changes.email.unwrap_or(current.email))
            .bind(changes.password_hash.unwrap_or(current.password_hash))
            .bind(changes.full_name.or(current.full_name))
            .bind(changes.bio.or(current.bio))
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique(e, describe_user_conflict))?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgContractStore {
    db_pool: PgPool,
}

impl PgContractStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContractFilter) {
    builder.push(" WHERE 1=1");
    if let Some(name) = &filter.name {
        builder.push(" AND name ILIKE ");
        builder.push_bind(like_pattern(name));
    }
    if let Some(address) = &filter.address {
        builder.push(" AND address ILIKE ");
        builder.push_bind(like_pattern(address));
    }
}

/// Text columns compare byte-wise (`COLLATE "C"`) so the order matches
/// [`super::MemoryContractStore`] regardless of the database locale.
fn push_ordering(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContractFilter) {
    // Column names come from a closed enum, never from user input.
    let column = filter.sort.column;
    builder.push(" ORDER BY ");
    builder.push(column.as_str());
    if matches!(column, ContractColumn::Name | ContractColumn::Address) {
        builder.push(" COLLATE \"C\"");
    }
    builder.push(" ");
    builder.push(filter.sort.order.as_sql());
    builder.push(", id ASC");
}

#[async_trait]
impl ContractStore for PgContractStore {
    async fn insert(&self, contract: NewContract) -> Result<Contract, StoreError> {
        sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (name, address, deployment_date)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, deployment_date
            "#,
        )
        .bind(&contract.name)
        .bind(&contract.address)
        .bind(contract.deployment_date)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            map_unique(e, |_| {
                format!("Contract with address {} already exists", contract.address)
            })
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Contract>, StoreError> {
        Ok(sqlx::query_as::<_, Contract>(
            "SELECT id, name, address, deployment_date FROM contracts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn list(&self, filter: &ContractFilter) -> Result<ContractPage<Contract>, StoreError> {
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contracts");
        push_filters(&mut count_builder, filter);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await?;

        let mut query_builder = QueryBuilder::<Postgres>::new(
            "SELECT id, name, address, deployment_date FROM contracts",
        );
        push_filters(&mut query_builder, filter);

        push_ordering(&mut query_builder, filter);
        query_builder.push(" LIMIT ");
        query_builder.push_bind(filter.limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(filter.skip);

        let items = query_builder
            .build_query_as::<Contract>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(ContractPage { items, total })
    }
}
