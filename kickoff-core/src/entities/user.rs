use kanau::processor::Processor;
use kickoff_sdk::objects::auth::UserResponse;

use crate::framework::DatabaseProcessor;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: time::PrimitiveDateTime,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at.assume_utc().unix_timestamp(),
        }
    }
}

/// Look a user up by (case-insensitive) email.
#[derive(Debug, Clone)]
pub struct GetUserByEmail {
    pub email: String,
}

/// Look a user up by id.
#[derive(Debug, Clone, Copy)]
pub struct GetUserById {
    pub user_id: i64,
}

/// Insert a user. Yields `None` if the email is already taken.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
}

impl Processor<GetUserByEmail> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:GetUserByEmail")]
    async fn process(&self, query: GetUserByEmail) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(query.email)
        .fetch_optional(&self.pool)
        .await
    }
}

impl Processor<GetUserById> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:GetUserById")]
    async fn process(&self, query: GetUserById) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

impl Processor<CreateUser> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;

    #[tracing::instrument(skip_all, err, name = "SQL:CreateUser")]
    async fn process(&self, insert: CreateUser) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(insert.email)
        .bind(insert.password_hash)
        .fetch_optional(&self.pool)
        .await
    }
}
