//! Login-or-register and profile lookup.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use kanau::processor::Processor;
use kickoff_sdk::objects::auth::{LoginResponse, UserResponse};
use tracing::{info, warn};

use crate::allocation::AllocationQueue;
use crate::config::AuthConfig;
use crate::entities::user::{CreateUser, GetUserByEmail, GetUserById, User};
use crate::errors::ServiceError;
use crate::framework::DatabaseProcessor;

/// Trim and lowercase an email, rejecting anything that is not shaped like
/// `local@domain.tld`.
pub fn normalize_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(ServiceError::Validation("Invalid email"))
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ServiceError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Run an argon2 operation off the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("password task failed: {e}")))?
}

/// Log in with an existing account, or create one if the email is unknown.
///
/// New accounts are queued for team allocation.
pub async fn login_or_register(
    db: &DatabaseProcessor,
    queue: &AllocationQueue,
    auth: &AuthConfig,
    email: &str,
    password: &str,
) -> Result<LoginResponse, ServiceError> {
    let email = normalize_email(email)?;
    if password.is_empty() {
        return Err(ServiceError::Validation("Password is required"));
    }

    let user = match db.process(GetUserByEmail { email: email.clone() }).await? {
        Some(user) => authenticate(user, password).await?,
        None => register(db, queue, email, password).await?,
    };

    Ok(LoginResponse {
        user: UserResponse::from(&user),
        token: auth.issue_token(user.id),
    })
}

async fn authenticate(user: User, password: &str) -> Result<User, ServiceError> {
    let password = password.to_owned();
    let hash = user.password_hash.clone();
    if blocking(move || verify_password(&password, &hash)).await? {
        info!(user_id = user.id, "User logged in");
        Ok(user)
    } else {
        warn!(user_id = user.id, "Rejected login with wrong password");
        Err(ServiceError::Unauthorized)
    }
}

async fn register(
    db: &DatabaseProcessor,
    queue: &AllocationQueue,
    email: String,
    password: &str,
) -> Result<User, ServiceError> {
    let plaintext = password.to_owned();
    let password_hash = blocking(move || hash_password(&plaintext)).await?;

    let created = db
        .process(CreateUser {
            email: email.clone(),
            password_hash,
        })
        .await?;

    match created {
        Some(user) => {
            queue.enqueue(user.id);
            info!(user_id = user.id, "Registered user, team allocation queued");
            Ok(user)
        }
        // Lost a race with a concurrent registration of the same email.
        None => {
            let user = db
                .process(GetUserByEmail { email })
                .await?
                .ok_or_else(|| ServiceError::Internal("user vanished after conflict".to_owned()))?;
            authenticate(user, password).await
        }
    }
}

/// The caller's account without its credential hash.
pub async fn profile(db: &DatabaseProcessor, user_id: i64) -> Result<UserResponse, ServiceError> {
    db.process(GetUserById { user_id })
        .await?
        .map(|user| UserResponse::from(&user))
        .ok_or(ServiceError::NotFound("User not found"))
}
