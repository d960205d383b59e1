//! Custom Axum extractors for request authentication and input parsing.
//!
//! Provides:
//! - `AuthUser`: verifies the `Authorization: Bearer` session token.
//! - `ApiJson<T>` / `ApiQuery<T>`: `Json` / `Query` whose rejections use
//!   the API failure envelope.
//!
//! Token signing and verification are delegated to [`kickoff_sdk::token`].

use axum::{
    extract::{
        FromRequest, FromRequestParts, OptionalFromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{header::AUTHORIZATION, request::Parts},
};
use kickoff_core::errors::ServiceError;
use serde::de::DeserializeOwned;

use crate::api::ApiError;
use crate::state::AppState;

/// The authenticated caller's user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

fn authenticate(parts: &Parts, state: &AppState) -> Option<Result<AuthUser, ApiError>> {
    let header = parts.headers.get(AUTHORIZATION)?;
    let result = header
        .to_str()
        .map_err(|_| ApiError(ServiceError::Unauthorized))
        .and_then(|value| {
            state.auth.verify_header(value).map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                ApiError(ServiceError::Unauthorized)
            })
        })
        .map(AuthUser);
    Some(result)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).unwrap_or(Err(ApiError(ServiceError::Unauthorized)))
    }
}

/// A missing header yields `None`; a present but invalid one is still
/// rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        authenticate(parts, state).transpose()
    }
}

/// JSON body extractor with enveloped rejections.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let rejection: JsonRejection = rejection;
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(ApiError(ServiceError::Validation("Invalid request body")))
            }
        }
    }
}

/// Query string extractor with enveloped rejections.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let rejection: QueryRejection = rejection;
                tracing::debug!(error = %rejection, "Rejected query string");
                Err(ApiError(ServiceError::Validation("Invalid query parameters")))
            }
        }
    }
}
