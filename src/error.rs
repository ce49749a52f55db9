use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Too many requests, please slow down")]
    RateLimited,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(DatabaseError::Migration(err.to_string()))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Internal(format!("CSV export failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
            _ => AppError::Auth(AuthError::InvalidToken),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Ai(AiError::Request(err.to_string()))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Internal details stay in the logs
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(DatabaseError::NotFound) => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Ai(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing bearer token")]
    MissingToken,
}

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upstream returned {0}: {1}")]
    Status(u16, String),

    #[error("Empty completion")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => DatabaseError::Duplicate,
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            _ => DatabaseError::QueryError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Internal(_)));

        let config_err = config::ConfigError::NotFound(String::from("key not found"));
        let app_err: AppError = config_err.into();
        assert!(matches!(app_err, AppError::Config(_)));

        let db_err = sqlx::Error::RowNotFound;
        let app_err: AppError = db_err.into();
        assert!(matches!(app_err, AppError::Database(DatabaseError::NotFound)));

        let app_err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(app_err, AppError::Database(DatabaseError::ConnectionError(_))));
    }

    #[test]
    fn test_error_status_codes() {
        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = AppError::Auth(AuthError::MissingToken);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = AppError::validation("invalid input");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = AppError::not_found("Flashcard");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::Database(DatabaseError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::RateLimited;
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let err = AppError::Ai(AiError::EmptyResponse);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        let err = AppError::validation("Content is required");
        assert_eq!(err.to_string(), "Content is required");

        let err = AppError::not_found("Blind spot");
        assert_eq!(err.to_string(), "Blind spot not found");

        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "Authentication error: Invalid credentials");
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = AppError::validation("Content is required").error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "Content is required" }));

        let resp = AppError::Database(DatabaseError::QueryError("syntax".into())).error_response();
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }
}
