//! HTTP surface: route table and request-body plumbing.

mod analyze;
mod cards;
mod matching;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::handlers::{login, register};
use crate::error::AppError;
use crate::profile::handlers::{get_profile, update_profile};

const JSON_BODY_LIMIT: usize = 256 * 1024;

/// Registers every route on an actix `App`; shared by `main` and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(crate::health_check))
        .service(
            web::scope("/api")
                .route("/auth/register", web::post().to(register))
                .route("/auth/login", web::post().to(login))
                .route("/profile", web::get().to(get_profile))
                .route("/profile", web::put().to(update_profile))
                .route("/analyze", web::post().to(analyze::create))
                .route("/analyze", web::get().to(analyze::list))
                .route("/analyze", web::delete().to(analyze::delete))
                .route("/generate-cards", web::post().to(cards::create))
                .route("/generate-cards", web::get().to(cards::list))
                .route("/generate-cards", web::delete().to(cards::delete))
                .route("/generate-cards/export", web::get().to(cards::export))
                .route("/match", web::post().to(matching::create))
                .route("/match", web::get().to(matching::list))
                .route("/match", web::put().to(matching::update)),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| AppError::validation(format!("Invalid request body: {}", err)).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::validation(format!("Invalid query string: {}", err)).into())
}

/// `?id=<uuid>` on the DELETE routes.
#[derive(Debug, Deserialize)]
pub(crate) struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    pub(crate) fn parse(&self) -> Result<Uuid, AppError> {
        let raw = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("id is required"))?;
        Uuid::parse_str(raw).map_err(|_| AppError::validation("id must be a valid UUID"))
    }
}

pub(crate) fn deleted() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_query_parse() {
        let id = Uuid::new_v4();
        let q = IdQuery { id: Some(id.to_string()) };
        assert_eq!(q.parse().unwrap(), id);

        let q = IdQuery { id: None };
        assert!(matches!(q.parse(), Err(AppError::Validation(_))));

        let q = IdQuery { id: Some("  ".into()) };
        assert!(q.parse().is_err());

        let q = IdQuery { id: Some("not-a-uuid".into()) };
        assert!(q.parse().is_err());
    }
}
