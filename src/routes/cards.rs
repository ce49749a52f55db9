use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::routes::{deleted, IdQuery};
use crate::services::GenerateCardsRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    pub topic: Option<String>,
}

pub async fn create(
    caller: AuthenticatedUser,
    body: web::Json<GenerateCardsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!(user_id = %caller.user_id, count = ?body.count, "Received flashcard request");
    let flashcards = state.cards.generate(caller.user_id, &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "flashcards": flashcards })))
}

pub async fn list(
    caller: AuthenticatedUser,
    query: web::Query<TopicQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let flashcards = state.cards.list(caller.user_id, query.topic.as_deref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "flashcards": flashcards })))
}

pub async fn delete(
    caller: AuthenticatedUser,
    query: web::Query<IdQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = query.parse()?;
    state.cards.delete(caller.user_id, id).await?;
    Ok(deleted())
}

pub async fn export(
    caller: AuthenticatedUser,
    query: web::Query<TopicQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let csv = state.cards.export_csv(caller.user_id, query.topic.as_deref()).await?;
    info!(user_id = %caller.user_id, bytes = csv.len(), "Flashcards exported");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename("flashcards.csv".to_string())],
            },
        ))
        .body(csv))
}
