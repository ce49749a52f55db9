use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::routes::{deleted, IdQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub content: String,
}

pub async fn create(
    caller: AuthenticatedUser,
    body: web::Json<AnalyzeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!(user_id = %caller.user_id, chars = body.content.len(), "Received analysis request");
    let outcome = state.analysis.analyze(caller.user_id, &body.content).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn list(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blind_spots = state.analysis.list(caller.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "blindSpots": blind_spots })))
}

pub async fn delete(
    caller: AuthenticatedUser,
    query: web::Query<IdQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = query.parse()?;
    state.analysis.delete(caller.user_id, id).await?;
    Ok(deleted())
}
