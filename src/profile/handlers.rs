use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::db::PublicUser;
use crate::error::AppError;
use crate::profile::{validate_profile, ProfileInput};
use crate::AppState;

pub async fn get_profile(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .db
        .get_user_by_id(caller.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(json!({ "user": PublicUser::from(user) })))
}

pub async fn update_profile(
    caller: AuthenticatedUser,
    body: web::Json<ProfileInput>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let update = validate_profile(body.into_inner())?;

    let mut user = state
        .db
        .get_user_by_id(caller.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    user.apply_profile(update);
    let user = state.db.update_user_profile(&user).await?;
    info!(user_id = %user.id, "Updated study profile");

    Ok(HttpResponse::Ok().json(json!({ "user": PublicUser::from(user) })))
}
