use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::auth::service::RegisterRequest;
use crate::db::PublicUser;
use crate::error::AppError;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
    pub token: String,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);
    match state.auth_service.authenticate(&req.email, &req.password).await {
        Ok(token) => {
            info!("Login successful for email: {}", req.email);
            Ok(HttpResponse::Ok().json(AuthResponse { token }))
        }
        Err(e) => {
            warn!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received registration request for email: {}", req.email);

    let user = match state.auth_service.register(req).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Registration failed: {}", e);
            return Err(e);
        }
    };

    let token = state.auth_service.issue_token(user.id)?;
    info!("Registration successful for email: {}", user.email);

    Ok(HttpResponse::Created().json(RegisterResponse {
        user: user.into(),
        token,
    }))
}
