use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FindMatchesRequest {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    pub match_id: Option<Uuid>,
    pub status: Option<String>,
}

/// The body is optional, but one that is sent must parse.
pub async fn create(
    caller: AuthenticatedUser,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = parse_find_request(&body)?;
    let matches = state.matching.find_matches(caller.user_id, request.limit).await?;
    Ok(HttpResponse::Ok().json(json!({ "matches": matches })))
}

fn parse_find_request(body: &[u8]) -> Result<FindMatchesRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FindMatchesRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {}", e)))
}

pub async fn list(
    caller: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let matches = state.matching.list_matches(caller.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "matches": matches })))
}

pub async fn update(
    caller: AuthenticatedUser,
    body: web::Json<UpdateMatchRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let match_id = body.match_id.ok_or_else(|| AppError::validation("matchId is required"))?;
    let status = body
        .status
        .as_deref()
        .ok_or_else(|| AppError::validation("status is required"))?;

    let updated = state.matching.update_status(caller.user_id, match_id, status).await?;
    Ok(HttpResponse::Ok().json(json!({ "match": updated })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_find_request() {
        assert_eq!(parse_find_request(b"").unwrap().limit, None);
        assert_eq!(parse_find_request(b" \n").unwrap().limit, None);
        assert_eq!(parse_find_request(b"{}").unwrap().limit, None);
        assert_eq!(parse_find_request(br#"{"limit": 7}"#).unwrap().limit, Some(7));

        for body in [&br#"{"limit": -1}"#[..], br#"{"limit": "five"}"#, b"{ nope"] {
            match parse_find_request(body) {
                Err(AppError::Validation(msg)) => assert!(msg.starts_with("Invalid request body")),
                other => panic!("Expected validation error, got {:?}", other),
            }
        }
    }
}
