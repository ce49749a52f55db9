use crate::db::models::User;
use crate::db::operations::DbOperations;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::profile::{validate_profile, ProfileInput};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, decode, Header, EncodingKey, DecodingKey, Validation, Algorithm};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

#[derive(Clone)]
pub struct AuthService {
    db: DbOperations,
    jwt_secret: String,
    token_expiry_hours: i64,
}

impl AuthService {
    pub fn new(db: DbOperations, jwt_secret: String, token_expiry_hours: i64) -> Self {
        Self {
            db,
            jwt_secret,
            token_expiry_hours,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let email = normalize_email(&req.email)?;
        validate_password(&req.password)?;
        let profile = validate_profile(req.profile)?;

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::validation("User already exists"));
        }

        let mut user = User::new(email, hash_password(&req.password)?, None);
        user.apply_profile(profile);

        match self.db.create_user(&user).await {
            Ok(user) => {
                info!(user_id = %user.id, "Registered new user");
                Ok(user)
            }
            // Lost a race with a concurrent registration for the same email
            Err(AppError::Database(DatabaseError::Duplicate)) => Err(AppError::validation("User already exists")),
            Err(e) => Err(e),
        }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, AppError> {
        let email = email.trim().to_lowercase();
        let user = self
            .db
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.issue_token(user.id)
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.token_expiry_hours)).timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(claims.claims)
    }

    /// Decodes the token and returns the user id it was issued for.
    pub fn user_id_from_token(&self, token: &str) -> Result<Uuid, AppError> {
        let claims = self.decode_token(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken.into())
    }
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(AppError::validation("Email is too long"));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation("Password is too long"));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
