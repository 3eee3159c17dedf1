use actix_web::HttpRequest;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::User;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub user_id: String,
    pub nama_user: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT_SECRET tidak diset")]
    MissingSecret,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

pub fn generate_jwt(user: &User) -> Result<String, AuthError> {
    let secret = std::env::var("JWT_SECRET").map_err(|_| AuthError::MissingSecret)?;
    let now = Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        role: user.role.clone(),
        nama_user: user.name.clone(),
        user_id: user.id.clone(),
        exp: (now + chrono::Duration::days(2)).timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_jwt(req: &HttpRequest) -> Result<Claims, actix_web::Error> {
    let token = req
        .cookie("access_token")
        .ok_or_else(|| {
            log::error!("No access_token cookie found in request to {}", req.path());
            actix_web::error::ErrorUnauthorized("Token tidak ditemukan")
        })?
        .value()
        .to_string();

    let secret = std::env::var("JWT_SECRET").map_err(|_| {
        log::error!("JWT_SECRET tidak diset");
        actix_web::error::ErrorInternalServerError("Konfigurasi server tidak lengkap")
    })?;
    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        log::error!("JWT verification failed: {:?}", e);
        actix_web::error::ErrorUnauthorized(format!("Invalid or expired token: {}", e))
    })?;

    Ok(token_data.claims)
}
