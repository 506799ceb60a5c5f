use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use atrio_db::Database;
use atrio_types::api::{
    ChangePasswordRequest, Claims, LoginRequest, LoginResponse, VerifyResponse,
};
use atrio_types::models::AdminUser;

use crate::error::ApiError;
use crate::extract::Json;
use crate::token::TokenService;
use crate::upload::MediaStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
    pub media: MediaStore,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, password) = match (req.username, req.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::Validation(
                "Usuario y contraseña requeridos".to_string(),
            ));
        }
    };

    // Run blocking DB lookup off the async runtime
    let db = state.clone();
    let lookup = username.clone();
    let admin = tokio::task::spawn_blocking(move || db.db.get_admin_by_username(&lookup))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        // Same message for unknown user and bad password
        .ok_or_else(|| ApiError::Unauthorized("Credenciales inválidas".to_string()))?;

    if !password_matches(&admin.password_hash, &password)? {
        return Err(ApiError::Unauthorized("Credenciales inválidas".to_string()));
    }

    let admin_id: Uuid = admin
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Corrupt admin id '{}': {}", admin.id, e)))?;

    let token = state.tokens.issue(admin_id, &admin.username)?;
    info!("Admin '{}' logged in", admin.username);

    Ok(Json(LoginResponse {
        message: "Login exitoso".to_string(),
        token,
        user: AdminUser {
            id: admin_id,
            username: admin.username,
        },
    }))
}

pub async fn verify(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(VerifyResponse {
        valid: true,
        user: AdminUser {
            id: claims.sub,
            username: claims.username,
        },
    })
}

/// Tokens are stateless, so logout is a client-side discard. The endpoint
/// exists so the panel has something to call.
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "Logout exitoso" }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (current, new) = match (req.current_password, req.new_password) {
        (Some(c), Some(n)) if !c.is_empty() && !n.is_empty() => (c, n),
        _ => {
            return Err(ApiError::Validation(
                "Contraseña actual y nueva requeridas".to_string(),
            ));
        }
    };

    let db = state.clone();
    let admin_id = claims.sub.to_string();
    let lookup = admin_id.clone();
    let admin = tokio::task::spawn_blocking(move || db.db.get_admin_by_id(&lookup))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or_else(|| ApiError::NotFound("Usuario no encontrado".to_string()))?;

    if !password_matches(&admin.password_hash, &current)? {
        return Err(ApiError::Unauthorized(
            "Contraseña actual incorrecta".to_string(),
        ));
    }

    let new_hash = hash_password(&new)?;

    let db = state.clone();
    let updated = tokio::task::spawn_blocking(move || db.db.update_admin_password(&admin_id, &new_hash))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    if !updated {
        return Err(ApiError::NotFound("Usuario no encontrado".to_string()));
    }

    // Issued tokens stay valid until expiry; only the stored hash changes
    info!("Admin '{}' changed password", admin.username);
    Ok(Json(json!({ "message": "Contraseña actualizada correctamente" })))
}

/// Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

fn password_matches(stored_hash: &str, candidate: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Stored password hash invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

/// Creates the initial admin row when the table is empty. Called once at
/// startup; the configured password is only consulted on that first run.
pub fn seed_admin(db: &Database, username: &str, password: &str) -> anyhow::Result<()> {
    if db.count_admins()? > 0 {
        return Ok(());
    }

    let id = Uuid::new_v4().to_string();
    let hash = hash_password(password)?;
    db.create_admin(&id, username, &hash)?;
    info!("Seeded admin user '{}'", username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("cofradia2024").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(password_matches(&hash, "cofradia2024").unwrap());
        assert!(!password_matches(&hash, "otra-clave").unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        // Fresh salt per hash
        let a = hash_password("secreto").unwrap();
        let b = hash_password("secreto").unwrap();
        assert_ne!(a, b);
        assert!(password_matches(&a, "secreto").unwrap());
        assert!(password_matches(&b, "secreto").unwrap());
    }

    #[test]
    fn seed_admin_runs_once() {
        let dir = std::env::temp_dir().join("atrio_auth_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.db", Uuid::new_v4()));
        let db = Database::open(&path).unwrap();

        seed_admin(&db, "admin", "inicial").unwrap();
        let first = db.get_admin_by_username("admin").unwrap().unwrap();

        // Second call must not touch the existing row
        seed_admin(&db, "admin", "otra").unwrap();
        let second = db.get_admin_by_username("admin").unwrap().unwrap();

        assert_eq!(db.count_admins().unwrap(), 1);
        assert_eq!(first.password_hash, second.password_hash);
    }
}
