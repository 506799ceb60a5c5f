use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// `axum::Json` with its rejection rendered through [`ApiError`], so a
/// malformed body comes back as `{"error": ...}` like every other failure.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => {
                warn!("Rejected JSON body: {}", rejection);
                Err(ApiError::Validation("JSON inválido".to_string()))
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Query` with the rejection mapped the same way.
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Query(value)),
            Err(rejection) => {
                warn!("Rejected query string: {}", rejection);
                Err(ApiError::Validation(
                    "Parámetros de consulta no válidos".to_string(),
                ))
            }
        }
    }
}

/// `axum::extract::Path` with the rejection mapped the same way.
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(rejection) => {
                warn!("Rejected path parameter: {}", rejection);
                Err(ApiError::Validation("Identificador no válido".to_string()))
            }
        }
    }
}

/// Gate for the upload endpoints: a request that is not multipart/form-data
/// is rejected before the handler runs.
pub struct Multipart(pub axum::extract::Multipart);

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Multipart::from_request(req, state).await {
            Ok(inner) => Ok(Multipart(inner)),
            Err(rejection) => {
                warn!("Rejected multipart body: {}", rejection);
                Err(ApiError::Validation("Error al subir archivo".to_string()))
            }
        }
    }
}

/// Pagination values are taken leniently: anything that does not parse as an
/// unsigned number falls back to the default instead of failing the request.
pub fn int_param(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_param_falls_back_on_junk() {
        assert_eq!(int_param(Some("25"), 100), 25);
        assert_eq!(int_param(Some("0"), 100), 0);
        assert_eq!(int_param(None, 100), 100);
        assert_eq!(int_param(Some(""), 100), 100);
        assert_eq!(int_param(Some("abc"), 100), 100);
        assert_eq!(int_param(Some("-5"), 100), 100);
        assert_eq!(int_param(Some("12.5"), 100), 100);
    }
}
