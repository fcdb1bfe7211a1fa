use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor that decodes into `T` and rejects with [`AppError::BadRequest`].
///
/// Every body rejection (missing content type, syntax error, missing or
/// wrong-typed field) becomes a 400 so clients see one failure shape.
pub struct TypedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for TypedJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e.body_text()))
            })?;

        Ok(TypedJson(value))
    }
}
