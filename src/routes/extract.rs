use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

/// JSON body extractor whose rejections are reported through [`AppError`], so malformed
/// payloads get the same `{error, kind}` envelope as every other failure.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        id: uuid::Uuid,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn wrong_field_types_become_validation_errors() {
        let rejection = JsonBody::<Payload>::from_request(
            request(Some("application/json"), r#"{"id":"not-a-uuid"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(rejection.kind(), "validation");
        assert_eq!(rejection.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let rejection = JsonBody::<Payload>::from_request(request(None, "{}"), &())
            .await
            .unwrap_err();
        assert_eq!(rejection.kind(), "validation");
    }

    #[tokio::test]
    async fn well_formed_bodies_pass_through() {
        let JsonBody(payload) = JsonBody::<Payload>::from_request(
            request(
                Some("application/json"),
                r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8"}"#,
            ),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(payload.id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }
}
