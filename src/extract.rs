use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Json, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body whose rejections go through the normal error envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Decoded query string as ordered key/value pairs.
#[derive(Debug, Default)]
pub struct QueryPairs(pub Vec<(String, String)>);

#[async_trait]
impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Ok(QueryPairs(pairs))
    }
}

/// Path identifiers that do not parse read as a missing resource.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::MalformedIdentifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    #[tokio::test]
    async fn query_pairs_are_decoded_in_order() {
        let (mut parts, _) = HttpRequest::builder()
            .uri("/api/v1/bootcamps?averageCost%5Blte%5D=10000&careers%5Bin%5D=Business,UI%2FUX&page=2")
            .body(())
            .unwrap()
            .into_parts();
        let QueryPairs(pairs) = QueryPairs::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(
            pairs,
            vec![
                ("averageCost[lte]".to_string(), "10000".to_string()),
                ("careers[in]".to_string(), "Business,UI/UX".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_id("5d713995b721c3bb38c1f5d0"), Err(ApiError::MalformedIdentifier)));
        assert!(parse_id("8b4c1ad6-6f0c-4b59-8e51-8a1f3f4d1a10").is_ok());
    }
}
